//! Cell-row mapping for nomenclature and declarable-code sheets.
//!
//! # Responsibility
//! - Convert rows of already-extracted string cells into typed entries.
//! - Report the offending field for every rejected row.
//!
//! # Invariants
//! - Mapping is pure; it never touches storage.
//! - Blank optional date cells map to `None`, never to a default date.

use crate::model::section::{SectionBinding, SectionDescription};
use crate::model::source::{DeclarableCodeEntry, NomenclatureEntry, SourceKind, SourceRecord};
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Date format of nomenclature sheets (`31-12-2024`).
pub const NOMENCLATURE_DATE_FORMAT: &str = "%d-%m-%Y";
/// Date format of declarable-code sheets (`2024-12-31`).
pub const DECLARABLE_DATE_FORMAT: &str = "%Y-%m-%d";

const NOMENCLATURE_COLUMNS: usize = 8;
const DECLARABLE_COLUMNS: usize = 4;
const SECTION_BINDING_COLUMNS: usize = 2;
const SECTION_DESCRIPTION_COLUMNS: usize = 3;

pub type IngestResult<T> = Result<T, IngestError>;

/// Row mapping failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    InsufficientColumns {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },
    InvalidDate {
        field: &'static str,
        value: String,
    },
    MissingDate(&'static str),
    InvalidHierPos(String),
    InvalidBool {
        field: &'static str,
        value: String,
    },
    InvalidNumber {
        field: &'static str,
        value: String,
    },
    MissingValue(&'static str),
}

impl Display for IngestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsufficientColumns {
                kind,
                expected,
                actual,
            } => write!(
                f,
                "insufficient columns for {kind} row: need at least {expected}, got {actual}"
            ),
            Self::InvalidDate { field, value } => {
                write!(f, "invalid {field} format: `{value}`")
            }
            Self::MissingDate(field) => write!(f, "missing {field}"),
            Self::InvalidHierPos(value) => write!(f, "invalid Hier. Pos. format: `{value}`"),
            Self::InvalidBool { field, value } => write!(f, "invalid {field}: `{value}`"),
            Self::InvalidNumber { field, value } => write!(f, "invalid {field}: `{value}`"),
            Self::MissingValue(field) => write!(f, "missing {field}"),
        }
    }
}

impl Error for IngestError {}

/// Maps a nomenclature row.
///
/// Columns: goods code, start date, end date, language, hier. pos., indent
/// markers, description, description start date.
pub fn map_nomenclature_row<S: AsRef<str>>(cells: &[S]) -> IngestResult<NomenclatureEntry> {
    if cells.len() < NOMENCLATURE_COLUMNS {
        return Err(IngestError::InsufficientColumns {
            kind: SourceKind::Nomenclature.as_str(),
            expected: NOMENCLATURE_COLUMNS,
            actual: cells.len(),
        });
    }
    let cell = |index: usize| cells[index].as_ref();

    Ok(NomenclatureEntry {
        goods_code: cell(0).trim().to_string(),
        start_date: parse_optional_date(cell(1), "start date", NOMENCLATURE_DATE_FORMAT)?,
        end_date: parse_optional_date(cell(2), "end date", NOMENCLATURE_DATE_FORMAT)?,
        language: cell(3).trim().to_ascii_uppercase(),
        hier_pos: parse_hier_pos(cell(4))?,
        indent: count_indent_markers(cell(5)),
        description: cell(6).trim().to_string(),
        descr_start_date: parse_optional_date(
            cell(7),
            "description start date",
            NOMENCLATURE_DATE_FORMAT,
        )?,
    })
}

/// Maps a declarable-codes row.
///
/// Columns: goods code, start date, declarable start date, is-leaf flag.
pub fn map_declarable_row<S: AsRef<str>>(cells: &[S]) -> IngestResult<DeclarableCodeEntry> {
    if cells.len() < DECLARABLE_COLUMNS {
        return Err(IngestError::InsufficientColumns {
            kind: SourceKind::DeclarableCode.as_str(),
            expected: DECLARABLE_COLUMNS,
            actual: cells.len(),
        });
    }
    let cell = |index: usize| cells[index].as_ref();

    let start_date = parse_optional_date(cell(1), "start date", DECLARABLE_DATE_FORMAT)?
        .ok_or(IngestError::MissingDate("start date"))?;
    let decl_start_date =
        parse_optional_date(cell(2), "declarable start date", DECLARABLE_DATE_FORMAT)?
            .ok_or(IngestError::MissingDate("declarable start date"))?;

    Ok(DeclarableCodeEntry {
        goods_code: cell(0).trim().to_string(),
        start_date,
        decl_start_date,
        is_leaf: parse_bool(cell(3), "is leaf")?,
    })
}

/// Maps a row of the given source kind into a [`SourceRecord`].
pub fn map_row<S: AsRef<str>>(kind: SourceKind, cells: &[S]) -> IngestResult<SourceRecord> {
    match kind {
        SourceKind::Nomenclature => map_nomenclature_row(cells).map(SourceRecord::from),
        SourceKind::DeclarableCode => map_declarable_row(cells).map(SourceRecord::from),
    }
}

/// Maps a chapter-to-section row.
///
/// Columns: chapter number, section number.
pub fn map_section_binding_row<S: AsRef<str>>(cells: &[S]) -> IngestResult<SectionBinding> {
    if cells.len() < SECTION_BINDING_COLUMNS {
        return Err(IngestError::InsufficientColumns {
            kind: "section_binding",
            expected: SECTION_BINDING_COLUMNS,
            actual: cells.len(),
        });
    }

    Ok(SectionBinding {
        chapter: parse_number(cells[0].as_ref(), "chapter")?,
        section_number: parse_number(cells[1].as_ref(), "section number")?,
    })
}

/// Maps a localized section name row.
///
/// Columns: section number, language, name.
pub fn map_section_description_row<S: AsRef<str>>(
    cells: &[S],
) -> IngestResult<SectionDescription> {
    if cells.len() < SECTION_DESCRIPTION_COLUMNS {
        return Err(IngestError::InsufficientColumns {
            kind: "section_description",
            expected: SECTION_DESCRIPTION_COLUMNS,
            actual: cells.len(),
        });
    }

    let language = cells[1].as_ref().trim().to_ascii_uppercase();
    if language.is_empty() {
        return Err(IngestError::MissingValue("language"));
    }

    Ok(SectionDescription {
        section_number: parse_number(cells[0].as_ref(), "section number")?,
        language,
        name: cells[2].as_ref().trim().to_string(),
    })
}

/// Counts indentation markers: one per space-separated token.
///
/// `"- - -"` is indent 3; a blank cell is indent 0.
pub fn count_indent_markers(cell: &str) -> u32 {
    cell.split_whitespace().count() as u32
}

fn parse_optional_date(
    value: &str,
    field: &'static str,
    format: &str,
) -> IngestResult<Option<NaiveDate>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, format)
        .map(Some)
        .map_err(|_| IngestError::InvalidDate {
            field,
            value: trimmed.to_string(),
        })
}

fn parse_hier_pos(value: &str) -> IngestResult<u32> {
    let trimmed = value.trim();
    if let Ok(level) = trimmed.parse::<u32>() {
        return Ok(level);
    }

    // Spreadsheet exports sometimes render integers as floats (`6.0`).
    match trimmed.parse::<f64>() {
        Ok(level) if level.is_finite() && level >= 0.0 && level.fract() == 0.0 => {
            Ok(level as u32)
        }
        _ => Err(IngestError::InvalidHierPos(trimmed.to_string())),
    }
}

fn parse_number(value: &str, field: &'static str) -> IngestResult<u32> {
    let trimmed = value.trim();
    trimmed.parse::<u32>().map_err(|_| IngestError::InvalidNumber {
        field,
        value: trimmed.to_string(),
    })
}

fn parse_bool(value: &str, field: &'static str) -> IngestResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Ok(true),
        "0" | "f" | "false" => Ok(false),
        _ => Err(IngestError::InvalidBool {
            field,
            value: value.trim().to_string(),
        }),
    }
}
