//! Ingested source record shapes.
//!
//! Each source type has one concrete entry struct; [`SourceRecord`] is the
//! closed set the ingest pipeline dispatches over.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One nomenclature row (goods code + one language description).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NomenclatureEntry {
    /// 10-digit goods code, optionally followed by the 2-digit product-line
    /// suffix (`0101210000 80`).
    pub goods_code: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub language: String,
    /// Level of the code: position of the right-most non-`00` digit pair.
    pub hier_pos: u32,
    /// Count of dash markers in front of the published description.
    pub indent: u32,
    pub description: String,
    pub descr_start_date: Option<NaiveDate>,
}

/// One declarable-codes row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarableCodeEntry {
    pub goods_code: String,
    pub start_date: NaiveDate,
    pub decl_start_date: NaiveDate,
    /// `true` when the code can be declared in customs.
    pub is_leaf: bool,
}

/// Source type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Nomenclature,
    DeclarableCode,
}

impl SourceKind {
    /// Stable name used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nomenclature => "nomenclature",
            Self::DeclarableCode => "declarable_code",
        }
    }
}

/// Closed set of ingested records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceRecord {
    Nomenclature(NomenclatureEntry),
    DeclarableCode(DeclarableCodeEntry),
}

impl SourceRecord {
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Nomenclature(_) => SourceKind::Nomenclature,
            Self::DeclarableCode(_) => SourceKind::DeclarableCode,
        }
    }

    pub fn goods_code(&self) -> &str {
        match self {
            Self::Nomenclature(entry) => entry.goods_code.as_str(),
            Self::DeclarableCode(entry) => entry.goods_code.as_str(),
        }
    }
}

impl From<NomenclatureEntry> for SourceRecord {
    fn from(value: NomenclatureEntry) -> Self {
        Self::Nomenclature(value)
    }
}

impl From<DeclarableCodeEntry> for SourceRecord {
    fn from(value: DeclarableCodeEntry) -> Self {
        Self::DeclarableCode(value)
    }
}
