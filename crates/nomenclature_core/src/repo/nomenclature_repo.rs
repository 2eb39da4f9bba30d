//! Nomenclature repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Upsert ingested nomenclature, declarable-code and section rows.
//! - Provide the paginated joined scan that feeds the hierarchy index.
//!
//! # Invariants
//! - Nomenclature writes always store a hierarchy path built from the
//!   entry's goods code and level.
//! - The index scan is ordered by item id then language, so pages are stable.
//! - Missing section bindings surface as `None` section fields, not as
//!   dropped rows.

use crate::code::{build_hierarchy_path, HierarchyPathError};
use crate::db::migrations::ensure_migrated;
use crate::db::DbError;
use crate::model::record::{NomenclatureId, NomenclatureRecord};
use crate::model::section::{SectionBinding, SectionDescription};
use crate::model::source::{DeclarableCodeEntry, NomenclatureEntry};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const INDEX_SCAN_SQL: &str = "SELECT
    n.id AS id,
    n.goods_code AS goods_code,
    n.start_date AS start_date,
    n.end_date AS end_date,
    n.hierarchy_path AS hierarchy_path,
    n.hier_pos AS hier_pos,
    n.indent AS indent,
    d.description AS description,
    d.language AS language,
    d.descr_start_date AS descr_start_date,
    sd.name AS section_name,
    sd.section_number AS section_number,
    dc.is_leaf AS is_leaf
FROM nomenclatures n
JOIN nomenclature_descriptions d ON d.nomenclature_id = n.id
LEFT JOIN section_chapter_mapping scm
    ON scm.chapter_id = CAST(substr(n.goods_code, 1, 2) AS INTEGER)
LEFT JOIN section_descriptions sd
    ON sd.section_number = scm.section_number
   AND sd.language = d.language
LEFT JOIN nomenclature_declarable_codes dc ON dc.nomenclature_id = n.id
ORDER BY n.id ASC, d.language ASC
LIMIT ?1 OFFSET ?2";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for nomenclature persistence and scans.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Entry cannot be given a hierarchy path.
    HierarchyPath {
        goods_code: String,
        source: HierarchyPathError,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::HierarchyPath { goods_code, source } => {
                write!(f, "cannot build hierarchy path for `{goods_code}`: {source}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted nomenclature data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::HierarchyPath { source, .. } => Some(source),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for nomenclature storage.
pub trait NomenclatureRepository {
    /// Inserts or updates one nomenclature item and its description.
    fn upsert_nomenclature(&self, entry: &NomenclatureEntry) -> RepoResult<NomenclatureId>;
    /// Attaches a declarable flag to an existing item.
    ///
    /// Returns `false` when no item with the goods code exists.
    fn upsert_declarable_code(&self, entry: &DeclarableCodeEntry) -> RepoResult<bool>;
    fn upsert_section_binding(&self, binding: &SectionBinding) -> RepoResult<()>;
    fn upsert_section_description(&self, description: &SectionDescription) -> RepoResult<()>;
    /// Loads one page of the joined index scan.
    fn list_index_page(&self, limit: u32, offset: u32) -> RepoResult<Vec<NomenclatureRecord>>;
    /// Loads all section descriptions ordered by section number and language.
    fn list_section_descriptions(&self) -> RepoResult<Vec<SectionDescription>>;
}

/// SQLite-backed nomenclature repository.
pub struct SqliteNomenclatureRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNomenclatureRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_migrated(conn)?;
        Ok(Self { conn })
    }
}

impl NomenclatureRepository for SqliteNomenclatureRepository<'_> {
    fn upsert_nomenclature(&self, entry: &NomenclatureEntry) -> RepoResult<NomenclatureId> {
        let hierarchy_path =
            build_hierarchy_path(&entry.goods_code, entry.hier_pos).map_err(|source| {
                RepoError::HierarchyPath {
                    goods_code: entry.goods_code.clone(),
                    source,
                }
            })?;

        let id: NomenclatureId = self.conn.query_row(
            "INSERT INTO nomenclatures (
                goods_code,
                start_date,
                end_date,
                hierarchy_path,
                hier_pos,
                indent
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT (goods_code) DO UPDATE SET
                start_date = excluded.start_date,
                end_date = excluded.end_date,
                hierarchy_path = excluded.hierarchy_path,
                hier_pos = excluded.hier_pos,
                indent = excluded.indent,
                updated_at = (strftime('%s', 'now') * 1000)
            RETURNING id;",
            params![
                entry.goods_code.as_str(),
                entry.start_date,
                entry.end_date,
                hierarchy_path.as_str(),
                entry.hier_pos,
                entry.indent,
            ],
            |row| row.get(0),
        )?;

        self.conn.execute(
            "INSERT INTO nomenclature_descriptions (
                nomenclature_id,
                language,
                description,
                descr_start_date
            ) VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (nomenclature_id, language) DO UPDATE SET
                description = excluded.description,
                descr_start_date = excluded.descr_start_date,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                id,
                entry.language.as_str(),
                entry.description.as_str(),
                entry.descr_start_date,
            ],
        )?;

        Ok(id)
    }

    fn upsert_declarable_code(&self, entry: &DeclarableCodeEntry) -> RepoResult<bool> {
        let Some(id) = self
            .conn
            .query_row(
                "SELECT id FROM nomenclatures WHERE goods_code = ?1;",
                [entry.goods_code.as_str()],
                |row| row.get::<_, NomenclatureId>(0),
            )
            .optional()?
        else {
            return Ok(false);
        };

        self.conn.execute(
            "INSERT INTO nomenclature_declarable_codes (
                nomenclature_id,
                start_date,
                decl_start_date,
                is_leaf
            ) VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (nomenclature_id) DO UPDATE SET
                start_date = excluded.start_date,
                decl_start_date = excluded.decl_start_date,
                is_leaf = excluded.is_leaf,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                id,
                entry.start_date,
                entry.decl_start_date,
                bool_to_int(entry.is_leaf),
            ],
        )?;

        Ok(true)
    }

    fn upsert_section_binding(&self, binding: &SectionBinding) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO section_chapter_mapping (chapter_id, section_number)
             VALUES (?1, ?2)
             ON CONFLICT (chapter_id) DO UPDATE SET
                section_number = excluded.section_number;",
            params![binding.chapter, binding.section_number],
        )?;
        Ok(())
    }

    fn upsert_section_description(&self, description: &SectionDescription) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO section_descriptions (section_number, language, name)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (section_number, language) DO UPDATE SET
                name = excluded.name;",
            params![
                description.section_number,
                description.language.as_str(),
                description.name.as_str(),
            ],
        )?;
        Ok(())
    }

    fn list_index_page(&self, limit: u32, offset: u32) -> RepoResult<Vec<NomenclatureRecord>> {
        let mut stmt = self.conn.prepare(INDEX_SCAN_SQL)?;
        let mut rows = stmt.query(params![limit, offset])?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }

        Ok(records)
    }

    fn list_section_descriptions(&self) -> RepoResult<Vec<SectionDescription>> {
        let mut stmt = self.conn.prepare(
            "SELECT section_number, language, name
             FROM section_descriptions
             ORDER BY section_number ASC, language ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut sections = Vec::new();

        while let Some(row) = rows.next()? {
            sections.push(SectionDescription {
                section_number: row.get("section_number")?,
                language: row.get("language")?,
                name: row.get("name")?,
            });
        }

        Ok(sections)
    }
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<NomenclatureRecord> {
    let goods_code: String = row.get("goods_code")?;

    let indent = match row.get::<_, i64>("indent")? {
        value if value >= 0 => value as u32,
        other => {
            return Err(RepoError::InvalidData(format!(
                "negative indent `{other}` for goods code `{goods_code}`"
            )));
        }
    };

    let is_leaf = match row.get::<_, Option<i64>>("is_leaf")? {
        None => None,
        Some(0) => Some(false),
        Some(1) => Some(true),
        Some(other) => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_leaf value `{other}` for goods code `{goods_code}`"
            )));
        }
    };

    Ok(NomenclatureRecord {
        id: row.get("id")?,
        goods_code,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        hierarchy_path: row.get("hierarchy_path")?,
        hier_pos: row.get("hier_pos")?,
        indent,
        description: row.get("description")?,
        language: row.get("language")?,
        descr_start_date: row.get("descr_start_date")?,
        section_name: row.get("section_name")?,
        section_number: row.get("section_number")?,
        is_leaf,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
