//! Nomenclature record read model.
//!
//! One record is one (goods code, language) row joined with its section
//! binding and declarable flag, as produced by the paginated index scan.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Storage identifier of a nomenclature item.
pub type NomenclatureId = i64;

/// Joined nomenclature row for one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NomenclatureRecord {
    pub id: NomenclatureId,
    /// Goods code as published, possibly with product-line suffix.
    pub goods_code: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Dotted path key, e.g. `01.0101.010121`.
    pub hierarchy_path: String,
    /// Digit length the path was built to (2, 4, 6, 8 or 10).
    pub hier_pos: u32,
    /// Number of nesting markers in the published description.
    pub indent: u32,
    pub description: String,
    /// Upper-case language code (`EN`, `LT`, ...).
    pub language: String,
    pub descr_start_date: Option<NaiveDate>,
    /// `None` when the goods code has no section binding in this language.
    pub section_name: Option<String>,
    pub section_number: Option<u32>,
    /// Declarable-code marker; `None` when no declarable row exists.
    pub is_leaf: Option<bool>,
}

impl NomenclatureRecord {
    /// Creates a record with the fields needed for hierarchy resolution.
    ///
    /// Dates, section binding and leaf marker start empty.
    pub fn new(
        id: NomenclatureId,
        goods_code: impl Into<String>,
        hierarchy_path: impl Into<String>,
        indent: u32,
        language: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let hierarchy_path = hierarchy_path.into();
        let hier_pos = hierarchy_path
            .rsplit('.')
            .next()
            .map_or(0, |segment| segment.len() as u32);
        Self {
            id,
            goods_code: goods_code.into(),
            start_date: None,
            end_date: None,
            hierarchy_path,
            hier_pos,
            indent,
            description: description.into(),
            language: language.into(),
            descr_start_date: None,
            section_name: None,
            section_number: None,
            is_leaf: None,
        }
    }

    /// Attaches the section binding resolved for this record's chapter.
    pub fn with_section(mut self, section_number: u32, section_name: impl Into<String>) -> Self {
        self.section_number = Some(section_number);
        self.section_name = Some(section_name.into());
        self
    }

    /// Sets the declarable-code marker.
    pub fn with_leaf(mut self, is_leaf: bool) -> Self {
        self.is_leaf = Some(is_leaf);
        self
    }

    /// Returns whether this record is a declarable code.
    pub fn is_declarable(&self) -> bool {
        self.is_leaf == Some(true)
    }

    /// Returns the path segments of this record's hierarchy path.
    pub fn path_segments(&self) -> impl Iterator<Item = &str> {
        self.hierarchy_path.split('.')
    }
}
