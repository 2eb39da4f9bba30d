//! In-memory hierarchy index.
//!
//! # Responsibility
//! - Group loaded records by hierarchy path, then by language.
//! - Preserve retrieval order inside each (path, language) group.
//!
//! # Invariants
//! - The index is built by one load phase and only read afterwards.
//! - Key iteration is sorted, so consumers see a deterministic order.

use crate::model::record::NomenclatureRecord;
use std::collections::BTreeMap;

type LanguageGroups = BTreeMap<String, Vec<NomenclatureRecord>>;

/// Mapping `hierarchy_path -> language -> records` in retrieval order.
#[derive(Debug, Clone, Default)]
pub struct HierarchyIndex {
    paths: BTreeMap<String, LanguageGroups>,
    record_count: usize,
}

impl HierarchyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from records in retrieval order.
    pub fn from_records(records: impl IntoIterator<Item = NomenclatureRecord>) -> Self {
        let mut index = Self::new();
        index.extend(records);
        index
    }

    /// Appends one record to its (path, language) group.
    pub fn insert(&mut self, record: NomenclatureRecord) {
        self.paths
            .entry(record.hierarchy_path.clone())
            .or_default()
            .entry(record.language.clone())
            .or_default()
            .push(record);
        self.record_count += 1;
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = NomenclatureRecord>) {
        for record in records {
            self.insert(record);
        }
    }

    /// Returns whether any record exists at `path`, in any language.
    pub fn contains_path(&self, path: &str) -> bool {
        self.paths.contains_key(path)
    }

    /// Returns the records stored at `path` for `language`, in storage order.
    pub fn records(&self, path: &str, language: &str) -> &[NomenclatureRecord] {
        self.paths
            .get(path)
            .and_then(|languages| languages.get(language))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterates all `(path, language, records)` groups in key order.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &str, &[NomenclatureRecord])> {
        self.paths.iter().flat_map(|(path, languages)| {
            languages
                .iter()
                .map(move |(language, records)| (path.as_str(), language.as_str(), records.as_slice()))
        })
    }

    /// Number of distinct hierarchy paths.
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    /// Number of records across all groups.
    pub fn len(&self) -> usize {
        self.record_count
    }

    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}
