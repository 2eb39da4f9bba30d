//! Search document assembly.
//!
//! # Responsibility
//! - Merge per-language resolved chains into one document per goods code.
//! - Seed section-level root documents from section descriptions.
//!
//! # Invariants
//! - Exactly one document per distinct goods code, plus one per section.
//! - Output order is deterministic: sections by number, then goods codes.
//! - `root` is `true` only for section documents.

use crate::code::{build_taric_path, extract_numeric_part};
use crate::hierarchy::resolver::Resolution;
use crate::model::section::SectionDescription;
use crate::model::{LANGUAGE_EN, LANGUAGE_LT};
use crate::text::remove_diacritics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rank boost applied to declarable (leaf) codes.
pub const LEAF_RANK_BOOST: i32 = 10;

/// Document handed to the search index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchDocument {
    pub id: String,
    pub goods_code: String,
    pub goods_code_numeric: i64,
    pub description_en: String,
    pub description_lt: String,
    pub description_lt_normalized: String,
    pub category_codes: Vec<String>,
    /// Canonical `" > "`-joined code path for display.
    pub category_path: String,
    pub categories_en: Vec<String>,
    pub categories_lt: Vec<String>,
    pub categories_lt_normalized: Vec<String>,
    pub rank_boost: i32,
    pub root: bool,
}

impl SearchDocument {
    fn set_description(&mut self, language: &str, description: &str) {
        if language == LANGUAGE_EN {
            self.description_en = description.to_string();
        } else if language == LANGUAGE_LT {
            self.description_lt = description.to_string();
            self.description_lt_normalized = remove_diacritics(description);
        }
    }

    fn set_categories(&mut self, language: &str, categories: &[String]) {
        if language == LANGUAGE_EN {
            self.categories_en = categories.to_vec();
        } else if language == LANGUAGE_LT {
            self.categories_lt = categories.to_vec();
            self.categories_lt_normalized = categories
                .iter()
                .map(|category| remove_diacritics(category))
                .collect();
        }
    }
}

/// Builds section root documents followed by one document per goods code.
pub fn assemble_documents(
    resolution: &Resolution<'_>,
    sections: &[SectionDescription],
) -> Vec<SearchDocument> {
    let mut documents = section_documents(sections);

    let mut by_code: BTreeMap<&str, SearchDocument> = BTreeMap::new();
    for resolved in &resolution.records {
        let record = resolved.record;
        let document = by_code
            .entry(record.goods_code.as_str())
            .or_insert_with(|| SearchDocument {
                id: record.id.to_string(),
                goods_code: record.goods_code.clone(),
                ..SearchDocument::default()
            });

        document.set_description(&record.language, &record.description);
        if record.is_declarable() {
            document.rank_boost = LEAF_RANK_BOOST;
        }

        if let Some(chain) = resolved.chain.as_ref() {
            document.set_categories(&record.language, &chain.categories);
            // Code chains do not depend on language; the first one wins.
            if document.category_codes.is_empty() {
                document.category_codes = chain.codes.clone();
            }
        }
    }

    documents.extend(by_code.into_values().map(|mut document| {
        document.goods_code_numeric = extract_numeric_part(&document.goods_code);
        document.category_path = build_taric_path(&document.category_codes, &document.goods_code);
        document
    }));
    documents
}

fn section_documents(sections: &[SectionDescription]) -> Vec<SearchDocument> {
    let mut by_number: BTreeMap<u32, SearchDocument> = BTreeMap::new();
    for section in sections {
        let number = section.section_number.to_string();
        let document = by_number
            .entry(section.section_number)
            .or_insert_with(|| SearchDocument {
                id: format!("section-{number}"),
                goods_code: number.clone(),
                goods_code_numeric: i64::from(section.section_number),
                category_codes: vec![number.clone()],
                category_path: number.clone(),
                root: true,
                ..SearchDocument::default()
            });
        document.set_description(&section.language, &section.name);
    }
    by_number.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::{assemble_documents, LEAF_RANK_BOOST};
    use crate::hierarchy::{CategoryChainResolver, HierarchyIndex};
    use crate::model::record::NomenclatureRecord;
    use crate::model::section::SectionDescription;

    fn sections() -> Vec<SectionDescription> {
        vec![
            SectionDescription {
                section_number: 1,
                language: "EN".to_string(),
                name: "Live animals; animal products".to_string(),
            },
            SectionDescription {
                section_number: 1,
                language: "LT".to_string(),
                name: "Gyvi gyvūnai; gyvūninės kilmės produktai".to_string(),
            },
        ]
    }

    fn index() -> HierarchyIndex {
        let en = "Live animals; animal products";
        let lt = "Gyvi gyvūnai; gyvūninės kilmės produktai";
        HierarchyIndex::from_records([
            NomenclatureRecord::new(1, "0100000000 80", "01", 0, "EN", "LIVE ANIMALS")
                .with_section(1, en),
            NomenclatureRecord::new(1, "0100000000 80", "01", 0, "LT", "GYVI GYVŪNAI")
                .with_section(1, lt),
            NomenclatureRecord::new(2, "0101000000 80", "01.0101", 0, "EN", "Live horses")
                .with_section(1, en),
            NomenclatureRecord::new(2, "0101000000 80", "01.0101", 0, "LT", "Gyvi arkliai")
                .with_section(1, lt),
            NomenclatureRecord::new(3, "0101210000 80", "01.0101.010121", 1, "EN", "Pure-bred")
                .with_section(1, en)
                .with_leaf(true),
            NomenclatureRecord::new(3, "0101210000 80", "01.0101.010121", 1, "LT", "Grynaveisliai")
                .with_section(1, lt)
                .with_leaf(true),
        ])
    }

    #[test]
    fn one_document_per_goods_code_after_section_roots() {
        let index = index();
        let resolution = CategoryChainResolver::new(&index).resolve();
        let documents = assemble_documents(&resolution, &sections());

        let ids = documents
            .iter()
            .map(|document| document.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["section-1", "1", "2", "3"]);

        let root = &documents[0];
        assert!(root.root);
        assert_eq!(root.description_en, "Live animals; animal products");
        assert_eq!(
            root.description_lt_normalized,
            "Gyvi gyvunai; gyvunines kilmes produktai"
        );
        assert!(documents[1..].iter().all(|document| !document.root));
    }

    #[test]
    fn merges_languages_and_canonicalizes_path() {
        let index = index();
        let resolution = CategoryChainResolver::new(&index).resolve();
        let documents = assemble_documents(&resolution, &sections());
        let leaf = documents
            .iter()
            .find(|document| document.id == "3")
            .expect("leaf document exists");

        assert_eq!(leaf.goods_code_numeric, 101_210_000);
        assert_eq!(leaf.description_en, "Pure-bred");
        assert_eq!(leaf.description_lt, "Grynaveisliai");
        assert_eq!(
            leaf.categories_en,
            vec!["Live animals; animal products", "LIVE ANIMALS", "Live horses"]
        );
        assert_eq!(
            leaf.categories_lt_normalized,
            vec![
                "Gyvi gyvunai; gyvunines kilmes produktai",
                "GYVI GYVUNAI",
                "Gyvi arkliai"
            ]
        );
        assert_eq!(leaf.category_codes, vec!["1", "01", "0101"]);
        assert_eq!(leaf.category_path, "1 > 01 > 0101 > 010121");
        assert_eq!(leaf.rank_boost, LEAF_RANK_BOOST);

        let heading = documents
            .iter()
            .find(|document| document.id == "2")
            .expect("heading document exists");
        assert_eq!(heading.category_path, "1 > 01 > 0101");
        assert_eq!(heading.rank_boost, 0);
    }

    #[test]
    fn unbound_goods_code_keeps_descriptions_with_empty_breadcrumb() {
        let index = HierarchyIndex::from_records([NomenclatureRecord::new(
            7,
            "9999000000 80",
            "99.9999",
            0,
            "EN",
            "Unbound",
        )]);
        let resolution = CategoryChainResolver::new(&index).resolve();
        let documents = assemble_documents(&resolution, &[]);

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].description_en, "Unbound");
        assert!(documents[0].categories_en.is_empty());
        assert!(documents[0].category_codes.is_empty());
        assert_eq!(documents[0].category_path, "");
    }
}
