//! Category chain resolution.
//!
//! # Responsibility
//! - Compute, per record, the ordered ancestor descriptions (breadcrumb) and
//!   the parallel ancestor code segments from a complete [`HierarchyIndex`].
//! - Report data-integrity gaps instead of failing on them.
//!
//! # Invariants
//! - Records sharing one (path, language) group are visited in stable
//!   `indent` order; ties keep retrieval order.
//! - Ancestor descriptions at one prefix are taken in index storage order.
//! - The index is never mutated; repeated runs give identical output.
//! - Resolution is total: malformed ancestry degrades the chain only.

use crate::hierarchy::index::HierarchyIndex;
use crate::model::record::{NomenclatureId, NomenclatureRecord};

/// Ordered ancestor chain for one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryChain {
    /// Ancestor descriptions, root first (the section name).
    pub categories: Vec<String>,
    /// Ancestor code segments, root first (the section number).
    pub codes: Vec<String>,
}

/// One record with its resolved chain.
///
/// `chain` is `None` when the record has no section binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRecord<'a> {
    pub record: &'a NomenclatureRecord,
    pub chain: Option<CategoryChain>,
}

/// Record whose chapter has no section binding in its language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingSection {
    pub id: NomenclatureId,
    pub goods_code: String,
    pub language: String,
}

/// Ancestor prefix with no records in the record's language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingPrefix {
    pub goods_code: String,
    pub language: String,
    pub prefix: String,
}

/// Ancestor found by path nesting but indented deeper than its descendant.
///
/// Path and indent disagree about nesting; the path wins for the chain, the
/// disagreement is only reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentAnomaly {
    pub goods_code: String,
    pub language: String,
    pub indent: u32,
    pub ancestor_goods_code: String,
    pub ancestor_path: String,
    pub ancestor_indent: u32,
}

/// Data-quality findings collected during one resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionReport {
    pub missing_sections: Vec<MissingSection>,
    pub missing_prefixes: Vec<MissingPrefix>,
    pub indent_anomalies: Vec<IndentAnomaly>,
}

impl ResolutionReport {
    pub fn is_clean(&self) -> bool {
        self.missing_sections.is_empty()
            && self.missing_prefixes.is_empty()
            && self.indent_anomalies.is_empty()
    }
}

/// Output of one resolution pass.
#[derive(Debug, Clone, Default)]
pub struct Resolution<'a> {
    /// Records in (path, language, indent) visiting order.
    pub records: Vec<ResolvedRecord<'a>>,
    pub report: ResolutionReport,
}

/// Resolves category chains against a complete index snapshot.
pub struct CategoryChainResolver<'a> {
    index: &'a HierarchyIndex,
}

impl<'a> CategoryChainResolver<'a> {
    pub fn new(index: &'a HierarchyIndex) -> Self {
        Self { index }
    }

    /// Resolves every record in the index.
    pub fn resolve(&self) -> Resolution<'a> {
        let mut resolution = Resolution {
            records: Vec::with_capacity(self.index.len()),
            report: ResolutionReport::default(),
        };

        for (_, _, records) in self.index.groups() {
            let mut group = records.iter().collect::<Vec<_>>();
            // Stable: the sibling rule below reads the previous position.
            group.sort_by_key(|record| record.indent);

            for position in 0..group.len() {
                let chain = self.resolve_in_group(&group, position, &mut resolution.report);
                resolution.records.push(ResolvedRecord {
                    record: group[position],
                    chain,
                });
            }
        }

        resolution
    }

    fn resolve_in_group(
        &self,
        group: &[&'a NomenclatureRecord],
        position: usize,
        report: &mut ResolutionReport,
    ) -> Option<CategoryChain> {
        let record = group[position];
        let Some(section_name) = record.section_name.as_ref() else {
            report.missing_sections.push(MissingSection {
                id: record.id,
                goods_code: record.goods_code.clone(),
                language: record.language.clone(),
            });
            return None;
        };

        let mut chain = CategoryChain {
            categories: vec![section_name.clone()],
            codes: record
                .section_number
                .map(|number| number.to_string())
                .into_iter()
                .collect(),
        };

        let segments = record.path_segments().collect::<Vec<_>>();
        let ancestor_segments = &segments[..segments.len().saturating_sub(1)];
        let mut prefix = String::new();
        for segment in ancestor_segments {
            chain.codes.push((*segment).to_string());

            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(segment);

            let ancestors = self.index.records(&prefix, &record.language);
            if ancestors.is_empty() {
                report.missing_prefixes.push(MissingPrefix {
                    goods_code: record.goods_code.clone(),
                    language: record.language.clone(),
                    prefix: prefix.clone(),
                });
                continue;
            }

            for ancestor in ancestors {
                chain.categories.push(ancestor.description.clone());
                if ancestor.indent > record.indent {
                    report.indent_anomalies.push(IndentAnomaly {
                        goods_code: record.goods_code.clone(),
                        language: record.language.clone(),
                        indent: record.indent,
                        ancestor_goods_code: ancestor.goods_code.clone(),
                        ancestor_path: prefix.clone(),
                        ancestor_indent: ancestor.indent,
                    });
                }
            }
        }

        // A same-path record with a smaller indent is the direct parent.
        if position > 0 && group[position - 1].indent < record.indent {
            chain.categories.push(group[position - 1].description.clone());
        }

        Some(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::{CategoryChain, CategoryChainResolver};
    use crate::hierarchy::index::HierarchyIndex;
    use crate::model::record::NomenclatureRecord;

    const SECTION: &str = "Live animals; animal products";

    fn record(id: i64, code: &str, path: &str, indent: u32, description: &str) -> NomenclatureRecord {
        NomenclatureRecord::new(id, code, path, indent, "EN", description).with_section(1, SECTION)
    }

    fn chain_of(index: &HierarchyIndex, id: i64) -> Option<CategoryChain> {
        CategoryChainResolver::new(index)
            .resolve()
            .records
            .into_iter()
            .find(|resolved| resolved.record.id == id)
            .and_then(|resolved| resolved.chain)
    }

    #[test]
    fn walks_path_prefixes_from_section_root() {
        let index = HierarchyIndex::from_records([
            record(1, "0100000000 80", "01", 0, "LIVE ANIMALS"),
            record(2, "0101000000 80", "01.0101", 0, "Live horses, asses"),
            record(3, "0101210000 80", "01.0101.010121", 1, "Pure-bred breeding animals"),
        ]);

        let chain = chain_of(&index, 3).expect("bound record resolves");
        assert_eq!(
            chain.categories,
            vec![SECTION, "LIVE ANIMALS", "Live horses, asses"]
        );
        assert_eq!(chain.codes, vec!["1", "01", "0101"]);

        let root = chain_of(&index, 1).expect("chapter resolves");
        assert_eq!(root.categories, vec![SECTION]);
        assert_eq!(root.codes, vec!["1"]);
    }

    #[test]
    fn all_descriptions_at_a_shared_prefix_contribute_in_storage_order() {
        let index = HierarchyIndex::from_records([
            record(1, "0101000000 80", "01.0101", 0, "Horses"),
            record(2, "0101000000 10", "01.0101", 0, "Asses"),
            record(3, "0101210000 80", "01.0101.010121", 1, "Breeding"),
        ]);

        let chain = chain_of(&index, 3).expect("resolves");
        assert_eq!(chain.categories, vec![SECTION, "Horses", "Asses"]);
        assert_eq!(chain.codes, vec!["1", "01", "0101"]);
    }

    #[test]
    fn lower_indent_sibling_is_appended_as_parent() {
        let index = HierarchyIndex::from_records([
            record(1, "0101290000 80", "01.0101.010129", 2, "Other"),
            record(2, "0101290000 10", "01.0101.010129", 1, "Horses"),
        ]);

        let resolution = CategoryChainResolver::new(&index).resolve();
        let order = resolution
            .records
            .iter()
            .map(|resolved| resolved.record.id)
            .collect::<Vec<_>>();
        assert_eq!(order, vec![2, 1]);

        let child = resolution.records[1].chain.as_ref().expect("resolves");
        assert_eq!(child.categories.last().map(String::as_str), Some("Horses"));
        let parent = resolution.records[0].chain.as_ref().expect("resolves");
        assert!(!parent.categories.contains(&"Other".to_string()));
    }

    #[test]
    fn equal_indent_siblings_keep_retrieval_order_and_do_not_nest() {
        let index = HierarchyIndex::from_records([
            record(5, "0102210000 80", "01.0102.010221", 1, "First"),
            record(3, "0102290000 80", "01.0102.010221", 1, "Second"),
            record(4, "0102300000 80", "01.0102.010221", 0, "Head"),
        ]);

        let resolution = CategoryChainResolver::new(&index).resolve();
        let order = resolution
            .records
            .iter()
            .map(|resolved| resolved.record.id)
            .collect::<Vec<_>>();
        assert_eq!(order, vec![4, 5, 3]);

        let first = resolution.records[1].chain.as_ref().expect("resolves");
        assert_eq!(first.categories.last().map(String::as_str), Some("Head"));
        let second = resolution.records[2].chain.as_ref().expect("resolves");
        assert_eq!(second.categories, vec![SECTION]);
    }

    #[test]
    fn missing_section_yields_no_chain_and_is_reported() {
        let index = HierarchyIndex::from_records([NomenclatureRecord::new(
            9,
            "9999000000 80",
            "99.9999",
            0,
            "EN",
            "Unbound",
        )]);

        let resolution = CategoryChainResolver::new(&index).resolve();
        assert!(resolution.records[0].chain.is_none());
        assert_eq!(resolution.report.missing_sections.len(), 1);
        assert_eq!(resolution.report.missing_sections[0].goods_code, "9999000000 80");
    }

    #[test]
    fn missing_prefix_degrades_chain_and_is_reported() {
        let index = HierarchyIndex::from_records([record(
            3,
            "0101210000 80",
            "01.0101.010121",
            1,
            "Breeding",
        )]);

        let resolution = CategoryChainResolver::new(&index).resolve();
        let chain = resolution.records[0].chain.as_ref().expect("resolves");
        assert_eq!(chain.categories, vec![SECTION]);
        assert_eq!(chain.codes, vec!["1", "01", "0101"]);
        let prefixes = resolution
            .report
            .missing_prefixes
            .iter()
            .map(|missing| missing.prefix.as_str())
            .collect::<Vec<_>>();
        assert_eq!(prefixes, vec!["01", "01.0101"]);
    }

    #[test]
    fn deeper_indented_ancestor_is_reported_as_anomaly() {
        let index = HierarchyIndex::from_records([
            record(1, "0101000000 80", "01.0101", 3, "Horses"),
            record(2, "0101210000 80", "01.0101.010121", 1, "Breeding"),
        ]);

        let resolution = CategoryChainResolver::new(&index).resolve();
        let anomalies = &resolution.report.indent_anomalies;
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].ancestor_path, "01.0101");
        assert_eq!(anomalies[0].ancestor_indent, 3);
        assert_eq!(anomalies[0].indent, 1);
    }

    #[test]
    fn repeated_resolution_is_identical() {
        let index = HierarchyIndex::from_records([
            record(1, "0100000000 80", "01", 0, "LIVE ANIMALS"),
            record(2, "0101000000 80", "01.0101", 0, "Horses"),
            record(3, "0101210000 80", "01.0101.010121", 1, "Breeding"),
            record(4, "0101290000 80", "01.0101.010129", 1, "Other"),
        ]);

        let resolver = CategoryChainResolver::new(&index);
        let first = resolver.resolve();
        let second = resolver.resolve();
        assert_eq!(first.records, second.records);
        assert_eq!(first.report, second.report);
    }
}
