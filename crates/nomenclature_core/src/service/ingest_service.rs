//! Ingest use-case service.
//!
//! # Responsibility
//! - Persist typed source records through a [`NomenclatureRepository`].
//! - Map raw cell rows and skip rows that cannot be stored.
//!
//! # Invariants
//! - A malformed row or an unbuildable hierarchy path skips one row only.
//! - Storage failures abort the run.

use crate::ingest::{
    map_row, map_section_binding_row, map_section_description_row, IngestError,
};
use crate::model::source::{SourceKind, SourceRecord};
use crate::repo::nomenclature_repo::{NomenclatureRepository, RepoError, RepoResult};
use log::{info, warn};
use serde::Serialize;

/// Result of storing one source record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Stored,
    /// Declarable code refers to a goods code that is not stored.
    UnknownGoodsCode,
}

/// Counters of one ingest run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub rows: usize,
    pub stored: usize,
    pub skipped_invalid: usize,
    pub skipped_unknown_code: usize,
}

/// Ingest service facade over repository implementations.
pub struct IngestService<R: NomenclatureRepository> {
    repo: R,
}

impl<R: NomenclatureRepository> IngestService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Stores one source record.
    pub fn ingest_record(&self, record: &SourceRecord) -> RepoResult<IngestOutcome> {
        match record {
            SourceRecord::Nomenclature(entry) => {
                self.repo.upsert_nomenclature(entry)?;
                Ok(IngestOutcome::Stored)
            }
            SourceRecord::DeclarableCode(entry) => {
                if self.repo.upsert_declarable_code(entry)? {
                    Ok(IngestOutcome::Stored)
                } else {
                    Ok(IngestOutcome::UnknownGoodsCode)
                }
            }
        }
    }

    /// Stores a sequence of source records, skipping unbuildable paths.
    pub fn ingest_records<'r>(
        &self,
        records: impl IntoIterator<Item = &'r SourceRecord>,
    ) -> RepoResult<IngestSummary> {
        let mut summary = IngestSummary::default();
        for record in records {
            summary.rows += 1;
            self.store(record, summary.rows, &mut summary)?;
        }
        Ok(summary)
    }

    /// Maps and stores cell rows of one source kind.
    ///
    /// Row numbers in log events are 1-based.
    pub fn ingest_rows<S: AsRef<str>>(
        &self,
        kind: SourceKind,
        rows: impl IntoIterator<Item = Vec<S>>,
    ) -> RepoResult<IngestSummary> {
        let mut summary = IngestSummary::default();

        for row in rows {
            summary.rows += 1;
            match map_row(kind, row.as_slice()) {
                Ok(record) => self.store(&record, summary.rows, &mut summary)?,
                Err(err) => skip_invalid(kind.as_str(), summary.rows, &err, &mut summary),
            }
        }

        info!(
            "event=ingest module=ingest status=ok kind={} rows={} stored={} skipped_invalid={} skipped_unknown_code={}",
            kind.as_str(),
            summary.rows,
            summary.stored,
            summary.skipped_invalid,
            summary.skipped_unknown_code
        );
        Ok(summary)
    }

    /// Maps and stores chapter-to-section rows.
    pub fn ingest_section_bindings<S: AsRef<str>>(
        &self,
        rows: impl IntoIterator<Item = Vec<S>>,
    ) -> RepoResult<IngestSummary> {
        let mut summary = IngestSummary::default();

        for row in rows {
            summary.rows += 1;
            match map_section_binding_row(row.as_slice()) {
                Ok(binding) => {
                    self.repo.upsert_section_binding(&binding)?;
                    summary.stored += 1;
                }
                Err(err) => skip_invalid("section_binding", summary.rows, &err, &mut summary),
            }
        }

        info!(
            "event=ingest module=ingest status=ok kind=section_binding rows={} stored={} skipped_invalid={}",
            summary.rows, summary.stored, summary.skipped_invalid
        );
        Ok(summary)
    }

    /// Maps and stores localized section name rows.
    pub fn ingest_section_descriptions<S: AsRef<str>>(
        &self,
        rows: impl IntoIterator<Item = Vec<S>>,
    ) -> RepoResult<IngestSummary> {
        let mut summary = IngestSummary::default();

        for row in rows {
            summary.rows += 1;
            match map_section_description_row(row.as_slice()) {
                Ok(description) => {
                    self.repo.upsert_section_description(&description)?;
                    summary.stored += 1;
                }
                Err(err) => skip_invalid("section_description", summary.rows, &err, &mut summary),
            }
        }

        info!(
            "event=ingest module=ingest status=ok kind=section_description rows={} stored={} skipped_invalid={}",
            summary.rows, summary.stored, summary.skipped_invalid
        );
        Ok(summary)
    }

    fn store(
        &self,
        record: &SourceRecord,
        row: usize,
        summary: &mut IngestSummary,
    ) -> RepoResult<()> {
        match self.ingest_record(record) {
            Ok(IngestOutcome::Stored) => summary.stored += 1,
            Ok(IngestOutcome::UnknownGoodsCode) => {
                summary.skipped_unknown_code += 1;
                warn!(
                    "event=ingest_row module=ingest status=skip kind={} row={} goods_code={} reason=unknown_goods_code",
                    record.kind().as_str(),
                    row,
                    record.goods_code()
                );
            }
            Err(RepoError::HierarchyPath { goods_code, source }) => {
                summary.skipped_invalid += 1;
                warn!(
                    "event=ingest_row module=ingest status=skip kind={} row={} goods_code={} reason=hierarchy_path error={}",
                    record.kind().as_str(),
                    row,
                    goods_code,
                    source
                );
            }
            Err(other) => return Err(other),
        }
        Ok(())
    }
}

fn skip_invalid(kind: &str, row: usize, err: &IngestError, summary: &mut IngestSummary) {
    summary.skipped_invalid += 1;
    warn!(
        "event=ingest_row module=ingest status=skip kind={kind} row={row} reason=invalid_row error={err}"
    );
}

#[cfg(test)]
mod tests {
    use super::{IngestOutcome, IngestService, IngestSummary};
    use crate::db::open_db_in_memory;
    use crate::model::source::{DeclarableCodeEntry, NomenclatureEntry, SourceRecord};
    use crate::repo::nomenclature_repo::SqliteNomenclatureRepository;
    use chrono::NaiveDate;

    fn nomenclature(goods_code: &str, hier_pos: u32) -> SourceRecord {
        SourceRecord::from(NomenclatureEntry {
            goods_code: goods_code.to_string(),
            start_date: None,
            end_date: None,
            language: "EN".to_string(),
            hier_pos,
            indent: 0,
            description: "Horses".to_string(),
            descr_start_date: None,
        })
    }

    fn declarable(goods_code: &str) -> SourceRecord {
        let date = NaiveDate::from_ymd_opt(2012, 1, 1).expect("valid date");
        SourceRecord::from(DeclarableCodeEntry {
            goods_code: goods_code.to_string(),
            start_date: date,
            decl_start_date: date,
            is_leaf: true,
        })
    }

    #[test]
    fn records_dispatch_by_variant() {
        let conn = open_db_in_memory().expect("db should open");
        let service = IngestService::new(
            SqliteNomenclatureRepository::try_new(&conn).expect("repo should build"),
        );

        assert_eq!(
            service
                .ingest_record(&nomenclature("0101000000 80", 4))
                .expect("nomenclature stored"),
            IngestOutcome::Stored
        );
        assert_eq!(
            service
                .ingest_record(&declarable("0101000000 80"))
                .expect("declarable stored"),
            IngestOutcome::Stored
        );
        assert_eq!(
            service
                .ingest_record(&declarable("0202000000 80"))
                .expect("unknown code is not an error"),
            IngestOutcome::UnknownGoodsCode
        );
    }

    #[test]
    fn unbuildable_paths_are_skipped() {
        let conn = open_db_in_memory().expect("db should open");
        let service = IngestService::new(
            SqliteNomenclatureRepository::try_new(&conn).expect("repo should build"),
        );
        let records = [
            nomenclature("0101000000 80", 4),
            nomenclature("", 4),
            nomenclature("0101000000 80", 3),
            declarable("0303000000 80"),
        ];

        let summary = service
            .ingest_records(records.iter())
            .expect("ingest should finish");
        assert_eq!(
            summary,
            IngestSummary {
                rows: 4,
                stored: 1,
                skipped_invalid: 2,
                skipped_unknown_code: 1,
            }
        );
    }
}
