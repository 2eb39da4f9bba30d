//! Sync use-case service.
//!
//! # Responsibility
//! - Load the full nomenclature scan into an owned [`HierarchyIndex`].
//! - Resolve chains, assemble documents and publish them in batches.
//! - Log data-quality findings of each run.
//!
//! # Invariants
//! - The index is fully loaded before resolution starts.
//! - The sink is reset before a full publish.
//! - A failed document never aborts the run; only sink or storage errors do.

use crate::hierarchy::{CategoryChainResolver, HierarchyIndex, ResolutionReport};
use crate::model::section::chapter_of;
use crate::repo::nomenclature_repo::{NomenclatureRepository, RepoError};
use crate::search::document::{assemble_documents, SearchDocument};
use crate::search::fts::SearchError;
use crate::search::index::DocumentSink;
use log::{info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub const DEFAULT_PAGE_SIZE: u32 = 1000;
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Tunables for one sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Rows fetched per repository page.
    pub page_size: u32,
    /// Documents handed to the sink per batch.
    pub batch_size: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Service error for sync runs.
#[derive(Debug)]
pub enum SyncError {
    /// Storage failure while loading the index.
    Repo(RepoError),
    /// Sink failure while resetting or publishing.
    Sink(SearchError),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Sink(err) => write!(f, "document sink failed: {err}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Sink(err) => Some(err),
        }
    }
}

impl From<RepoError> for SyncError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<SearchError> for SyncError {
    fn from(value: SearchError) -> Self {
        Self::Sink(value)
    }
}

/// Counters of one completed sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub records_loaded: usize,
    pub paths_loaded: usize,
    pub documents_built: usize,
    pub documents_published: usize,
    pub documents_failed: usize,
    pub batches: usize,
    pub missing_sections: usize,
    pub missing_prefixes: usize,
    pub indent_anomalies: usize,
}

/// Sync service facade over a repository and a document sink.
pub struct SyncService<R: NomenclatureRepository, S: DocumentSink> {
    repo: R,
    sink: S,
    config: SyncConfig,
}

impl<R: NomenclatureRepository, S: DocumentSink> SyncService<R, S> {
    /// Creates a service with default tunables.
    pub fn new(repo: R, sink: S) -> Self {
        Self::with_config(repo, sink, SyncConfig::default())
    }

    /// Creates a service with explicit tunables.
    ///
    /// Zero sizes are raised to one.
    pub fn with_config(repo: R, sink: S, config: SyncConfig) -> Self {
        Self {
            repo,
            sink,
            config: SyncConfig {
                page_size: config.page_size.max(1),
                batch_size: config.batch_size.max(1),
            },
        }
    }

    pub fn config(&self) -> SyncConfig {
        self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Pages through the repository scan until a short page.
    pub fn load_index(&self) -> Result<HierarchyIndex, SyncError> {
        let mut index = HierarchyIndex::new();
        let mut offset = 0_u32;

        loop {
            let page = self.repo.list_index_page(self.config.page_size, offset)?;
            let fetched = page.len();
            index.extend(page);

            if fetched < self.config.page_size as usize {
                break;
            }
            offset = offset.saturating_add(fetched as u32);
        }

        info!(
            "event=index_load module=sync status=ok records={} paths={}",
            index.len(),
            index.path_count()
        );
        Ok(index)
    }

    /// Resolves the index and assembles documents, logging data-quality
    /// findings.
    pub fn build_documents(
        &self,
        index: &HierarchyIndex,
    ) -> Result<(Vec<SearchDocument>, ResolutionReport), SyncError> {
        let sections = self.repo.list_section_descriptions()?;
        let resolution = CategoryChainResolver::new(index).resolve();
        log_report(&resolution.report);

        let documents = assemble_documents(&resolution, &sections);
        Ok((documents, resolution.report))
    }

    /// Runs one full load, resolve and publish cycle.
    pub fn run(&mut self) -> Result<SyncSummary, SyncError> {
        let started_at = Instant::now();
        info!(
            "event=sync_run module=sync status=start page_size={} batch_size={}",
            self.config.page_size, self.config.batch_size
        );

        let index = self.load_index()?;
        let (documents, report) = self.build_documents(&index)?;

        let mut summary = SyncSummary {
            records_loaded: index.len(),
            paths_loaded: index.path_count(),
            documents_built: documents.len(),
            missing_sections: report.missing_sections.len(),
            missing_prefixes: report.missing_prefixes.len(),
            indent_anomalies: report.indent_anomalies.len(),
            ..SyncSummary::default()
        };

        self.sink.reset()?;

        for (batch_number, batch) in documents.chunks(self.config.batch_size).enumerate() {
            let outcome = self.sink.publish_batch(batch)?;
            summary.batches += 1;
            summary.documents_published += outcome.succeeded;
            summary.documents_failed += outcome.failures.len();

            for failure in &outcome.failures {
                warn!(
                    "event=document_publish module=sync status=error doc_id={} error={}",
                    failure.id, failure.error
                );
            }
            info!(
                "event=batch_publish module=sync status=ok batch={} succeeded={} failed={}",
                batch_number + 1,
                outcome.succeeded,
                outcome.failures.len()
            );
        }

        info!(
            "event=sync_run module=sync status=ok duration_ms={} documents={} published={} failed={}",
            started_at.elapsed().as_millis(),
            summary.documents_built,
            summary.documents_published,
            summary.documents_failed
        );
        Ok(summary)
    }
}

fn log_report(report: &ResolutionReport) {
    for missing in &report.missing_sections {
        let chapter = chapter_of(&missing.goods_code)
            .map(|chapter| chapter.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        warn!(
            "event=data_quality module=sync kind=missing_section id={} goods_code={} language={} chapter={}",
            missing.id, missing.goods_code, missing.language, chapter
        );
    }
    for anomaly in &report.indent_anomalies {
        warn!(
            "event=data_quality module=sync kind=indent_anomaly goods_code={} language={} indent={} ancestor={} ancestor_path={} ancestor_indent={}",
            anomaly.goods_code,
            anomaly.language,
            anomaly.indent,
            anomaly.ancestor_goods_code,
            anomaly.ancestor_path,
            anomaly.ancestor_indent
        );
    }
    if !report.missing_prefixes.is_empty() {
        info!(
            "event=data_quality module=sync kind=missing_prefix count={}",
            report.missing_prefixes.len()
        );
    }
}
