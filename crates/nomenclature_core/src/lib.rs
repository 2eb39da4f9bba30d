//! Customs nomenclature hierarchy resolution and search-document sync.
//!
//! Turns flat tariff records into per-code ancestor breadcrumbs and
//! canonical code paths, and publishes them as search documents.

pub mod code;
pub mod db;
pub mod hierarchy;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod text;

pub use code::{build_hierarchy_path, build_taric_path, extract_numeric_part, HierarchyPathError};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use hierarchy::{CategoryChain, CategoryChainResolver, HierarchyIndex, ResolutionReport};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::record::{NomenclatureId, NomenclatureRecord};
pub use model::section::{SectionBinding, SectionDescription};
pub use model::source::{DeclarableCodeEntry, NomenclatureEntry, SourceKind, SourceRecord};
pub use repo::nomenclature_repo::{
    NomenclatureRepository, RepoError, RepoResult, SqliteNomenclatureRepository,
};
pub use search::document::{assemble_documents, SearchDocument};
pub use search::fts::{search_documents, SearchError, SearchHit, SearchQuery, SearchResult};
pub use search::index::{BatchOutcome, DocumentSink, SqliteDocumentIndex};
pub use service::ingest_service::{IngestService, IngestSummary};
pub use service::sync_service::{SyncConfig, SyncError, SyncService, SyncSummary};
pub use text::remove_diacritics;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
