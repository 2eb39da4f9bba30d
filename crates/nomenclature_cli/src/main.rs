//! Command line entry point.
//!
//! # Responsibility
//! - Resolve configuration from flags, environment and `.env`.
//! - Load tab-separated source sheets, run the sync, and query the index.
//! - Report failures on stderr with a non-zero exit code.

use clap::{Parser, Subcommand};
use log::{error, info};
use nomenclature_core::service::sync_service::{DEFAULT_BATCH_SIZE, DEFAULT_PAGE_SIZE};
use nomenclature_core::{
    default_log_level, init_logging, open_db, search_documents, IngestService, SearchQuery,
    SourceKind, SqliteDocumentIndex, SqliteNomenclatureRepository, SyncConfig, SyncService,
};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "nomenclature", version)]
#[command(about = "Customs nomenclature hierarchy sync and search")]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "NOMENCLATURE_DB", default_value = "nomenclature.sqlite3")]
    db: PathBuf,

    /// Directory for rotated log files
    #[arg(long, global = true, env = "NOMENCLATURE_LOG_DIR", default_value = "logs")]
    log_dir: PathBuf,

    /// trace, debug, info, warn or error (defaults by build mode)
    #[arg(long, global = true, env = "NOMENCLATURE_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load nomenclature rows (8 tab-separated columns)
    IngestNomenclature {
        file: PathBuf,
        /// Skip the first line
        #[arg(long)]
        skip_header: bool,
    },

    /// Load declarable-code rows (4 tab-separated columns)
    IngestDeclarable {
        file: PathBuf,
        #[arg(long)]
        skip_header: bool,
    },

    /// Load chapter-to-section bindings and localized section names
    IngestSections {
        /// Rows of: chapter, section number
        #[arg(long)]
        bindings: Option<PathBuf>,
        /// Rows of: section number, language, name
        #[arg(long)]
        descriptions: Option<PathBuf>,
        #[arg(long)]
        skip_header: bool,
    },

    /// Rebuild every search document from stored nomenclature
    Sync {
        #[arg(long, env = "NOMENCLATURE_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: u32,
        #[arg(long, env = "NOMENCLATURE_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },

    /// Full-text search over published documents
    Search {
        query: String,
        /// Only documents under this category code
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: u32,
        /// Treat the query as a raw FTS5 expression
        #[arg(long)]
        raw: bool,
    },
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let level = cli.log_level.as_deref().unwrap_or_else(|| default_log_level());
    init_logging(level, &cli.log_dir)?;

    let conn = open_db(&cli.db)?;
    info!(
        "event=cli_command module=cli status=start db={}",
        cli.db.display()
    );

    match cli.command {
        Command::IngestNomenclature { file, skip_header } => {
            let rows = read_rows(&file, skip_header)?;
            let tx = conn.unchecked_transaction()?;
            let service = IngestService::new(SqliteNomenclatureRepository::try_new(&tx)?);
            let summary = service.ingest_rows(SourceKind::Nomenclature, rows)?;
            tx.commit()?;
            print_json(&summary)
        }
        Command::IngestDeclarable { file, skip_header } => {
            let rows = read_rows(&file, skip_header)?;
            let tx = conn.unchecked_transaction()?;
            let service = IngestService::new(SqliteNomenclatureRepository::try_new(&tx)?);
            let summary = service.ingest_rows(SourceKind::DeclarableCode, rows)?;
            tx.commit()?;
            print_json(&summary)
        }
        Command::IngestSections {
            bindings,
            descriptions,
            skip_header,
        } => {
            let tx = conn.unchecked_transaction()?;
            let service = IngestService::new(SqliteNomenclatureRepository::try_new(&tx)?);
            let mut report = serde_json::Map::new();
            if let Some(path) = bindings {
                let summary = service.ingest_section_bindings(read_rows(&path, skip_header)?)?;
                report.insert("bindings".to_string(), serde_json::to_value(summary)?);
            }
            if let Some(path) = descriptions {
                let summary =
                    service.ingest_section_descriptions(read_rows(&path, skip_header)?)?;
                report.insert("descriptions".to_string(), serde_json::to_value(summary)?);
            }
            tx.commit()?;
            print_json(&report)
        }
        Command::Sync {
            page_size,
            batch_size,
        } => {
            let repo = SqliteNomenclatureRepository::try_new(&conn)?;
            let sink = SqliteDocumentIndex::try_new(&conn)?;
            let config = SyncConfig {
                page_size,
                batch_size,
            };
            let summary = SyncService::with_config(repo, sink, config).run()?;
            print_json(&summary)
        }
        Command::Search {
            query,
            category,
            limit,
            raw,
        } => {
            let mut search = SearchQuery::new(query);
            search.category_code = category;
            search.limit = limit;
            search.raw_fts_syntax = raw;

            let hits = search_documents(&conn, &search)?
                .into_iter()
                .map(|hit| {
                    serde_json::json!({
                        "snippet": hit.snippet,
                        "document": hit.document,
                    })
                })
                .collect::<Vec<_>>();
            print_json(&hits)
        }
    }
}

/// Reads a tab-separated file into rows of cells, skipping blank lines.
fn read_rows(path: &Path, skip_header: bool) -> CliResult<Vec<Vec<String>>> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| format!("cannot read `{}`: {err}", path.display()))?;

    Ok(content
        .lines()
        .skip(usize::from(skip_header))
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect())
}

fn print_json(value: &impl serde::Serialize) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
