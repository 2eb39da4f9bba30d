//! Document sink seam and the SQLite FTS5 document index.
//!
//! # Responsibility
//! - Define how resolved documents are handed to an indexing backend.
//! - Store documents locally with a full-text index over their text fields.
//!
//! # Invariants
//! - A document that fails to store is reported and does not abort its batch.
//! - A failed document leaves neither a document row nor an FTS row behind.
//! - `reset` empties both the document table and its FTS index.

use crate::db::migrations::ensure_migrated;
use crate::search::document::SearchDocument;
use crate::search::fts::SearchResult;
use rusqlite::{params, Connection, Transaction, TransactionBehavior};

/// Document that could not be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFailure {
    pub id: String,
    pub error: String,
}

/// Per-batch publish result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub succeeded: usize,
    pub failures: Vec<DocumentFailure>,
}

/// Indexing backend receiving search documents.
pub trait DocumentSink {
    /// Drops every previously published document.
    fn reset(&mut self) -> SearchResult<()>;
    /// Publishes one batch; per-document failures are reported in the outcome.
    fn publish_batch(&mut self, documents: &[SearchDocument]) -> SearchResult<BatchOutcome>;
}

/// SQLite-backed document index.
pub struct SqliteDocumentIndex<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentIndex<'conn> {
    /// Creates an index over a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> SearchResult<Self> {
        ensure_migrated(conn)?;
        Ok(Self { conn })
    }

    /// Number of stored documents.
    pub fn count(&self) -> SearchResult<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM search_documents;", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}

impl DocumentSink for SqliteDocumentIndex<'_> {
    fn reset(&mut self) -> SearchResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute_batch(
            "DELETE FROM search_documents_fts;
             DELETE FROM search_documents;",
        )?;
        tx.commit()?;
        Ok(())
    }

    fn publish_batch(&mut self, documents: &[SearchDocument]) -> SearchResult<BatchOutcome> {
        let mut tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut outcome = BatchOutcome::default();

        for document in documents {
            match insert_document(&mut tx, document) {
                Ok(()) => outcome.succeeded += 1,
                Err(err) => outcome.failures.push(DocumentFailure {
                    id: document.id.clone(),
                    error: err.to_string(),
                }),
            }
        }

        tx.commit()?;
        Ok(outcome)
    }
}

fn insert_document(tx: &mut Transaction<'_>, document: &SearchDocument) -> SearchResult<()> {
    let document_json = serde_json::to_string(document)?;
    let category_codes = serde_json::to_string(&document.category_codes)?;

    // Rolled back on drop unless committed.
    let savepoint = tx.savepoint()?;
    savepoint.execute(
        "INSERT INTO search_documents (
            doc_id,
            goods_code,
            is_root,
            rank_boost,
            category_codes,
            category_path,
            document_json
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
        params![
            document.id.as_str(),
            document.goods_code.as_str(),
            document.root,
            document.rank_boost,
            category_codes,
            document.category_path.as_str(),
            document_json,
        ],
    )?;
    let rowid = savepoint.last_insert_rowid();

    savepoint.execute(
        "INSERT INTO search_documents_fts (rowid, goods_code, descriptions, categories)
         VALUES (?1, ?2, ?3, ?4);",
        params![
            rowid,
            document.goods_code.as_str(),
            descriptions_text(document),
            categories_text(document),
        ],
    )?;

    savepoint.commit()?;
    Ok(())
}

fn descriptions_text(document: &SearchDocument) -> String {
    [
        document.description_en.as_str(),
        document.description_lt.as_str(),
        document.description_lt_normalized.as_str(),
    ]
    .iter()
    .filter(|text| !text.is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join("\n")
}

fn categories_text(document: &SearchDocument) -> String {
    document
        .categories_en
        .iter()
        .chain(&document.categories_lt)
        .chain(&document.categories_lt_normalized)
        .chain(&document.category_codes)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::{DocumentSink, SqliteDocumentIndex};
    use crate::db::open_db_in_memory;
    use crate::search::document::SearchDocument;

    fn document(id: &str, goods_code: &str) -> SearchDocument {
        SearchDocument {
            id: id.to_string(),
            goods_code: goods_code.to_string(),
            description_en: "Live horses".to_string(),
            category_codes: vec!["1".to_string(), "01".to_string()],
            category_path: "1 > 01".to_string(),
            ..SearchDocument::default()
        }
    }

    #[test]
    fn duplicate_id_fails_alone_and_batch_commits() {
        let conn = open_db_in_memory().expect("db should open");
        let mut index = SqliteDocumentIndex::try_new(&conn).expect("index should build");

        let outcome = index
            .publish_batch(&[
                document("0101000000 80", "0101000000 80"),
                document("0101000000 80", "0101000000 80"),
                document("0102000000 80", "0102000000 80"),
            ])
            .expect("batch should commit");

        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].id, "0101000000 80");
        assert_eq!(index.count().expect("count"), 2);
    }

    #[test]
    fn failed_fts_insert_leaves_no_document_row() {
        let conn = open_db_in_memory().expect("db should open");
        let mut index = SqliteDocumentIndex::try_new(&conn).expect("index should build");
        conn.execute_batch("DROP TABLE search_documents_fts;")
            .expect("fts table should drop");

        let outcome = index
            .publish_batch(&[document("0101000000 80", "0101000000 80")])
            .expect("batch should commit");

        assert_eq!(outcome.succeeded, 0);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(index.count().expect("count"), 0);
    }
}
