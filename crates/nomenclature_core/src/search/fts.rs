//! SQLite FTS5 search over published documents.
//!
//! # Responsibility
//! - Provide keyword search over goods codes, descriptions and categories.
//! - Return typed hits carrying the stored document.
//!
//! # Invariants
//! - Blank queries return no hits without touching the database.
//! - Ordering is deterministic: relevance, rank boost, goods code.

use crate::db::DbError;
use crate::search::document::SearchDocument;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for search APIs.
pub type SearchResult<T> = Result<T, SearchError>;

/// Search-layer error for query parsing, DB interaction and row decoding.
#[derive(Debug)]
pub enum SearchError {
    /// Query cannot be parsed by FTS5 syntax.
    InvalidQuery {
        query: String,
        message: String,
    },
    Db(DbError),
    InvalidData(String),
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidQuery { query, message } => {
                write!(f, "invalid full-text query `{query}`: {message}")
            }
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid search document: {message}"),
        }
    }
}

impl Error for SearchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidQuery { .. } => None,
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for SearchError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SearchError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidData(value.to_string())
    }
}

/// Search options.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub text: String,
    /// Only return documents whose `category_codes` contain this code.
    pub category_code: Option<String>,
    pub limit: u32,
    /// Pass `text` through as a raw FTS5 expression.
    ///
    /// Default is `false`: terms are quoted and prefix-matched.
    pub raw_fts_syntax: bool,
}

impl SearchQuery {
    /// Creates a query with default limit and no facet filter.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category_code: None,
            limit: 20,
            raw_fts_syntax: false,
        }
    }
}

/// Single search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub document: SearchDocument,
    pub snippet: String,
}

/// Searches published documents and returns ranked hits.
pub fn search_documents(conn: &Connection, query: &SearchQuery) -> SearchResult<Vec<SearchHit>> {
    let Some(match_expr) = build_match_expression(query) else {
        return Ok(Vec::new());
    };

    if query.limit == 0 {
        return Ok(Vec::new());
    }

    let mut sql = String::from(
        "SELECT
            search_documents.document_json AS document_json,
            snippet(search_documents_fts, 1, '[', ']', ' ... ', 10) AS snippet
         FROM search_documents_fts
         JOIN search_documents ON search_documents.rowid = search_documents_fts.rowid
         WHERE search_documents_fts MATCH ?",
    );
    let mut bind_values: Vec<Value> = vec![Value::Text(match_expr.clone())];

    if let Some(code) = query.category_code.as_ref() {
        sql.push_str(
            " AND EXISTS (
                SELECT 1 FROM json_each(search_documents.category_codes)
                WHERE json_each.value = ?
            )",
        );
        bind_values.push(Value::Text(code.clone()));
    }

    sql.push_str(
        " ORDER BY bm25(search_documents_fts), search_documents.rank_boost DESC,
                   search_documents.goods_code ASC
          LIMIT ?",
    );
    bind_values.push(Value::Integer(i64::from(query.limit)));

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt
        .query(params_from_iter(bind_values))
        .map_err(|err| map_query_error(err, &match_expr))?;
    let mut hits = Vec::new();

    while let Some(row) = rows
        .next()
        .map_err(|err| map_query_error(err, &match_expr))?
    {
        hits.push(parse_search_hit(row)?);
    }

    Ok(hits)
}

fn parse_search_hit(row: &Row<'_>) -> SearchResult<SearchHit> {
    let json: String = row.get("document_json")?;
    Ok(SearchHit {
        document: serde_json::from_str(&json)?,
        snippet: row.get("snippet")?,
    })
}

fn build_match_expression(query: &SearchQuery) -> Option<String> {
    let text = query.text.trim();
    if text.is_empty() {
        return None;
    }

    if query.raw_fts_syntax {
        return Some(text.to_string());
    }

    let terms = text
        .split_whitespace()
        .map(escape_fts_term)
        .collect::<Vec<_>>();

    Some(terms.join(" AND "))
}

/// Quotes one term and makes it a prefix match (`"0101"*`).
fn escape_fts_term(raw: &str) -> String {
    let escaped = raw.replace('"', "\"\"");
    format!("\"{escaped}\"*")
}

fn map_query_error(err: rusqlite::Error, query: &str) -> SearchError {
    if is_match_syntax_error(&err) {
        return SearchError::InvalidQuery {
            query: query.to_string(),
            message: err.to_string(),
        };
    }

    SearchError::Db(DbError::Sqlite(err))
}

fn is_match_syntax_error(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(_, Some(message)) => {
            let msg = message.to_lowercase();
            (msg.contains("fts5") && msg.contains("syntax"))
                || msg.contains("malformed match expression")
                || msg.contains("unterminated")
        }
        _ => false,
    }
}
