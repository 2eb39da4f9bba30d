//! Search documents, the local search index, and search queries.
//!
//! # Responsibility
//! - Shape resolved hierarchy data into indexable documents.
//! - Publish documents to an index behind the [`index::DocumentSink`] seam.
//! - Query the SQLite FTS5 document index.

pub mod document;
pub mod fts;
pub mod index;
