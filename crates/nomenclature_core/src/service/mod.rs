//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and sink calls into ingest and sync runs.
//! - Keep the CLI decoupled from storage details.

pub mod ingest_service;
pub mod sync_service;
