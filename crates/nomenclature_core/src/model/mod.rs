//! Nomenclature domain model.
//!
//! # Responsibility
//! - Define the records read from storage for hierarchy resolution.
//! - Define the closed set of ingested source record shapes.
//! - Define section bindings that root every category chain.
//!
//! # Invariants
//! - Hierarchy paths are dotted 2-digit prefix groups.
//! - `indent` only orders records that share one exact hierarchy path.

pub mod record;
pub mod section;
pub mod source;

/// English language code as stored with descriptions.
pub const LANGUAGE_EN: &str = "EN";
/// Lithuanian language code as stored with descriptions.
pub const LANGUAGE_LT: &str = "LT";
