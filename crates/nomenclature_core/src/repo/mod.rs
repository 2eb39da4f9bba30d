//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Keep SQLite query details away from services and the resolver.
//!
//! # Invariants
//! - Repositories are only constructed on migrated connections.

pub mod nomenclature_repo;
