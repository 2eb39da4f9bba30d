//! Hierarchy index and category chain resolution.
//!
//! # Responsibility
//! - Hold a complete, read-only snapshot of loaded records keyed by path.
//! - Derive ancestor breadcrumbs and code chains from that snapshot.
//!
//! # Invariants
//! - Resolution starts only after the load phase has finished; partial
//!   snapshots are not supported.

pub mod index;
pub mod resolver;

pub use index::HierarchyIndex;
pub use resolver::{
    CategoryChain, CategoryChainResolver, IndentAnomaly, MissingPrefix, MissingSection,
    Resolution, ResolutionReport, ResolvedRecord,
};
