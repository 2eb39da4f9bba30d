//! Goods-code primitives.
//!
//! # Responsibility
//! - Build dotted hierarchy path keys from a goods code and level.
//! - Normalize noisy goods-code strings to numeric values.
//! - Reconcile resolved category code chains with a goods code's digits.
//!
//! # Invariants
//! - Path segments are 2-digit groups growing by 2 digits per level.
//! - Extraction and path adjustment are total: they never panic or fail.

pub mod numeric;
pub mod path;
pub mod taric_path;

pub use numeric::extract_numeric_part;
pub use path::{build_hierarchy_path, HierarchyPathError, MAX_HIER_POS};
pub use taric_path::{build_taric_path, normalize_goods_code, PATH_SEPARATOR};
