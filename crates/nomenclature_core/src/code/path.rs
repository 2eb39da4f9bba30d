//! Hierarchy path key construction.
//!
//! A hierarchy path is the dotted list of growing goods-code prefixes that
//! leads to one code, e.g. `01.0101.010121` for a level-6 code.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Deepest hierarchical level of a goods code (TARIC 10-digit level).
pub const MAX_HIER_POS: u32 = 10;

/// Errors from [`build_hierarchy_path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HierarchyPathError {
    /// Goods code is empty.
    InvalidCode,
    /// Level is not a positive even number up to [`MAX_HIER_POS`].
    InvalidLevel(u32),
    /// Goods code has fewer characters than the requested level.
    CodeTooShort { goods_code: String, hier_pos: u32 },
}

impl Display for HierarchyPathError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCode => write!(f, "invalid goods code: must not be empty"),
            Self::InvalidLevel(level) => write!(f, "invalid hierarchy position: {level}"),
            Self::CodeTooShort {
                goods_code,
                hier_pos,
            } => write!(
                f,
                "goods code `{goods_code}` too short for hierarchy position {hier_pos}"
            ),
        }
    }
}

impl Error for HierarchyPathError {}

/// Builds the dotted hierarchy path for `goods_code` at level `hier_pos`.
///
/// For every `i` in `2, 4, ..., hier_pos` the first `i` characters of the
/// code become one segment.
///
/// # Errors
/// - [`HierarchyPathError::InvalidCode`] for an empty code.
/// - [`HierarchyPathError::InvalidLevel`] when `hier_pos` is zero, odd, or
///   above [`MAX_HIER_POS`].
/// - [`HierarchyPathError::CodeTooShort`] when the code is shorter than
///   `hier_pos`.
pub fn build_hierarchy_path(goods_code: &str, hier_pos: u32) -> Result<String, HierarchyPathError> {
    if goods_code.is_empty() {
        return Err(HierarchyPathError::InvalidCode);
    }

    if hier_pos == 0 || hier_pos > MAX_HIER_POS || hier_pos % 2 != 0 {
        return Err(HierarchyPathError::InvalidLevel(hier_pos));
    }

    let level = hier_pos as usize;
    // Prefixes are sliced by byte; a multi-byte char inside the prefix window
    // cannot form a valid code anyway.
    if goods_code.len() < level || !goods_code.is_char_boundary(level) {
        return Err(HierarchyPathError::CodeTooShort {
            goods_code: goods_code.to_string(),
            hier_pos,
        });
    }

    let segments = (2..=level)
        .step_by(2)
        .filter_map(|end| goods_code.get(..end))
        .collect::<Vec<_>>();

    Ok(segments.join("."))
}
