//! Section bindings.
//!
//! Every chapter (leading two digits of a goods code) maps to exactly one
//! section; each section has one localized name per language.

use serde::{Deserialize, Serialize};

/// Chapter to section mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionBinding {
    /// Chapter number (`1` for goods codes starting with `01`).
    pub chapter: u32,
    pub section_number: u32,
}

/// Localized section name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDescription {
    pub section_number: u32,
    pub language: String,
    pub name: String,
}

/// Returns the chapter number encoded in the first two digits of a code.
pub fn chapter_of(goods_code: &str) -> Option<u32> {
    goods_code.get(..2)?.parse::<u32>().ok()
}
