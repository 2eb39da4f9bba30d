//! Locale-normalized search text.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Removes diacritical marks from `input`.
///
/// Decomposes to NFD and drops every combining mark, so `"Šaldyta žuvis"`
/// becomes `"Saldyta zuvis"`.
pub fn remove_diacritics(input: &str) -> String {
    input.nfd().filter(|ch| !is_combining_mark(*ch)).collect()
}
