//! Canonical TARIC display path.
//!
//! # Responsibility
//! - Reconcile a resolved category code chain (section, chapter, heading...)
//!   with the literal digit groups of one goods code.
//! - Produce the `" > "`-joined breadcrumb used for display and faceting.
//!
//! # Invariants
//! - Output is derived only from the chain and the goods code; never panics.
//! - At most one level is added beyond the chain's last entry.
//! - A chain whose chapter does not match the goods code is never extended.

/// Separator between canonical path entries.
pub const PATH_SEPARATOR: &str = " > ";

const CHAPTER_LEN: usize = 2;
const HEADING_LEN: usize = 4;
const SUBHEADING_LEN: usize = 6;

/// Normalizes a goods code for digit-boundary reconciliation.
///
/// Keeps the text before the first space, then cuts at the first non-digit.
pub fn normalize_goods_code(goods_code: &str) -> &str {
    let head = goods_code.split(' ').next().unwrap_or_default();
    match head.find(|ch: char| !ch.is_ascii_digit()) {
        Some(end) => &head[..end],
        None => head,
    }
}

/// Builds the canonical path for `goods_code` from its category code chain.
///
/// Rules are applied in order; the first one that decides ends evaluation:
/// 1. an empty chain yields `""`;
/// 2. codes of up to 4 digits trim deeper entries to the code's granularity;
/// 3. a chapter entry not matching the code's leading digits stops extension;
/// 4. a code shorter than the last entry collapses to the section for codes
///    of at most one digit, otherwise keeps the chain;
/// 5. chains already at sub-heading depth are kept;
/// 6. otherwise the next level is taken from the code's digits and appended
///    when new, skipping zero-padded placeholder sub-headings.
pub fn build_taric_path<S: AsRef<str>>(category_codes: &[S], goods_code: &str) -> String {
    let mut parts = category_codes
        .iter()
        .map(|code| code.as_ref().to_string())
        .collect::<Vec<_>>();
    if parts.is_empty() {
        return String::new();
    }

    let code = normalize_goods_code(goods_code);

    if let Some(adjusted) = truncate_to_code_level(&parts, code) {
        return adjusted.join(PATH_SEPARATOR);
    }

    if chapter_mismatch(&parts, code) {
        return parts.join(PATH_SEPARATOR);
    }

    let last_len = parts.last().map_or(0, String::len);
    if code.len() < last_len {
        if code.len() <= 1 && parts.len() > 1 {
            return parts.swap_remove(0);
        }
        return parts.join(PATH_SEPARATOR);
    }

    if last_len >= SUBHEADING_LEN {
        return parts.join(PATH_SEPARATOR);
    }

    if let Some(next) = next_level(&parts, code) {
        let placeholder = last_len == HEADING_LEN
            && next.len() == SUBHEADING_LEN
            && next.ends_with("00");
        if !placeholder && !parts.iter().any(|existing| existing == next) {
            parts.push(next.to_string());
        }
    }

    parts.join(PATH_SEPARATOR)
}

/// Returns the chain cut down to the granularity of a short code, or `None`
/// when the code is longer than a heading or nothing had to change.
fn truncate_to_code_level(parts: &[String], code: &str) -> Option<Vec<String>> {
    // An empty code carries no granularity; the short-code rule handles it.
    if code.is_empty() || code.len() > HEADING_LEN {
        return None;
    }

    let mut adjusted: Vec<String> = Vec::with_capacity(parts.len());
    let mut changed = false;
    for part in parts {
        if part.len() <= code.len() {
            adjusted.push(part.clone());
            continue;
        }

        changed = true;
        if code.len() == HEADING_LEN && part.get(..HEADING_LEN) == Some(code) {
            adjusted.push(code.to_string());
            break;
        }
    }

    changed.then_some(adjusted)
}

fn chapter_mismatch(parts: &[String], code: &str) -> bool {
    if parts.len() < 2 || parts[1].len() != CHAPTER_LEN || code.len() < HEADING_LEN {
        return false;
    }
    !code[..HEADING_LEN].starts_with(parts[1].as_str())
}

fn next_level<'a>(parts: &[String], code: &'a str) -> Option<&'a str> {
    let last = parts.last()?;
    let target_len = match last.len() {
        1 => CHAPTER_LEN,
        CHAPTER_LEN => HEADING_LEN,
        HEADING_LEN => SUBHEADING_LEN,
        _ => return None,
    };
    let next = code.get(..target_len)?;

    match last.len() {
        // Section to chapter is validated upstream by the section binding.
        1 => Some(next),
        CHAPTER_LEN | HEADING_LEN if next.starts_with(last.as_str()) => Some(next),
        _ => None,
    }
}
