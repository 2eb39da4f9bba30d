//! Numeric goods-code extraction.

use log::warn;

/// Why a goods code has no usable numeric value.
#[derive(Debug, Clone, PartialEq, Eq)]
enum NumericCodeIssue {
    NoDigits,
    Unparsable(String),
}

/// Extracts the numeric value of a noisy goods-code string.
///
/// - With more than one space, everything before the last space is the code
///   body (the trailing token is the product-line suffix).
/// - Otherwise only the first space-separated token is used.
/// - Dashes and any other non-digit characters are dropped.
///
/// Never fails: input without digits, or digits overflowing `i64`, yields `0`
/// and a `data_quality` log event.
pub fn extract_numeric_part(goods_code: &str) -> i64 {
    match parse_numeric_part(goods_code) {
        Ok(value) => value,
        Err(NumericCodeIssue::NoDigits) => {
            warn!(
                "event=data_quality module=code kind=goods_code_without_digits goods_code={:?}",
                goods_code
            );
            0
        }
        Err(NumericCodeIssue::Unparsable(error)) => {
            warn!(
                "event=data_quality module=code kind=goods_code_unparsable goods_code={:?} error={}",
                goods_code, error
            );
            0
        }
    }
}

fn parse_numeric_part(goods_code: &str) -> Result<i64, NumericCodeIssue> {
    let body = if goods_code.matches(' ').count() > 1 {
        goods_code
            .rfind(' ')
            .map_or(goods_code, |last_space| &goods_code[..last_space])
    } else {
        goods_code.split(' ').next().unwrap_or_default()
    };

    let digits = body
        .chars()
        .filter(char::is_ascii_digit)
        .collect::<String>();
    if digits.is_empty() {
        return Err(NumericCodeIssue::NoDigits);
    }

    digits
        .parse::<i64>()
        .map_err(|err| NumericCodeIssue::Unparsable(err.to_string()))
}
