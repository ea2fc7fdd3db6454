//! Cell and summary formatting.
//!
//! Fixed-point output rounds half away from zero on the exact binary value of
//! the float, so `0.125` at two places is `"0.13"` while `1.005` (stored as
//! `1.00499...`) is `"1.00"`. Truncation helpers are display-only: callers keep
//! the untruncated string for titles.

use std::borrow::Cow;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::payload::SampleValue;

/// Display width for cell values before they are cut.
pub const VALUE_DISPLAY_WIDTH: usize = 8;
/// Display width for statistic header labels before they are cut.
pub const HEADER_DISPLAY_WIDTH: usize = 6;
pub const TRUNCATION_MARKER: &str = "..";
/// Largest scale `rust_decimal` can carry. Values whose integer part leaves
/// too little mantissa for the requested scale use the float formatter.
pub const MAX_DECIMALS: u32 = 28;

const STAT_DECIMALS: u32 = 1;
const COUNT_FRACTION_DIGITS: u32 = 3;

/// Canonical display string for a sample cell.
pub fn format_cell(value: &SampleValue, decimals: u32) -> String {
    match value {
        SampleValue::Number(n) if n.fract() == 0.0 => value.to_string(),
        SampleValue::Number(n) => to_fixed(*n, decimals),
        other => other.to_string(),
    }
}

/// Fixed-point rendering with exactly `digits` fractional places.
pub fn to_fixed(value: f64, digits: u32) -> String {
    let digits = digits.min(MAX_DECIMALS);
    if !value.is_finite() {
        return SampleValue::Number(value).to_string();
    }
    if let Some(exact) = Decimal::from_f64_retain(value) {
        let mut rounded =
            exact.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(digits);
        // rescale gives up scale when the 96-bit mantissa cannot hold it
        if rounded.scale() == digits {
            return rounded.to_string();
        }
    }
    // Out of decimal range or scale; the float formatter is exact enough there.
    format!("{value:.prec$}", prec = digits as usize)
}

/// Cuts `text` to `width` characters plus a `..` marker when it is longer.
pub fn truncate(text: &str, width: usize) -> Cow<'_, str> {
    if text.chars().count() <= width {
        return Cow::Borrowed(text);
    }
    let mut cut = text.chars().take(width).collect::<String>();
    cut.push_str(TRUNCATION_MARKER);
    Cow::Owned(cut)
}

/// Column-statistics cell: numbers at one decimal place, anything else as
/// its natural string cut to `width`. Returns `(text, title)`.
pub fn format_stat(value: &SampleValue, width: usize) -> (String, String) {
    let title = value.to_string();
    let text = match value {
        SampleValue::Number(n) => to_fixed(*n, STAT_DECIMALS),
        _ => truncate(&title, width).into_owned(),
    };
    (text, title)
}

/// Fraction as a percentage with one decimal place, e.g. `0.05` -> `5.0%`.
pub fn format_percentage(fraction: f64) -> String {
    format!("{}%", to_fixed(fraction * 100.0, 1))
}

/// Count with en-US thousands separators and at most three fractional digits.
pub fn format_count(value: f64) -> String {
    if !value.is_finite() {
        return SampleValue::Number(value).to_string();
    }
    let fixed = to_fixed(value.abs(), COUNT_FRACTION_DIGITS);
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut output = String::new();
    if value < 0.0 && (whole != "0" || !fraction.is_empty()) {
        output.push('-');
    }
    output.push_str(&group_thousands(whole));
    if !fraction.is_empty() {
        output.push('.');
        output.push_str(fraction);
    }
    output
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
