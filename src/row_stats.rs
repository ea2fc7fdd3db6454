use serde::Serialize;

use crate::payload::RowDiff;

/// Row-level match summary derived from the join counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RowStats {
    pub full_match_count: f64,
    /// `join_count - full_match_count`; negative when upstream counters are
    /// inconsistent, and passed through unchanged.
    pub partial_match_count: f64,
    pub source_only_count: f64,
    pub target_only_count: f64,
    /// Fraction of all rows (both sides) that matched fully. Not clamped.
    pub match_rate: f64,
}

pub fn derive_row_stats(row_diff: &RowDiff) -> RowStats {
    let stats = &row_diff.stats;
    let full_match_count = round_count(stats.full_match_count);
    let join_count = round_count(stats.join_count);
    let total_rows = row_diff.source_count + row_diff.target_count;
    // A full match is one row on each side.
    let match_rate = if total_rows > 0.0 {
        2.0 * full_match_count / total_rows
    } else {
        0.0
    };
    RowStats {
        full_match_count,
        partial_match_count: join_count - full_match_count,
        source_only_count: round_count(stats.s_only_count),
        target_only_count: round_count(stats.t_only_count),
        match_rate,
    }
}

// Counters stay floats so arbitrarily large upstream values cannot overflow.
fn round_count(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0).round()
}
