use indexmap::IndexMap;

use crate::payload::SampleRow;

/// Group key for rows that do not name their differing column.
pub const UNKNOWN_COLUMN: &str = "unknown";

/// Partitions "value differs" rows by the column each row illustrates.
///
/// Keys appear in first-seen order and each group keeps input order, so
/// slicing the first N rows of a group is reproducible.
pub fn group_by_column(rows: &[SampleRow]) -> IndexMap<String, Vec<SampleRow>> {
    let mut groups: IndexMap<String, Vec<SampleRow>> = IndexMap::new();
    for row in rows {
        let key = row.column_name.as_deref().unwrap_or(UNKNOWN_COLUMN);
        groups.entry(key.to_string()).or_default().push(row.clone());
    }
    groups
}
