use serde::Serialize;

use crate::payload::SchemaDiff;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

impl ChangeKind {
    pub fn symbol(self) -> char {
        match self {
            ChangeKind::Added => '+',
            ChangeKind::Removed => '-',
            ChangeKind::Modified => '~',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaChange {
    pub column: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub kind: ChangeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaChanges {
    pub has_changes: bool,
    pub total_changes: usize,
    pub entries: Vec<SchemaChange>,
}

/// Flattens the schema diff into added, then removed, then modified entries,
/// each group in the payload's own order.
pub fn classify_schema_changes(schema_diff: &SchemaDiff) -> SchemaChanges {
    let groups = [
        (ChangeKind::Added, &schema_diff.added),
        (ChangeKind::Removed, &schema_diff.removed),
        (ChangeKind::Modified, &schema_diff.modified),
    ];
    let entries = groups
        .iter()
        .flat_map(|(kind, columns)| {
            columns.iter().map(move |(column, data_type)| SchemaChange {
                column: column.clone(),
                data_type: data_type.clone(),
                kind: *kind,
            })
        })
        .collect::<Vec<_>>();
    SchemaChanges {
        has_changes: !entries.is_empty(),
        total_changes: entries.len(),
        entries,
    }
}
