//! Builds the display tree for a validated payload.
//!
//! [`render()`] is the single entry point a host calls. It never fails: a
//! rejected payload becomes a placeholder, and numbers outside their expected
//! range are shown as they are. Sections always come in the same order and
//! each one is produced by its own function from its slice of the payload.

use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    config::ViewConfig,
    error::Rejection,
    format::{format_cell, format_count, format_percentage, format_stat, truncate},
    grouping::group_by_column,
    payload::{ColumnStat, DiffPayload, RowDiff, SampleRow, SchemaDiff},
    row_stats::{RowStats, derive_row_stats},
    schema_changes::{SchemaChange, classify_schema_changes},
    state::{ExpandedSections, SectionId},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayTree {
    Placeholder {
        message: String,
    },
    Report {
        header: ReportHeader,
        sections: Vec<Section>,
    },
}

impl DisplayTree {
    pub fn sections(&self) -> &[Section] {
        match self {
            DisplayTree::Placeholder { .. } => &[],
            DisplayTree::Report { sections, .. } => sections,
        }
    }

    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections().iter().find(|section| section.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportHeader {
    pub source: String,
    pub target: String,
    pub source_rows: String,
    pub target_rows: String,
    pub change: String,
    pub trend: Trend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increase,
    Decrease,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub id: SectionId,
    pub title: String,
    pub badge: Option<String>,
    pub expanded: bool,
    pub body: SectionBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SectionBody {
    Schema {
        changes: Vec<SchemaChange>,
        note: Option<String>,
    },
    RowStats {
        stats: RowStats,
        lines: Vec<StatLine>,
        match_rate: String,
    },
    ColumnStats {
        table: DisplayTable,
    },
    SampleData {
        groups: Vec<SampleGroup>,
        note: Option<String>,
        source_only: Option<DisplayTable>,
        target_only: Option<DisplayTable>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatLine {
    pub symbol: char,
    pub label: String,
    pub value: String,
}

/// Which side of the comparison a sample column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellRole {
    Plain,
    Source,
    Target,
}

/// Rendered text plus the full string for tooltips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub text: String,
    pub title: String,
    pub role: CellRole,
}

impl Cell {
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            title: text.clone(),
            text,
            role: CellRole::Plain,
        }
    }

    fn with_role(mut self, role: CellRole) -> Self {
        self.role = role;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayTable {
    pub headers: Vec<Cell>,
    pub rows: Vec<Vec<Cell>>,
    /// Set when rows were cut to the sample limit.
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleGroup {
    pub column: String,
    pub table: DisplayTable,
}

pub const SCHEMA_TITLE: &str = "Schema Changes";
pub const ROW_STATS_TITLE: &str = "Row Statistics";
pub const COLUMN_STATS_TITLE: &str = "Column Statistics";
pub const SAMPLE_DATA_TITLE: &str = "Sample Data";

const IDENTICAL_SCHEMAS_NOTE: &str = "Schemas are identical";
const ALL_ROWS_MATCH_NOTE: &str = "All joined rows match";

/// Render entry point: payload outcome plus section state to a display tree.
pub fn render(
    outcome: &Result<DiffPayload, Rejection>,
    expanded: &ExpandedSections,
    config: &ViewConfig,
) -> DisplayTree {
    let payload = match outcome {
        Ok(payload) => payload,
        Err(rejection) => {
            return DisplayTree::Placeholder {
                message: rejection.to_string(),
            };
        }
    };
    let row_diff = &payload.row_diff;

    let mut sections = vec![
        schema_section(&payload.schema_diff, expanded.schema),
        row_stats_section(row_diff, expanded.rows),
    ];
    sections.extend(column_stats_section(
        &row_diff.column_stats,
        expanded.column_stats,
        config,
    ));
    sections.extend(sample_data_section(row_diff, expanded.sample_data, config));

    DisplayTree::Report {
        header: report_header(payload),
        sections,
    }
}

pub fn report_header(payload: &DiffPayload) -> ReportHeader {
    let row_diff = &payload.row_diff;
    let change = row_diff.count_pct_change;
    let trend = if change > 0.0 {
        Trend::Increase
    } else if change < 0.0 {
        Trend::Decrease
    } else {
        Trend::Unchanged
    };
    ReportHeader {
        source: payload.schema_diff.source.clone(),
        target: payload.schema_diff.target.clone(),
        source_rows: format_count(row_diff.source_count),
        target_rows: format_count(row_diff.target_count),
        change: format_percentage(change),
        trend,
    }
}

pub fn schema_section(schema_diff: &SchemaDiff, expanded: bool) -> Section {
    let changes = classify_schema_changes(schema_diff);
    let badge = if changes.has_changes {
        format!("{} changes", changes.total_changes)
    } else {
        "No changes".to_string()
    };
    let note = (!changes.has_changes).then(|| IDENTICAL_SCHEMAS_NOTE.to_string());
    Section {
        id: SectionId::Schema,
        title: SCHEMA_TITLE.to_string(),
        badge: Some(badge),
        expanded,
        body: SectionBody::Schema {
            changes: changes.entries,
            note,
        },
    }
}

pub fn row_stats_section(row_diff: &RowDiff, expanded: bool) -> Section {
    let stats = derive_row_stats(row_diff);
    let match_rate = format_percentage(stats.match_rate);
    let lines = [
        ('✓', "Full Matches", stats.full_match_count),
        ('~', "Partial Matches", stats.partial_match_count),
        ('+', "Source Only", stats.source_only_count),
        ('-', "Target Only", stats.target_only_count),
    ]
    .into_iter()
    .map(|(symbol, label, count)| StatLine {
        symbol,
        label: label.to_string(),
        value: format_count(count),
    })
    .collect();
    Section {
        id: SectionId::Rows,
        title: ROW_STATS_TITLE.to_string(),
        badge: Some(format!("{match_rate} match rate")),
        expanded,
        body: SectionBody::RowStats {
            stats,
            lines,
            match_rate,
        },
    }
}

/// `None` when there are no column statistics to show.
pub fn column_stats_section(
    column_stats: &IndexMap<String, ColumnStat>,
    expanded: bool,
    config: &ViewConfig,
) -> Option<Section> {
    let (_, first) = column_stats.first()?;

    let mut headers = vec![Cell::plain("Column")];
    headers.extend(first.stat_names().into_iter().map(|stat| Cell {
        text: truncate(stat, config.header_width).into_owned(),
        title: stat.to_string(),
        role: CellRole::Plain,
    }));

    let rows = column_stats
        .iter()
        .map(|(column, stat)| {
            let mut row = vec![Cell::plain(column.as_str())];
            row.extend(stat.values().into_iter().map(|value| {
                let (text, title) = format_stat(value, config.value_width);
                Cell {
                    text,
                    title,
                    role: CellRole::Plain,
                }
            }));
            row
        })
        .collect();

    Some(Section {
        id: SectionId::ColumnStats,
        title: COLUMN_STATS_TITLE.to_string(),
        badge: None,
        expanded,
        body: SectionBody::ColumnStats {
            table: DisplayTable {
                headers,
                rows,
                note: None,
            },
        },
    })
}

/// `None` when the payload carries no processed sample data.
pub fn sample_data_section(
    row_diff: &RowDiff,
    expanded: bool,
    config: &ViewConfig,
) -> Option<Section> {
    let samples = row_diff.processed_sample_data.as_ref()?;
    let decimals = row_diff.decimals;

    let groups = group_by_column(&samples.column_differences)
        .into_iter()
        .map(|(column, rows)| SampleGroup {
            table: difference_table(&rows, decimals, config.sample_row_limit),
            column,
        })
        .collect::<Vec<_>>();
    let note = groups
        .is_empty()
        .then(|| ALL_ROWS_MATCH_NOTE.to_string());

    Some(Section {
        id: SectionId::SampleData,
        title: SAMPLE_DATA_TITLE.to_string(),
        badge: Some(format!("{} rows", samples.total_rows())),
        expanded,
        body: SectionBody::SampleData {
            groups,
            note,
            source_only: one_sided_table(&samples.source_only, decimals, config.sample_row_limit),
            target_only: one_sided_table(&samples.target_only, decimals, config.sample_row_limit),
        },
    })
}

/// Rows of one column group; the first row decides headers and which fields
/// hold the source and target values.
fn difference_table(rows: &[SampleRow], decimals: u32, limit: usize) -> DisplayTable {
    let Some(first) = rows.first() else {
        return DisplayTable {
            headers: Vec::new(),
            rows: Vec::new(),
            note: None,
        };
    };
    let role_of = |field: &str| {
        if first.source_field.as_deref() == Some(field) {
            CellRole::Source
        } else if first.target_field.as_deref() == Some(field) {
            CellRole::Target
        } else {
            CellRole::Plain
        }
    };

    let headers = first
        .field_names()
        .map(|field| Cell::plain(field).with_role(role_of(field)))
        .collect();
    let body = rows
        .iter()
        .take(limit)
        .map(|row| {
            row.fields
                .iter()
                .map(|(field, value)| {
                    Cell::plain(format_cell(value, decimals)).with_role(role_of(field.as_str()))
                })
                .collect()
        })
        .collect();
    let note = (rows.len() > limit)
        .then(|| format!("Showing first {limit} of {} differing rows", rows.len()));
    DisplayTable {
        headers,
        rows: body,
        note,
    }
}

fn one_sided_table(rows: &[SampleRow], decimals: u32, limit: usize) -> Option<DisplayTable> {
    let first = rows.first()?;
    let headers = first.field_names().map(Cell::plain).collect();
    let body = rows
        .iter()
        .take(limit)
        .map(|row| {
            row.fields
                .values()
                .map(|value| Cell::plain(format_cell(value, decimals)))
                .collect()
        })
        .collect();
    let note = (rows.len() > limit).then(|| format!("Showing first {limit} of {} rows", rows.len()));
    Some(DisplayTable {
        headers,
        rows: body,
        note,
    })
}
