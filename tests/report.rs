mod common;

use serde_json::json;
use tablediff_view::{
    config::ViewConfig,
    payload::validate,
    render_json,
    report::{CellRole, DisplayTree, SectionBody, Trend, render},
    state::{ExpandedSections, SectionId},
    text::render_text,
};

fn fixture_tree(expanded: ExpandedSections, config: &ViewConfig) -> DisplayTree {
    let raw = common::fixture_json("orders_diff.json");
    render(&validate(Some(&raw)), &expanded, config)
}

fn texts(cells: &[tablediff_view::report::Cell]) -> Vec<&str> {
    cells.iter().map(|cell| cell.text.as_str()).collect()
}

#[test]
fn sections_render_in_fixed_order() {
    let tree = fixture_tree(ExpandedSections::default(), &ViewConfig::default());
    let ids = tree.sections().iter().map(|section| section.id).collect::<Vec<_>>();
    assert_eq!(
        ids,
        vec![
            SectionId::Schema,
            SectionId::Rows,
            SectionId::ColumnStats,
            SectionId::SampleData
        ]
    );
    let expanded = tree
        .sections()
        .iter()
        .map(|section| section.expanded)
        .collect::<Vec<_>>();
    assert_eq!(expanded, vec![true, true, false, false]);
}

#[test]
fn header_and_badges_use_display_formats() {
    let tree = fixture_tree(ExpandedSections::default(), &ViewConfig::default());
    let DisplayTree::Report { header, sections } = &tree else {
        panic!("expected a report");
    };
    assert_eq!(header.source, "dev.orders");
    assert_eq!(header.target, "prod.orders");
    assert_eq!(header.source_rows, "100");
    assert_eq!(header.target_rows, "95");
    assert_eq!(header.change, "-5.0%");
    assert_eq!(header.trend, Trend::Decrease);

    let badges = sections
        .iter()
        .map(|section| section.badge.as_deref())
        .collect::<Vec<_>>();
    assert_eq!(
        badges,
        vec![
            Some("2 changes"),
            Some("82.1% match rate"),
            None,
            Some("6 rows")
        ]
    );
}

#[test]
fn column_stats_truncate_headers_and_text_values() {
    let tree = fixture_tree(ExpandedSections::default(), &ViewConfig::default());
    let section = tree.section(SectionId::ColumnStats).expect("column stats");
    let SectionBody::ColumnStats { table } = &section.body else {
        panic!("expected column stats body");
    };
    assert_eq!(texts(&table.headers), vec!["Column", "pct_di..", "max_de..", "comment"]);
    assert_eq!(table.headers[1].title, "pct_diff");
    assert_eq!(texts(&table.rows[0]), vec!["amount", "12.5", "3.0", "rounded .."]);
    assert_eq!(table.rows[0][3].title, "rounded totals");
    assert_eq!(texts(&table.rows[1]), vec!["status", "0.3", "null", "ok"]);
}

#[test]
fn sample_data_groups_and_one_sided_tables() {
    let tree = fixture_tree(ExpandedSections::default(), &ViewConfig::default());
    let section = tree.section(SectionId::SampleData).expect("sample data");
    let SectionBody::SampleData {
        groups,
        note,
        source_only,
        target_only,
    } = &section.body
    else {
        panic!("expected sample data body");
    };
    assert_eq!(note, &None);
    assert_eq!(
        groups.iter().map(|group| group.column.as_str()).collect::<Vec<_>>(),
        vec!["amount", "status"]
    );

    let amount = &groups[0].table;
    assert_eq!(texts(&amount.headers), vec!["id", "amount__source", "amount__target"]);
    let roles = amount.headers.iter().map(|cell| cell.role).collect::<Vec<_>>();
    assert_eq!(roles, vec![CellRole::Plain, CellRole::Source, CellRole::Target]);
    assert_eq!(texts(&amount.rows[0]), vec!["1", "10.46", "10.50"]);
    assert_eq!(texts(&amount.rows[1]), vec!["3", "7", "7.25"]);

    let source_only = source_only.as_ref().expect("source only");
    assert_eq!(texts(&source_only.rows[0]), vec!["41", "3.14", "open"]);
    let target_only = target_only.as_ref().expect("target only");
    assert_eq!(texts(&target_only.rows[0]), vec!["77", "null", "void"]);
    assert_eq!(texts(&target_only.rows[1]), vec!["78", "1", "paid"]);
}

#[test]
fn sample_tables_respect_row_limit() {
    let config = ViewConfig {
        sample_row_limit: 1,
        ..ViewConfig::default()
    };
    let tree = fixture_tree(ExpandedSections::default(), &config);
    let section = tree.section(SectionId::SampleData).expect("sample data");
    let SectionBody::SampleData {
        groups,
        target_only,
        ..
    } = &section.body
    else {
        panic!("expected sample data body");
    };
    assert_eq!(groups[0].table.rows.len(), 1);
    assert_eq!(
        groups[0].table.note.as_deref(),
        Some("Showing first 1 of 2 differing rows")
    );
    assert_eq!(groups[1].table.note, None);
    let target_only = target_only.as_ref().expect("target only");
    assert_eq!(target_only.note.as_deref(), Some("Showing first 1 of 2 rows"));
}

#[test]
fn optional_sections_are_omitted() {
    let raw = json!({
        "schema_diff": { "source": "a", "target": "b" },
        "row_diff": { "source_count": 3, "target_count": 3, "column_stats": {} }
    });
    let tree = render_json(Some(&raw), &ExpandedSections::default(), &ViewConfig::default());
    let ids = tree.sections().iter().map(|section| section.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![SectionId::Schema, SectionId::Rows]);

    let schema = tree.section(SectionId::Schema).expect("schema");
    assert_eq!(schema.badge.as_deref(), Some("No changes"));
    let SectionBody::Schema { changes, note } = &schema.body else {
        panic!("expected schema body");
    };
    assert!(changes.is_empty());
    assert_eq!(note.as_deref(), Some("Schemas are identical"));
}

#[test]
fn empty_column_differences_note_all_rows_match() {
    let raw = json!({
        "schema_diff": {},
        "row_diff": { "processed_sample_data": { "column_differences": [], "source_only": [], "target_only": [] } }
    });
    let tree = render_json(Some(&raw), &ExpandedSections::default(), &ViewConfig::default());
    let section = tree.section(SectionId::SampleData).expect("sample data");
    assert_eq!(section.badge.as_deref(), Some("0 rows"));
    let SectionBody::SampleData {
        groups,
        note,
        source_only,
        target_only,
    } = &section.body
    else {
        panic!("expected sample data body");
    };
    assert!(groups.is_empty());
    assert_eq!(note.as_deref(), Some("All joined rows match"));
    assert!(source_only.is_none());
    assert!(target_only.is_none());
}

#[test]
fn anomalies_render_as_is() {
    let raw = json!({
        "schema_diff": {},
        "row_diff": {
            "source_count": 5,
            "target_count": 5,
            "stats": { "full_match_count": 8, "join_count": 6 }
        }
    });
    let tree = render_json(Some(&raw), &ExpandedSections::default(), &ViewConfig::default());
    let section = tree.section(SectionId::Rows).expect("rows");
    assert_eq!(section.badge.as_deref(), Some("160.0% match rate"));
    let SectionBody::RowStats { lines, .. } = &section.body else {
        panic!("expected row stats body");
    };
    assert_eq!(lines[1].label, "Partial Matches");
    assert_eq!(lines[1].value, "-2");
}

#[test]
fn huge_counters_render_without_overflow() {
    let raw = json!({
        "schema_diff": {},
        "row_diff": {
            "source_count": 1e19,
            "target_count": 1e19,
            "stats": { "full_match_count": 1e19, "join_count": 1e19 }
        }
    });
    let tree = render_json(Some(&raw), &ExpandedSections::default(), &ViewConfig::default());
    let section = tree.section(SectionId::Rows).expect("rows");
    assert_eq!(section.badge.as_deref(), Some("100.0% match rate"));
    let SectionBody::RowStats { lines, .. } = &section.body else {
        panic!("expected row stats body");
    };
    assert_eq!(lines[0].value, "10,000,000,000,000,000,000");
    assert_eq!(lines[1].value, "0");

    let raw = json!({
        "schema_diff": {},
        "row_diff": { "stats": { "full_match_count": 5e18, "join_count": -5e18 } }
    });
    let tree = render_json(Some(&raw), &ExpandedSections::default(), &ViewConfig::default());
    let SectionBody::RowStats { lines, .. } = &tree.section(SectionId::Rows).expect("rows").body
    else {
        panic!("expected row stats body");
    };
    assert_eq!(lines[1].value, "-10,000,000,000,000,000,000");
}

#[test]
fn placeholders_for_rejected_payloads() {
    let config = ViewConfig::default();
    let expanded = ExpandedSections::default();
    assert_eq!(
        render_text(&render_json(None, &expanded, &config), false),
        "No data available\n"
    );
    assert_eq!(
        render_text(&render_json(Some(&json!({})), &expanded, &config), false),
        "Invalid data structure\n"
    );
}

#[test]
fn text_output_hides_collapsed_bodies() {
    let tree = fixture_tree(ExpandedSections::default(), &ViewConfig::default());
    let text = render_text(&tree, false);
    assert!(text.starts_with("Source: dev.orders  Target: prod.orders\n"));
    assert!(text.contains("▼ Schema Changes [2 changes]\n    + discount : DOUBLE\n    ~ status : VARCHAR\n"));
    assert!(text.contains("✓ Full Matches     80"));
    assert!(text.contains("▶ Column Statistics\n"));
    assert!(text.contains("▶ Sample Data [6 rows]\n"));
    assert!(!text.contains("COMMON ROWS"));

    let opened = ExpandedSections::default().toggled(SectionId::SampleData);
    let text = render_text(
        &fixture_tree(opened, &ViewConfig::default()),
        false,
    );
    assert!(text.contains("COMMON ROWS Data Differences:"));
    assert!(text.contains("Column: amount"));
    assert!(text.contains("SOURCE ONLY Rows:"));
    assert!(text.contains("TARGET ONLY Rows:"));
}

#[test]
fn tree_serializes_for_hosts() {
    let tree = fixture_tree(ExpandedSections::default(), &ViewConfig::default());
    let value = serde_json::to_value(&tree).expect("serialize");
    assert_eq!(value["kind"], "report");
    assert_eq!(value["sections"][0]["id"], "schema");
    assert_eq!(value["sections"][0]["body"]["type"], "schema");
    assert_eq!(value["sections"][0]["body"]["changes"][0]["kind"], "added");
    assert_eq!(value["sections"][2]["id"], "columnStats");
}
