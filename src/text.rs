//! Plain-text rendering of a [`DisplayTree`].
//!
//! Collapsed sections print their header line only.

use std::fmt::Write as _;

use crate::{
    report::{DisplayTree, ReportHeader, Section, SectionBody, Trend},
    table::render_table,
};

const BODY_INDENT: usize = 4;
const TABLE_INDENT: usize = 6;
const LABEL_WIDTH: usize = 17;

pub fn render_text(tree: &DisplayTree, color: bool) -> String {
    let mut output = String::new();
    match tree {
        DisplayTree::Placeholder { message } => {
            let _ = writeln!(output, "{message}");
        }
        DisplayTree::Report { header, sections } => {
            write_header(&mut output, header, color);
            for section in sections {
                output.push('\n');
                write_section(&mut output, section, color);
            }
        }
    }
    output
}

fn write_header(output: &mut String, header: &ReportHeader, color: bool) {
    let _ = writeln!(
        output,
        "Source: {}  Target: {}",
        header.source, header.target
    );
    let change = match (color, header.trend) {
        (true, Trend::Increase) => format!("\u{1b}[32m{}\u{1b}[0m", header.change),
        (true, Trend::Decrease) => format!("\u{1b}[31m{}\u{1b}[0m", header.change),
        _ => header.change.clone(),
    };
    let _ = writeln!(
        output,
        "Source rows: {}  Target rows: {}  Change: {change}",
        header.source_rows, header.target_rows
    );
}

fn write_section(output: &mut String, section: &Section, color: bool) {
    let marker = if section.expanded { '▼' } else { '▶' };
    match &section.badge {
        Some(badge) => {
            let _ = writeln!(output, "{marker} {} [{badge}]", section.title);
        }
        None => {
            let _ = writeln!(output, "{marker} {}", section.title);
        }
    }
    if !section.expanded {
        return;
    }

    let pad = " ".repeat(BODY_INDENT);
    match &section.body {
        SectionBody::Schema { changes, note } => {
            if let Some(note) = note {
                let _ = writeln!(output, "{pad}✓ {note}");
            }
            for change in changes {
                let _ = writeln!(
                    output,
                    "{pad}{} {} : {}",
                    change.kind.symbol(),
                    change.column,
                    change.data_type
                );
            }
        }
        SectionBody::RowStats {
            lines, match_rate, ..
        } => {
            for line in lines {
                let _ = writeln!(
                    output,
                    "{pad}{} {:<width$}{}",
                    line.symbol,
                    line.label,
                    line.value,
                    width = LABEL_WIDTH
                );
            }
            let _ = writeln!(
                output,
                "{pad}  {:<width$}{match_rate}",
                "Match Rate",
                width = LABEL_WIDTH
            );
        }
        SectionBody::ColumnStats { table } => {
            output.push_str(&render_table(table, BODY_INDENT, color));
        }
        SectionBody::SampleData {
            groups,
            note,
            source_only,
            target_only,
        } => {
            let _ = writeln!(output, "{pad}COMMON ROWS Data Differences:");
            if let Some(note) = note {
                let _ = writeln!(output, "{pad}✓ {note}");
            }
            for group in groups {
                let _ = writeln!(output, "{pad}Column: {}", group.column);
                output.push_str(&render_table(&group.table, TABLE_INDENT, color));
            }
            if let Some(table) = source_only {
                let _ = writeln!(output, "{pad}SOURCE ONLY Rows:");
                output.push_str(&render_table(table, TABLE_INDENT, color));
            }
            if let Some(table) = target_only {
                let _ = writeln!(output, "{pad}TARGET ONLY Rows:");
                output.push_str(&render_table(table, TABLE_INDENT, color));
            }
        }
    }
}
