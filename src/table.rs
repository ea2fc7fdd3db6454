use std::borrow::Cow;
use std::fmt::Write as _;

use itertools::Itertools;

use crate::report::{Cell, CellRole, DisplayTable};

const SOURCE_COLOR: &str = "\u{1b}[34m";
const TARGET_COLOR: &str = "\u{1b}[32m";
const RESET: &str = "\u{1b}[0m";

/// Renders a display table as aligned text, each line prefixed by `indent`
/// spaces. With `color`, source and target columns are wrapped in ANSI codes.
pub fn render_table(table: &DisplayTable, indent: usize, color: bool) -> String {
    let column_count = table
        .rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(table.headers.len()))
        .max()
        .unwrap_or_default();
    let mut widths = vec![1usize; column_count];
    for row in std::iter::once(&table.headers).chain(table.rows.iter()) {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(display_width(&sanitize_cell(&cell.text)));
        }
    }

    let prefix = " ".repeat(indent);
    let mut output = String::new();

    let header_line = format_row(&table.headers, &widths, color);
    let _ = writeln!(output, "{prefix}{header_line}");

    let separator_widths = widths.iter().map(|w| (*w).max(3)).collect::<Vec<usize>>();
    let separator_line = separator_widths.iter().map(|w| "-".repeat(*w)).join("  ");
    let _ = writeln!(output, "{prefix}{separator_line}");

    for row in &table.rows {
        let row_line = format_row(row, &widths, color);
        let _ = writeln!(output, "{prefix}{row_line}");
    }

    if let Some(note) = &table.note {
        let _ = writeln!(output, "{prefix}{note}");
    }

    output
}

fn format_row(cells: &[Cell], widths: &[usize], color: bool) -> String {
    let mut rendered = Vec::with_capacity(cells.len());
    for (idx, cell) in cells.iter().enumerate() {
        if idx >= widths.len() {
            break;
        }
        let sanitized = sanitize_cell(&cell.text);
        let padding = widths[idx].saturating_sub(display_width(sanitized.as_ref()));
        let mut text = paint(sanitized.as_ref(), cell.role, color);
        if padding > 0 {
            text.push_str(&" ".repeat(padding));
        }
        rendered.push(text);
    }
    let mut line = rendered.join("  ");
    while line.ends_with(' ') {
        line.pop();
    }
    line
}

fn paint(text: &str, role: CellRole, color: bool) -> String {
    match (color, role) {
        (true, CellRole::Source) => format!("{SOURCE_COLOR}{text}{RESET}"),
        (true, CellRole::Target) => format!("{TARGET_COLOR}{text}{RESET}"),
        _ => text.to_string(),
    }
}

pub(crate) fn display_width(value: &str) -> usize {
    let mut width = 0usize;
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            // Skip ANSI escape sequence (e.g. \x1b[31m)
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            width += 1;
        }
    }
    width
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
