use comfy_table::{Cell, Color, Table};

use crate::client::models::Severity;
use crate::report::aggregate::{FileReports, IssueRow};
use crate::utils::table::new_table;

pub const REPORT_HEADERS: [&str; 5] = [
    "Line",
    "Column",
    "SWC Title",
    "Severity",
    "Short Description",
];

/// Printed in the Line and Column cells of unresolved locations.
pub const UNRESOLVED_MARKER: &str = "-";

fn severity_cell(severity: Severity) -> Cell {
    Cell::new(severity).fg(match severity {
        Severity::High => Color::Red,
        Severity::Medium => Color::Yellow,
        Severity::Low => Color::Green,
        Severity::Unknown => Color::Blue,
    })
}

pub fn issue_table(rows: &[IssueRow]) -> Table {
    let mut table = new_table();
    table.set_header(REPORT_HEADERS.to_vec());

    for row in rows {
        let (line, column) = match row.position {
            Some(p) => (p.line.to_string(), p.column.to_string()),
            None => (UNRESOLVED_MARKER.to_owned(), UNRESOLVED_MARKER.to_owned()),
        };
        table.add_row(vec![
            Cell::new(line),
            Cell::new(column),
            Cell::new(&row.swc_title),
            severity_cell(row.severity),
            Cell::new(&row.description_short),
        ]);
    }
    table
}

/// One `Report for <file>` heading plus table per source file.
pub fn render_report(reports: &FileReports) -> String {
    let mut out = String::new();
    for (file, rows) in reports.iter() {
        out.push_str(&format!("Report for {file}\n{}\n", issue_table(rows)));
    }
    out
}
