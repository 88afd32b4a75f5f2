//! Text rendering of a [`Report`].

use crate::analysis::processlist::ProcessListTable;
use crate::analysis::schema::SchemaStats;
use crate::analysis::status::StatusDeltaTable;
use crate::analysis::{BinlogSummary, CnfListing, CountGrid, Fact};
use crate::fmt::{format_banner, format_bytes, format_name_value, fuzzy_round, render_grid};

use super::Report;

const PROCESS_RULE: &str = "  ------------------------------ -------- ------- --------- ---------";

/// Render every section in report order, separated by blank lines.
pub fn render_text(report: &Report) -> String {
    let sections = [
        ("Overview", render_overview(&report.overview)),
        ("Processlist", render_processlist(&report.processlist)),
        ("Status Counters", render_status(&report.status)),
        (
            "Schema",
            report.schema.as_ref().map(render_schema).unwrap_or_default(),
        ),
        (
            "Binary Logging",
            report.binlogs.as_ref().map(render_binlogs).unwrap_or_default(),
        ),
        (
            "Configuration File",
            report.cnf.as_ref().map(render_cnf).unwrap_or_default(),
        ),
    ];

    let mut out = String::new();
    for (i, (title, body)) in sections.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format_banner(title));
        out.push('\n');
        out.push_str(body);
    }
    out
}

fn render_facts<'a>(facts: impl IntoIterator<Item = (&'a str, String)>) -> String {
    let mut out = String::new();
    for (name, value) in facts {
        out.push_str(&format_name_value(name, &value));
        out.push('\n');
    }
    out
}

fn render_overview(facts: &[Fact]) -> String {
    render_facts(facts.iter().map(|f| (f.name.as_str(), f.value.clone())))
}

fn fuzzy(n: u64) -> u64 {
    fuzzy_round(n as f64) as u64
}

fn render_processlist(tables: &[ProcessListTable]) -> String {
    let mut out = String::new();
    for (i, table) in tables.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&process_line(
            table.group_by.label(),
            "COUNT(*)",
            "Working",
            "SUM(Time)",
            "MAX(Time)",
        ));
        out.push_str(PROCESS_RULE);
        out.push('\n');
        for group in &table.groups {
            out.push_str(&process_line(
                &group.key,
                &fuzzy(group.count).to_string(),
                &fuzzy(group.working).to_string(),
                &fuzzy(group.sum_time).to_string(),
                &fuzzy(group.max_time).to_string(),
            ));
        }
    }
    out
}

fn process_line(key: &str, count: &str, working: &str, sum: &str, max: &str) -> String {
    let line = format!("  {:<30} {:>8} {:>7} {:>9} {:>9}", key, count, working, sum, max);
    format!("{}\n", line.trim_end())
}

/// Zero and unavailable rates both render blank.
fn rate_cell(rate: Option<i64>) -> String {
    match rate {
        Some(n) if n != 0 => n.to_string(),
        _ => String::new(),
    }
}

fn status_line(name: &str, per_day: &str, per_second: &str, now: &str) -> String {
    let line = format!("{:<30} {:<10} {:<10} {:<10}", name, per_day, per_second, now);
    format!("{}\n", line.trim_end())
}

fn render_status(table: &StatusDeltaTable) -> String {
    let mut out = status_line(
        "Variable",
        "Per day",
        "Per second",
        &format!("{} secs", table.interval_secs),
    );
    for row in &table.rows {
        out.push_str(&status_line(
            &row.name,
            &rate_cell(row.per_day),
            &rate_cell(row.per_second),
            &rate_cell(row.now_per_second),
        ));
    }
    out
}

/// Databases sorted, columns in discovery order, absent cells as `0`.
fn render_count_grid(grid: &CountGrid) -> String {
    let mut headers = vec!["Database".to_string()];
    headers.extend(grid.columns().map(str::to_string));

    let rows: Vec<Vec<String>> = grid
        .sorted_rows()
        .into_iter()
        .map(|db| {
            let mut row = vec![db.to_string()];
            row.extend(grid.columns().map(|col| grid.get(db, col).to_string()));
            row
        })
        .collect();

    render_grid(&headers, &rows)
}

fn render_schema(stats: &SchemaStats) -> String {
    [
        &stats.objects,
        &stats.engines,
        &stats.index_kinds,
        &stats.column_types,
    ]
    .iter()
    .map(|grid| render_count_grid(grid))
    .collect::<Vec<_>>()
    .join("\n")
}

fn render_binlogs(summary: &BinlogSummary) -> String {
    render_facts([
        ("Binlogs", summary.count.to_string()),
        ("Zero-Sized", summary.zero_sized.to_string()),
        ("Total Size", format_bytes(fuzzy(summary.total_size))),
    ])
}

fn render_cnf(listing: &CnfListing) -> String {
    let mut out = String::new();
    for line in &listing.lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}
