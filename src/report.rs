//! Plain-text rendering of a server report for the CLI.

use crate::payload::{Quantity, ServerRecord};
use crate::ranking::StrategyRanking;
use std::fmt::Write;

pub const NOT_AVAILABLE: &str = "N/A";

/// One labelled line of the "Server Details" list.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailRow {
    pub label: &'static str,
    pub value: String,
}

/// Whole numbers print without a fractional part: `40.0` -> `40`, `12.5` -> `12.5`.
pub fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn or_not_available(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Numbers get their unit; text the backend stored in place of a number is
/// shown as-is.
fn with_unit(value: &Quantity, unit: impl Fn(String) -> String) -> String {
    match value {
        Quantity::Number(n) => unit(format_quantity(*n)),
        Quantity::Text(text) => or_not_available(Some(text.as_str())),
    }
}

pub fn detail_rows(record: &ServerRecord) -> Vec<DetailRow> {
    let row = |label, value| DetailRow { label, value };
    vec![
        row("Server Name", record.server_name.clone()),
        row(
            "CPU Utilization",
            with_unit(&record.cpu_utilization, |n| format!("{}%", n)),
        ),
        row(
            "Memory Utilization",
            with_unit(&record.memory_utilization, |n| format!("{} MB", n)),
        ),
        row("Storage", with_unit(&record.storage, |n| format!("{} GB", n))),
        row(
            "Network Utilization",
            with_unit(&record.network_utilization, |n| format!("{}%", n)),
        ),
        row("Cost", with_unit(&record.cost, |n| format!("${}", n))),
        row("Instance Type", or_not_available(record.instance_type.as_deref())),
        row(
            "Primary Strategy",
            or_not_available(record.primary_strategy.as_deref()),
        ),
        row(
            "Software",
            if record.software.is_empty() {
                "None".to_string()
            } else {
                record.software.join(", ")
            },
        ),
    ]
}

/// Horizontal bars scaled so the highest score spans `width` columns.
pub fn render_bar_chart(ranking: &StrategyRanking, width: usize) -> String {
    let label_width = ranking
        .ordered
        .iter()
        .map(|s| s.label.chars().count())
        .max()
        .unwrap_or(0);
    let max = ranking.max_score();

    let mut out = String::new();
    for strategy in &ranking.ordered {
        let filled = if max > 0.0 && strategy.score > 0.0 {
            ((strategy.score / max) * width as f64).round() as usize
        } else {
            0
        };
        let _ = writeln!(
            out,
            "  {:<label_width$} │{} {}",
            strategy.label,
            "█".repeat(filled),
            format_quantity(strategy.score),
        );
    }
    out
}

/// Details list, then the strategy chart when there are scores to rank.
pub fn render_text_report(
    record: &ServerRecord,
    ranking: Option<&StrategyRanking>,
    chart_width: usize,
) -> String {
    let rows = detail_rows(record);
    let label_width = rows.iter().map(|r| r.label.len()).max().unwrap_or(0) + 1;

    let mut out = String::from("Server Details\n");
    for row in &rows {
        let _ = writeln!(
            out,
            "  {:<label_width$} {}",
            format!("{}:", row.label),
            row.value
        );
    }

    match ranking {
        Some(ranking) => {
            let top_label = ranking
                .top_entry()
                .map(|s| s.label.clone())
                .unwrap_or_else(|| ranking.top.clone());
            let _ = writeln!(out, "\nStrategy Scores (top: {})", top_label);
            out.push_str(&render_bar_chart(ranking, chart_width));
        }
        None => out.push_str("\nNo strategy scores available.\n"),
    }
    out
}
