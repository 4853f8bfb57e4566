//! Text report generation.
//!
//! This module renders a [`ResultsSummary`] as the plain-text report printed
//! at the end of a run. The layout is fixed so output can be diffed between
//! runs.

use crate::models::{PopulationStats, ResultsSummary, StatusStats};

/// Width of the label column, including the label's trailing colon.
const LABEL_WIDTH: usize = 24;

const OVERALL_INDENT: &str = "    ";
const STATUS_INDENT: &str = "   ";

/// Generate the complete text report.
pub fn generate_text_report(summary: &ResultsSummary) -> String {
    let mut output = String::new();

    output.push_str(&generate_overall_section(&summary.overall));

    output.push_str("By HTTP status code:\n");
    output.push_str("====================\n\n");

    let blocks: Vec<String> = summary.by_status.iter().map(generate_status_block).collect();
    output.push_str(&blocks.join("\n"));
    output.push('\n');

    output
}

/// Generate the aggregate section, including its trailing spacer line.
fn generate_overall_section(stats: &PopulationStats) -> String {
    let mut section = String::new();

    section.push_str("Results:\n");
    section.push_str("========\n");
    section.push_str(&stat_line(OVERALL_INDENT, "Number of responses:", stats.count));
    section.push_str(&stat_line(
        OVERALL_INDENT,
        "Mean response time:",
        format!("{} ms", stats.mean),
    ));
    section.push_str(&generate_percentile_lines(OVERALL_INDENT, stats));
    section.push_str(OVERALL_INDENT);
    section.push('\n');

    section
}

/// Generate the block for a single status code.
fn generate_status_block(status: &StatusStats) -> String {
    let mut block = String::new();

    block.push_str(&format!("{}:\n", status.status));
    block.push_str("====\n");
    block.push_str(&stat_line(
        STATUS_INDENT,
        "Number of responses:",
        status.stats.count,
    ));
    block.push_str(&stat_line(
        STATUS_INDENT,
        "Proportion:",
        format!("{}%", status.proportion),
    ));
    block.push_str(&stat_line(
        STATUS_INDENT,
        "Mean response time:",
        format!("{} ms", status.stats.mean),
    ));
    block.push_str(&generate_percentile_lines(STATUS_INDENT, &status.stats));

    block
}

/// Max, median and the upper percentiles, in report order.
fn generate_percentile_lines(indent: &str, stats: &PopulationStats) -> String {
    [
        ("Max response time:", stats.max),
        ("Median:", stats.p50),
        ("75th percentile:", stats.p75),
        ("90th percentile:", stats.p90),
        ("95th percentile:", stats.p95),
        ("99th percentile:", stats.p99),
    ]
    .iter()
    .map(|(label, value)| stat_line(indent, label, format!("{} ms", value)))
    .collect()
}

fn stat_line(indent: &str, label: &str, value: impl std::fmt::Display) -> String {
    format!("{}{:<width$}{}\n", indent, label, value, width = LABEL_WIDTH)
}
