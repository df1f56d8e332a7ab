//! Markdown report rendering
//!
//! Renders aggregated rollups as the two output documents: a per-package
//! summary table and a per-class detail breakdown, each ending in a bolded
//! project total row.

use crate::aggregate::Aggregate;
use crate::metrics::Metric;

const TABLE_HEADER: &str = "<tr>\n  <th colspan=\"8\">Code Coverage";

/// Guarded percentage: a zero denominator renders as 0, never NaN.
///
/// Multiplying before dividing keeps integer-valued ratios exact, so the
/// truncated health thresholds behave deterministically at boundaries.
fn percentage(covered: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        covered as f64 * 100.0 / total as f64
    }
}

/// Health glyph from the method percentage truncated toward zero. The
/// truncated value can disagree with the rounded percentage shown in the
/// adjacent cell at boundary values; external consumers expect truncation.
fn health_indicator(metrics: &Metric) -> &'static str {
    let truncated = percentage(metrics.coveredmethods, metrics.methods) as u64;
    if truncated == 100 {
        "🚀"
    } else if truncated > 80 {
        "✅"
    } else if truncated > 50 {
        "➖"
    } else {
        "❌"
    }
}

/// Render one table row. `bold` wraps every cell, label included, in
/// `<strong>`.
pub fn metric_row(label: &str, metrics: &Metric, bold: bool) -> String {
    let strong = if bold { "<strong>" } else { "" };
    let statement_pct = percentage(metrics.coveredstatements, metrics.statements);
    let method_pct = percentage(metrics.coveredmethods, metrics.methods);
    // Deliberately unguarded: a zero class count renders NaN%, preserving
    // the behavior of the system this replaces.
    let class_pct = metrics.coveredclasses as f64 * 100.0 / metrics.classes as f64;

    format!(
        "<tr>\n  <td>{strong}{label}\n  <td align=\"center\">{strong}{statement_pct:.2}%\n  <td align=\"right\">{strong}{}/{}\n  <td align=\"center\">{strong}{method_pct:.2}%\n  <td align=\"right\">{strong}{}/{}\n  <td align=\"center\">{strong}{class_pct:.2}%\n  <td align=\"right\">{strong}{}/{}\n  <td align=\"center\">{strong}{}",
        metrics.coveredstatements,
        metrics.statements,
        metrics.coveredmethods,
        metrics.methods,
        metrics.coveredclasses,
        metrics.classes,
        health_indicator(metrics),
    )
}

fn column_header(first: &str) -> String {
    format!(
        "<tr>\n  <th colspan=\"1\">{first}\n  <th colspan=\"2\">Lines\n  <th colspan=\"2\">Functions\n  <th colspan=\"2\">Classes\n  <th colspan=\"1\">Health"
    )
}

/// One summary-table fragment: a row per package plus the bold total row.
pub fn summary_table(agg: &Aggregate) -> String {
    let mut parts = vec![
        "<table>".to_string(),
        TABLE_HEADER.to_string(),
        column_header("Package"),
    ];
    for package in agg.packages.values() {
        parts.push(metric_row(&package.name, &package.metrics.metrics, false));
    }
    parts.push(metric_row("Summary", &agg.summary.metrics, true));
    parts.push("</table>".to_string());
    parts.join("\n")
}

/// One detail fragment: a collapsed block with per-class rows grouped under
/// full-width package name rows.
pub fn details_block(agg: &Aggregate) -> String {
    let mut parts = vec![
        "<details>".to_string(),
        "<summary>Code Coverage details</summary>".to_string(),
        "<table>".to_string(),
        TABLE_HEADER.to_string(),
        column_header("Class"),
    ];
    for package in agg.packages.values() {
        parts.push(format!("<tr>\n  <td colspan=\"8\"><strong>{}", package.name));
        for class in package.classes.values() {
            parts.push(metric_row(&class.name, &class.metrics, false));
        }
    }
    parts.push(metric_row("Summary", &agg.summary.metrics, true));
    parts.push("</table>".to_string());
    parts.push("</details>".to_string());
    parts.join("\n")
}

/// Accumulates one fragment pair per report and joins them into the two
/// output documents.
///
/// Each fragment list starts with an empty element and every fragment is
/// followed by two more, so the documents open with a blank line and reports
/// are separated by blank lines purely through the join.
#[derive(Debug)]
pub struct ReportAssembler {
    summary_parts: Vec<String>,
    details_parts: Vec<String>,
}

impl ReportAssembler {
    pub fn new() -> Self {
        Self {
            summary_parts: vec![String::new()],
            details_parts: vec![String::new()],
        }
    }

    pub fn push_report(&mut self, agg: &Aggregate) {
        self.summary_parts.push(summary_table(agg));
        self.summary_parts.push(String::new());
        self.summary_parts.push(String::new());

        self.details_parts.push(details_block(agg));
        self.details_parts.push(String::new());
        self.details_parts.push(String::new());
    }

    pub fn summary_document(&self) -> String {
        self.summary_parts.join("\n")
    }

    pub fn details_document(&self) -> String {
        self.details_parts.join("\n")
    }
}

impl Default for ReportAssembler {
    fn default() -> Self {
        Self::new()
    }
}
