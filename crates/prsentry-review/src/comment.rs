use std::fmt::Write;

use prsentry_core::{ReviewIssue, ReviewResult, Severity};

/// Stable substring embedded in every summary comment. A PR whose comment
/// list already contains it has been reviewed; the pipeline short-circuits
/// instead of posting a duplicate set.
pub const SUMMARY_MARKER: &str = "prsentry Code Review";

fn severity_emoji(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "\u{1f534}",
        Severity::Medium => "\u{1f7e1}",
        Severity::Low => "\u{1f535}",
    }
}

/// Render the summary comment: heading (carrying [`SUMMARY_MARKER`]),
/// summary text, severity counts over the full result, recommendations,
/// and positive notes.
pub fn format_summary(result: &ReviewResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {SUMMARY_MARKER}\n");
    let _ = writeln!(out, "{}\n", result.summary);

    let _ = writeln!(
        out,
        "**Findings:** {} {} high | {} {} medium | {} {} low\n",
        severity_emoji(Severity::High),
        result.count_severity(Severity::High),
        severity_emoji(Severity::Medium),
        result.count_severity(Severity::Medium),
        severity_emoji(Severity::Low),
        result.count_severity(Severity::Low),
    );

    if !result.recommendations.is_empty() {
        let _ = writeln!(out, "## Recommendations\n");
        for rec in &result.recommendations {
            let _ = writeln!(out, "- {rec}");
        }
        out.push('\n');
    }

    if !result.positive_notes.is_empty() {
        let _ = writeln!(out, "## What went well\n");
        for note in &result.positive_notes {
            let _ = writeln!(out, "- {note}");
        }
    }

    out
}

/// Render one finding as a comment body: severity and category header,
/// description, suggestion, and a good-practice annotation when flagged.
pub fn format_issue(issue: &ReviewIssue) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "**{} {} severity — {}**\n",
        severity_emoji(issue.severity),
        issue.severity.to_string().to_uppercase(),
        issue.category,
    );
    let _ = writeln!(out, "{}\n", issue.description);
    if !issue.suggestion.trim().is_empty() {
        let _ = writeln!(out, "**Suggestion:** {}", issue.suggestion);
    }
    if issue.good_practice {
        let _ = write!(out, "\n\u{2705} Good practice — keep doing this.");
    }
    out
}
