use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Issue severity level for review findings.
///
/// # Examples
///
/// ```
/// use prsentry_core::Severity;
///
/// let s: Severity = serde_json::from_str("\"high\"").unwrap();
/// assert_eq!(s, Severity::High);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A defect that should block the change.
    High,
    /// A real issue worth fixing before merge.
    Medium,
    /// A minor nitpick or optional improvement.
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::High => write!(f, "high"),
            Severity::Medium => write!(f, "medium"),
            Severity::Low => write!(f, "low"),
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

/// Category of a review finding.
///
/// Findings with a missing or unrecognized category fall back to
/// [`Category::Uncategorized`] rather than failing the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Security,
    Performance,
    Quality,
    Testing,
    Maintainability,
    Uncategorized,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Security => write!(f, "security"),
            Category::Performance => write!(f, "performance"),
            Category::Quality => write!(f, "quality"),
            Category::Testing => write!(f, "testing"),
            Category::Maintainability => write!(f, "maintainability"),
            Category::Uncategorized => write!(f, "uncategorized"),
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "security" => Ok(Category::Security),
            "performance" => Ok(Category::Performance),
            "quality" => Ok(Category::Quality),
            "testing" => Ok(Category::Testing),
            "maintainability" => Ok(Category::Maintainability),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// Target of an inline PR comment: a file path plus a line in the new
/// version of that file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentAnchor {
    pub file: String,
    pub line: u32,
}

/// A single review finding produced by the analyzer.
///
/// A finding may be general (no file), so `file` and `line` are optional.
/// An inline comment needs both; use [`ReviewIssue::anchor`] rather than
/// reading the fields directly.
///
/// # Examples
///
/// ```
/// use prsentry_core::{Category, ReviewIssue, Severity};
///
/// let issue = ReviewIssue {
///     file: Some("src/auth.rs".into()),
///     line: Some(42),
///     severity: Severity::High,
///     category: Category::Security,
///     description: "Token logged in plaintext".into(),
///     suggestion: "Redact before logging".into(),
///     good_practice: false,
/// };
/// assert!(issue.anchor().is_some());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewIssue {
    /// Path of the file the finding refers to, if any.
    pub file: Option<String>,
    /// Line number in the new version of the file, if any.
    pub line: Option<u32>,
    /// Severity of the finding.
    pub severity: Severity,
    /// Category of the finding.
    pub category: Category,
    /// Explanation of the finding.
    pub description: String,
    /// How to address it.
    pub suggestion: String,
    /// Marks a positive observation rather than a defect.
    #[serde(default)]
    pub good_practice: bool,
}

impl ReviewIssue {
    /// Return the inline-comment target, present only when both file and
    /// line are known. A line without a file is never anchored.
    pub fn anchor(&self) -> Option<CommentAnchor> {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => Some(CommentAnchor {
                file: file.clone(),
                line,
            }),
            _ => None,
        }
    }
}

/// The full structured outcome of one analysis pass.
///
/// Built once by the response parser and read-only afterwards; severity
/// filtering derives a new sequence instead of mutating this one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewResult {
    /// Overall review summary.
    pub summary: String,
    /// Findings, in the order the analyzer produced them.
    pub issues: Vec<ReviewIssue>,
    /// General recommendations not tied to a single finding.
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// Things the change does well.
    #[serde(default)]
    pub positive_notes: Vec<String>,
}

impl ReviewResult {
    /// Findings that should be posted as comments: low-severity ones are
    /// dropped unless `include_low` is set.
    ///
    /// This affects publication only. The pass/fail gate always counts the
    /// unfiltered findings; see [`ReviewResult::verdict`].
    pub fn published_issues(&self, include_low: bool) -> Vec<&ReviewIssue> {
        self.issues
            .iter()
            .filter(|i| include_low || i.severity != Severity::Low)
            .collect()
    }

    /// Compute the pipeline gate from the unfiltered findings.
    pub fn verdict(&self) -> RunVerdict {
        RunVerdict::from_issues(&self.issues)
    }

    /// Count findings at `severity`.
    pub fn count_severity(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

/// Pass/fail gate decision plus the severity tallies that produced it.
///
/// # Examples
///
/// ```
/// use prsentry_core::RunVerdict;
///
/// let v = RunVerdict::from_counts(0, 3);
/// assert!(v.passed());
///
/// let v = RunVerdict::from_counts(0, 4);
/// assert!(v.should_fail);
/// ```
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RunVerdict {
    /// Number of high-severity findings.
    pub high_count: usize,
    /// Number of medium-severity findings.
    pub medium_count: usize,
    /// Whether the pipeline gate should fail.
    pub should_fail: bool,
}

impl RunVerdict {
    /// Gate rule: fail on any high finding, or on more than three mediums.
    pub fn from_counts(high_count: usize, medium_count: usize) -> Self {
        Self {
            high_count,
            medium_count,
            should_fail: high_count > 0 || medium_count > 3,
        }
    }

    /// Tally findings and apply the gate rule.
    pub fn from_issues(issues: &[ReviewIssue]) -> Self {
        let high = issues.iter().filter(|i| i.severity == Severity::High).count();
        let medium = issues
            .iter()
            .filter(|i| i.severity == Severity::Medium)
            .count();
        Self::from_counts(high, medium)
    }

    /// A verdict that passes with nothing counted, used when a review has
    /// already been completed.
    pub fn pass() -> Self {
        Self::from_counts(0, 0)
    }

    pub fn passed(&self) -> bool {
        !self.should_fail
    }
}

/// One changed file from the PR, with its change stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangedFile {
    /// Path of the file in the new revision.
    pub path: String,
    /// Lines added in this PR.
    #[serde(default)]
    pub lines_added: u64,
    /// Lines removed in this PR.
    #[serde(default)]
    pub lines_removed: u64,
}

/// Immutable snapshot of one pull request, fetched once per run.
#[derive(Debug, Clone)]
pub struct PullRequestChanges {
    /// Full unified diff text.
    pub diff: String,
    /// Changed files, in the order the host returned them.
    pub files: Vec<ChangedFile>,
    /// PR title.
    pub title: String,
    /// PR free-text description (empty when the author wrote none).
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(severity: Severity) -> ReviewIssue {
        ReviewIssue {
            file: None,
            line: None,
            severity,
            category: Category::Quality,
            description: "d".into(),
            suggestion: "s".into(),
            good_practice: false,
        }
    }

    #[test]
    fn severity_roundtrips_through_json() {
        let json = serde_json::to_string(&Severity::High).unwrap();
        assert_eq!(json, "\"high\"");

        let parsed: Severity = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(parsed, Severity::Medium);
    }

    #[test]
    fn severity_from_str() {
        assert_eq!("high".parse::<Severity>().unwrap(), Severity::High);
        assert_eq!("Medium".parse::<Severity>().unwrap(), Severity::Medium);
        assert_eq!("LOW".parse::<Severity>().unwrap(), Severity::Low);
        assert!("critical".parse::<Severity>().is_err());
    }

    #[test]
    fn category_from_str_rejects_unknown() {
        assert_eq!("security".parse::<Category>().unwrap(), Category::Security);
        assert!("style".parse::<Category>().is_err());
    }

    #[test]
    fn anchor_requires_both_file_and_line() {
        let mut i = issue(Severity::High);
        assert!(i.anchor().is_none());

        i.line = Some(10);
        assert!(i.anchor().is_none(), "line without file must not anchor");

        i.file = Some("a.py".into());
        let anchor = i.anchor().unwrap();
        assert_eq!(anchor.file, "a.py");
        assert_eq!(anchor.line, 10);

        i.line = None;
        assert!(i.anchor().is_none(), "file without line must not anchor");
    }

    #[test]
    fn published_issues_drops_low_by_default() {
        let result = ReviewResult {
            summary: "ok".into(),
            issues: vec![issue(Severity::High), issue(Severity::Low), issue(Severity::Low)],
            recommendations: vec![],
            positive_notes: vec![],
        };
        assert_eq!(result.published_issues(false).len(), 1);
        assert_eq!(result.published_issues(true).len(), 3);
    }

    #[test]
    fn verdict_ignores_publication_filter() {
        // Low findings never count toward the gate, whether published or not.
        let result = ReviewResult {
            summary: "ok".into(),
            issues: vec![issue(Severity::Medium), issue(Severity::Low)],
            recommendations: vec![],
            positive_notes: vec![],
        };
        let v = result.verdict();
        assert_eq!(v.high_count, 0);
        assert_eq!(v.medium_count, 1);
        assert!(v.passed());
    }

    #[test]
    fn verdict_boundaries() {
        assert!(RunVerdict::from_counts(0, 3).passed());
        assert!(!RunVerdict::from_counts(0, 4).passed());
        assert!(!RunVerdict::from_counts(1, 0).passed());
        assert!(RunVerdict::from_counts(0, 0).passed());
    }

    #[test]
    fn verdict_from_issues_tallies() {
        let issues = vec![
            issue(Severity::High),
            issue(Severity::Medium),
            issue(Severity::Medium),
            issue(Severity::Low),
        ];
        let v = RunVerdict::from_issues(&issues);
        assert_eq!(v.high_count, 1);
        assert_eq!(v.medium_count, 2);
        assert!(v.should_fail);
    }

    #[test]
    fn good_practice_defaults_false_in_json() {
        let json = r#"{
            "file": "a.rs",
            "line": 1,
            "severity": "low",
            "category": "quality",
            "description": "d",
            "suggestion": "s"
        }"#;
        let parsed: ReviewIssue = serde_json::from_str(json).unwrap();
        assert!(!parsed.good_practice);
    }
}
