use prsentry_core::{Category, ReviewIssue, ReviewResult, SentryError, Severity};
use serde::Deserialize;

#[derive(Deserialize)]
struct RawReview {
    summary: String,
    issues: Vec<RawIssue>,
    #[serde(default)]
    recommendations: Vec<String>,
    #[serde(default)]
    positive_notes: Vec<String>,
}

#[derive(Deserialize)]
struct RawIssue {
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    line: Option<serde_json::Value>,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    suggestion: String,
    #[serde(default)]
    good_practice: bool,
}

/// Parse the analyzer's raw text into a [`ReviewResult`].
///
/// Markdown code fences around the JSON payload are stripped first. The
/// payload must be an object with at least `summary` and `issues`; anything
/// else is [`SentryError::MalformedResponse`]. Unknown fields are ignored
/// and missing optional fields get defaults, so one sloppy issue entry
/// never fails the run.
///
/// # Examples
///
/// ```
/// use prsentry_review::parser::parse_review_response;
///
/// let result = parse_review_response(r#"{"summary":"ok","issues":[]}"#).unwrap();
/// assert_eq!(result.summary, "ok");
/// assert!(result.issues.is_empty());
/// ```
pub fn parse_review_response(raw: &str) -> Result<ReviewResult, SentryError> {
    let cleaned = strip_code_fences(raw);

    let parsed: RawReview = serde_json::from_str(cleaned)
        .map_err(|e| SentryError::MalformedResponse(e.to_string()))?;

    let mut issues = Vec::new();
    for raw_issue in parsed.issues {
        // A finding without a recognizable severity cannot be tallied or
        // published meaningfully; drop it instead of failing the run.
        let severity = match raw_issue.severity.as_deref().map(str::parse::<Severity>) {
            Some(Ok(severity)) => severity,
            _ => {
                tracing::warn!(
                    severity = raw_issue.severity.as_deref().unwrap_or("<missing>"),
                    "dropping issue with unrecognized severity"
                );
                continue;
            }
        };

        let category = raw_issue
            .category
            .as_deref()
            .and_then(|c| c.parse::<Category>().ok())
            .unwrap_or(Category::Uncategorized);

        let line = match &raw_issue.line {
            Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|l| {
                if l == 0 {
                    None
                } else {
                    u32::try_from(l).ok()
                }
            }),
            _ => None,
        };

        issues.push(ReviewIssue {
            file: raw_issue.file,
            line,
            severity,
            category,
            description: raw_issue.description,
            suggestion: raw_issue.suggestion,
            good_practice: raw_issue.good_practice,
        });
    }

    Ok(ReviewResult {
        summary: parsed.summary,
        issues,
        recommendations: parsed.recommendations,
        positive_notes: parsed.positive_notes,
    })
}

fn strip_code_fences(s: &str) -> &str {
    let trimmed = s.trim();
    if let Some(rest) = trimmed.strip_prefix("```json") {
        if let Some(inner) = rest.strip_suffix("```") {
            return inner.trim();
        }
    }
    if let Some(rest) = trimmed.strip_prefix("```") {
        if let Some(inner) = rest.strip_suffix("```") {
            return inner.trim();
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_response() {
        let json = r#"{
            "summary": "Two problems found",
            "issues": [
                {
                    "file": "src/auth.py",
                    "line": 42,
                    "severity": "high",
                    "category": "security",
                    "description": "Token logged in plaintext",
                    "suggestion": "Redact before logging",
                    "good_practice": false
                },
                {
                    "severity": "medium",
                    "category": "testing",
                    "description": "No test for the error path",
                    "suggestion": "Add one"
                }
            ],
            "recommendations": ["Split the handler"],
            "positive_notes": ["Good docstrings"]
        }"#;
        let result = parse_review_response(json).unwrap();
        assert_eq!(result.summary, "Two problems found");
        assert_eq!(result.issues.len(), 2);
        assert_eq!(result.issues[0].severity, Severity::High);
        assert_eq!(result.issues[0].category, Category::Security);
        assert_eq!(result.issues[0].line, Some(42));
        assert!(result.issues[1].file.is_none());
        assert!(result.issues[1].line.is_none());
        assert_eq!(result.recommendations, vec!["Split the handler"]);
        assert_eq!(result.positive_notes, vec!["Good docstrings"]);
    }

    #[test]
    fn fence_stripping_is_equivalent_to_unwrapped() {
        let payload = r#"{"summary":"ok","issues":[{"file":"a.rs","line":3,"severity":"low","description":"d","suggestion":"s"}]}"#;
        let plain = parse_review_response(payload).unwrap();
        let fenced = parse_review_response(&format!("```json\n{payload}\n```")).unwrap();
        let bare_fence = parse_review_response(&format!("```\n{payload}\n```")).unwrap();

        for parsed in [&fenced, &bare_fence] {
            assert_eq!(parsed.summary, plain.summary);
            assert_eq!(parsed.issues.len(), plain.issues.len());
            assert_eq!(parsed.issues[0].line, plain.issues[0].line);
            assert_eq!(parsed.issues[0].severity, plain.issues[0].severity);
        }
    }

    #[test]
    fn not_json_is_malformed() {
        let err = parse_review_response("not json").unwrap_err();
        assert!(matches!(err, SentryError::MalformedResponse(_)));
    }

    #[test]
    fn missing_summary_is_malformed() {
        let err = parse_review_response(r#"{"issues":[]}"#).unwrap_err();
        assert!(matches!(err, SentryError::MalformedResponse(_)));
    }

    #[test]
    fn missing_issues_is_malformed() {
        let err = parse_review_response(r#"{"summary":"ok"}"#).unwrap_err();
        assert!(matches!(err, SentryError::MalformedResponse(_)));
    }

    #[test]
    fn optional_lists_default_to_empty() {
        let result = parse_review_response(r#"{"summary":"ok","issues":[]}"#).unwrap();
        assert!(result.recommendations.is_empty());
        assert!(result.positive_notes.is_empty());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let json = r#"{"summary":"ok","issues":[],"model_note":"extra","score":9}"#;
        assert!(parse_review_response(json).is_ok());
    }

    #[test]
    fn missing_category_defaults_to_uncategorized() {
        let json = r#"{"summary":"ok","issues":[
            {"severity":"medium","description":"d","suggestion":"s"}
        ]}"#;
        let result = parse_review_response(json).unwrap();
        assert_eq!(result.issues[0].category, Category::Uncategorized);
        assert!(!result.issues[0].good_practice);
    }

    #[test]
    fn unknown_category_defaults_to_uncategorized() {
        let json = r#"{"summary":"ok","issues":[
            {"severity":"low","category":"style","description":"d","suggestion":"s"}
        ]}"#;
        let result = parse_review_response(json).unwrap();
        assert_eq!(result.issues[0].category, Category::Uncategorized);
    }

    #[test]
    fn unrecognized_severity_drops_only_that_issue() {
        let json = r#"{"summary":"ok","issues":[
            {"severity":"catastrophic","description":"d","suggestion":"s"},
            {"severity":"high","description":"real","suggestion":"s"}
        ]}"#;
        let result = parse_review_response(json).unwrap();
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].description, "real");
    }

    #[test]
    fn non_numeric_line_becomes_none() {
        let json = r#"{"summary":"ok","issues":[
            {"file":"a.rs","line":"forty-two","severity":"low","description":"d","suggestion":"s"},
            {"file":"b.rs","line":0,"severity":"low","description":"d","suggestion":"s"}
        ]}"#;
        let result = parse_review_response(json).unwrap();
        assert!(result.issues[0].line.is_none());
        assert!(result.issues[1].line.is_none(), "line 0 is not a real anchor");
    }

    #[test]
    fn good_practice_flag_survives() {
        let json = r#"{"summary":"ok","issues":[
            {"severity":"low","description":"nice","suggestion":"keep it","good_practice":true}
        ]}"#;
        let result = parse_review_response(json).unwrap();
        assert!(result.issues[0].good_practice);
    }
}
