use prsentry_core::{Category, ReviewIssue, RunVerdict, Severity};

fn issue(severity: Severity) -> ReviewIssue {
    ReviewIssue {
        file: None,
        line: None,
        severity,
        category: Category::Quality,
        description: "finding".into(),
        suggestion: "fix".into(),
        good_practice: false,
    }
}

#[test]
fn gate_passes_with_only_low_findings() {
    let issues = vec![issue(Severity::Low), issue(Severity::Low)];
    let verdict = RunVerdict::from_issues(&issues);
    assert!(verdict.passed(), "low findings alone never block the pipeline");
}

#[test]
fn gate_fails_on_a_single_high_finding() {
    let issues = vec![issue(Severity::High), issue(Severity::Low)];
    let verdict = RunVerdict::from_issues(&issues);
    assert!(verdict.should_fail);
    assert_eq!(verdict.high_count, 1);
}

#[test]
fn gate_tolerates_exactly_three_mediums() {
    let issues = vec![
        issue(Severity::Medium),
        issue(Severity::Medium),
        issue(Severity::Medium),
    ];
    assert!(RunVerdict::from_issues(&issues).passed());
}

#[test]
fn gate_fails_on_a_fourth_medium() {
    let issues = vec![
        issue(Severity::Medium),
        issue(Severity::Medium),
        issue(Severity::Medium),
        issue(Severity::Medium),
    ];
    let verdict = RunVerdict::from_issues(&issues);
    assert!(verdict.should_fail);
    assert_eq!(verdict.medium_count, 4);
}
