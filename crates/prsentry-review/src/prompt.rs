use std::fmt::Write;

use prsentry_core::PullRequestChanges;

const RESPONSE_CONTRACT: &str = "\
Respond with a JSON object:
{
  \"summary\": \"Overall review summary\",
  \"issues\": [
    {
      \"file\": \"path/to/file\",
      \"line\": 42,
      \"severity\": \"high\" | \"medium\" | \"low\",
      \"category\": \"security\" | \"performance\" | \"quality\" | \"testing\" | \"maintainability\",
      \"description\": \"What is wrong\",
      \"suggestion\": \"How to fix it\",
      \"good_practice\": false
    }
  ],
  \"recommendations\": [\"General recommendations\"],
  \"positive_notes\": [\"Things done well\"]
}

Omit \"file\" and \"line\" for findings that are not tied to one location.
Set \"good_practice\": true for positive observations.
If you find no issues, return an empty \"issues\" array.";

/// Build the single review prompt sent to the analyzer: guidelines, PR
/// metadata, the changed-file list, the full diff, and the response
/// contract.
///
/// # Examples
///
/// ```
/// use prsentry_core::PullRequestChanges;
/// use prsentry_review::prompt::build_review_prompt;
///
/// let changes = PullRequestChanges {
///     diff: "+added line".into(),
///     files: vec![],
///     title: "Fix login".into(),
///     description: String::new(),
/// };
/// let prompt = build_review_prompt(&changes, "Review carefully.");
/// assert!(prompt.contains("+added line"));
/// assert!(prompt.contains("Fix login"));
/// ```
pub fn build_review_prompt(changes: &PullRequestChanges, guidelines: &str) -> String {
    let mut prompt = String::new();
    let _ = writeln!(prompt, "{guidelines}\n");
    let _ = writeln!(prompt, "## Pull request\n");
    let _ = writeln!(prompt, "Title: {}", changes.title);
    if !changes.description.trim().is_empty() {
        let _ = writeln!(prompt, "\nDescription:\n{}", changes.description);
    }

    if !changes.files.is_empty() {
        let _ = writeln!(prompt, "\nChanged files:");
        for file in &changes.files {
            let _ = writeln!(
                prompt,
                "- {} (+{} -{})",
                file.path, file.lines_added, file.lines_removed
            );
        }
    }

    let _ = writeln!(prompt, "\n## Diff\n\n```diff\n{}\n```\n", changes.diff);
    prompt.push_str(RESPONSE_CONTRACT);
    prompt
}
