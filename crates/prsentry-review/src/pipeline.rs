use prsentry_core::{PullRequestChanges, ReviewerConfig, Result, RunVerdict, SentryError};

use crate::analyzer::ReviewAnalyzer;
use crate::comment;
use crate::host::RepositoryHost;
use crate::parser;
use crate::prompt;

/// The pipeline knobs that survive past startup. Credentials stay in the
/// clients; the orchestrator never touches the environment.
#[derive(Debug, Clone)]
pub struct ReviewOptions {
    /// Instruction preamble for the review prompt.
    pub guidelines: String,
    /// Also publish low-severity findings as comments.
    pub include_low_severity: bool,
}

impl From<&ReviewerConfig> for ReviewOptions {
    fn from(config: &ReviewerConfig) -> Self {
        Self {
            guidelines: config.guidelines.clone(),
            include_low_severity: config.include_low_severity,
        }
    }
}

/// Review orchestrator driving one run end to end:
/// idempotency check, fetch, analysis, filtering, publishing, verdict.
///
/// Strictly sequential; every step blocks until the previous one finished
/// and no step is ever retried. A repeated trigger on an already-reviewed
/// PR is a no-op success, never a duplicate comment set.
pub struct ReviewPipeline<H, A> {
    host: H,
    analyzer: A,
    options: ReviewOptions,
}

impl<H: RepositoryHost, A: ReviewAnalyzer> ReviewPipeline<H, A> {
    pub fn new(host: H, analyzer: A, options: ReviewOptions) -> Self {
        Self {
            host,
            analyzer,
            options,
        }
    }

    /// Execute the full review. Returns `true` when the gate passes (or the
    /// PR was already reviewed), `false` on a failing verdict or any
    /// unrecovered error. Errors never escape; they are logged and mapped
    /// to `false` so the caller only deals with an exit code.
    pub async fn run(&self) -> bool {
        match self.execute().await {
            Ok(verdict) => {
                tracing::info!(
                    high = verdict.high_count,
                    medium = verdict.medium_count,
                    passed = verdict.passed(),
                    "review complete"
                );
                verdict.passed()
            }
            Err(e) => {
                tracing::error!(error = %e, "review run failed");
                false
            }
        }
    }

    async fn execute(&self) -> Result<RunVerdict> {
        let existing = self.host.list_comments().await?;
        if existing.iter().any(|c| c.contains(comment::SUMMARY_MARKER)) {
            tracing::info!("review summary already present, skipping");
            return Ok(RunVerdict::pass());
        }

        if !self.host.check_auth().await? {
            return Err(SentryError::Unauthorized(
                "host refused the configured credentials".into(),
            ));
        }

        let changes = self.fetch_changes().await?;
        tracing::info!(
            files = changes.files.len(),
            diff_bytes = changes.diff.len(),
            "fetched pull request"
        );

        let prompt = prompt::build_review_prompt(&changes, &self.options.guidelines);
        let raw = self.analyzer.analyze(&prompt).await?;
        let result = parser::parse_review_response(&raw)?;

        let published = result.published_issues(self.options.include_low_severity);
        tracing::info!(
            findings = result.issues.len(),
            published = published.len(),
            "parsed analyzer response"
        );

        // Summary first, then one comment per finding. A posting failure
        // aborts the remainder of publishing and fails the run.
        self.host
            .post_comment(&comment::format_summary(&result), None)
            .await?;
        for issue in &published {
            let anchor = issue.anchor();
            self.host
                .post_comment(&comment::format_issue(issue), anchor.as_ref())
                .await?;
        }

        // The gate counts every finding, including unpublished low ones.
        Ok(result.verdict())
    }

    async fn fetch_changes(&self) -> Result<PullRequestChanges> {
        let diff = self.host.fetch_diff().await?;
        let files = self.host.fetch_changed_files().await?;
        let (title, description) = self.host.fetch_pr_metadata().await?;
        Ok(PullRequestChanges {
            diff,
            files,
            title,
            description,
        })
    }
}
