use std::time::Duration;

use async_trait::async_trait;
use prsentry_core::{ChangedFile, CommentAnchor, HostConfig, SentryError};
use serde::Deserialize;

/// Everything the pipeline needs from the source-control host, independent
/// of transport. Implemented by [`BitbucketClient`] in production and by
/// in-memory fakes in tests.
#[async_trait]
pub trait RepositoryHost {
    /// Validate credentials before anything else is fetched.
    async fn check_auth(&self) -> Result<bool, SentryError>;

    /// Fetch the unified diff for the pull request.
    async fn fetch_diff(&self) -> Result<String, SentryError>;

    /// Fetch the ordered list of changed files with their stats.
    async fn fetch_changed_files(&self) -> Result<Vec<ChangedFile>, SentryError>;

    /// Fetch the PR title and description. The description is empty when
    /// the author wrote none.
    async fn fetch_pr_metadata(&self) -> Result<(String, String), SentryError>;

    /// Raw text of every existing comment on the pull request.
    async fn list_comments(&self) -> Result<Vec<String>, SentryError>;

    /// Post one comment, inline when an anchor is given.
    async fn post_comment(
        &self,
        body: &str,
        anchor: Option<&CommentAnchor>,
    ) -> Result<(), SentryError>;
}

/// Bitbucket Cloud REST client for one pull request.
///
/// Auth is bearer by default, or HTTP basic (username + app password) when
/// a username is configured.
pub struct BitbucketClient {
    http: reqwest::Client,
    config: HostConfig,
    api_base: String,
}

#[derive(Deserialize)]
struct DiffStatPage {
    values: Vec<DiffStatEntry>,
}

#[derive(Deserialize)]
struct DiffStatEntry {
    new: Option<DiffStatPath>,
    old: Option<DiffStatPath>,
    #[serde(default)]
    lines_added: u64,
    #[serde(default)]
    lines_removed: u64,
}

#[derive(Deserialize)]
struct DiffStatPath {
    path: String,
}

#[derive(Deserialize)]
struct PrMetadata {
    title: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize)]
struct CommentPage {
    values: Vec<CommentEntry>,
    next: Option<String>,
}

#[derive(Deserialize)]
struct CommentEntry {
    content: CommentContent,
}

#[derive(Deserialize)]
struct CommentContent {
    #[serde(default)]
    raw: String,
}

impl BitbucketClient {
    /// Create a client for the pull request identified by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SentryError::Host`] if the HTTP client cannot be built.
    pub fn new(config: HostConfig) -> Result<Self, SentryError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| SentryError::Host(format!("failed to create HTTP client: {e}")))?;
        let api_base = format!(
            "https://api.bitbucket.org/2.0/repositories/{}/{}",
            config.workspace, config.repo_slug
        );
        Ok(Self {
            http,
            config,
            api_base,
        })
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.username {
            Some(username) => request.basic_auth(username, Some(&self.config.token)),
            None => request.bearer_auth(&self.config.token),
        }
    }

    fn pr_url(&self, suffix: &str) -> String {
        format!(
            "{}/pullrequests/{}{suffix}",
            self.api_base, self.config.pr_id
        )
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, SentryError> {
        let response = self
            .authed(self.http.get(url))
            .send()
            .await
            .map_err(|e| SentryError::Host(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(SentryError::Unauthorized(format!("{status} from {url}")));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SentryError::Host(format!(
                "Bitbucket API error {status} from {url}: {body}"
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl RepositoryHost for BitbucketClient {
    async fn check_auth(&self) -> Result<bool, SentryError> {
        let url = "https://api.bitbucket.org/2.0/user";
        let response = self
            .authed(self.http.get(url))
            .send()
            .await
            .map_err(|e| SentryError::Host(format!("auth check failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Ok(false);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SentryError::Host(format!(
                "Bitbucket API error {status} from {url}: {body}"
            )));
        }
        Ok(true)
    }

    async fn fetch_diff(&self) -> Result<String, SentryError> {
        let url = self.pr_url("/diff");
        let response = self.get(&url).await?;
        response
            .text()
            .await
            .map_err(|e| SentryError::Host(format!("failed to read diff response: {e}")))
    }

    async fn fetch_changed_files(&self) -> Result<Vec<ChangedFile>, SentryError> {
        let url = self.pr_url("/diffstat");
        let response = self.get(&url).await?;
        let page: DiffStatPage = response
            .json()
            .await
            .map_err(|e| SentryError::Host(format!("failed to parse diffstat: {e}")))?;

        // Deleted files have no `new` path; fall back to the old one.
        let files = page
            .values
            .into_iter()
            .filter_map(|entry| {
                let path = entry.new.or(entry.old)?.path;
                Some(ChangedFile {
                    path,
                    lines_added: entry.lines_added,
                    lines_removed: entry.lines_removed,
                })
            })
            .collect();
        Ok(files)
    }

    async fn fetch_pr_metadata(&self) -> Result<(String, String), SentryError> {
        let url = self.pr_url("");
        let response = self.get(&url).await?;
        let meta: PrMetadata = response
            .json()
            .await
            .map_err(|e| SentryError::Host(format!("failed to parse PR metadata: {e}")))?;
        Ok((meta.title, meta.description.unwrap_or_default()))
    }

    async fn list_comments(&self) -> Result<Vec<String>, SentryError> {
        let mut url = self.pr_url("/comments");
        let mut comments = Vec::new();
        loop {
            let response = self.get(&url).await?;
            let page: CommentPage = response
                .json()
                .await
                .map_err(|e| SentryError::Host(format!("failed to parse comments: {e}")))?;
            comments.extend(page.values.into_iter().map(|c| c.content.raw));
            match page.next {
                Some(next) => url = next,
                None => break,
            }
        }
        Ok(comments)
    }

    async fn post_comment(
        &self,
        body: &str,
        anchor: Option<&CommentAnchor>,
    ) -> Result<(), SentryError> {
        let url = self.pr_url("/comments");

        let mut payload = serde_json::json!({
            "content": { "raw": body },
        });
        if let Some(anchor) = anchor {
            payload["inline"] = serde_json::json!({
                "path": anchor.file,
                "to": anchor.line,
            });
        }

        let response = self
            .authed(self.http.post(&url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| SentryError::Host(format!("failed to post comment: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SentryError::Host(format!(
                "Bitbucket API error {status} posting comment: {body}"
            )));
        }
        Ok(())
    }
}
