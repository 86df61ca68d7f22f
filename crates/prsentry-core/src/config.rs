use crate::error::SentryError;

/// Default reviewing checklist used when `REVIEW_GUIDELINES` is not set.
pub const DEFAULT_GUIDELINES: &str = "\
You are an expert code reviewer. Review the pull request below and report \
genuine problems, not style preferences.

Focus on:
1. Security: injection, secrets handling, authentication, unsafe input
2. Quality: bugs, logic errors, missing error handling, edge cases
3. Performance: algorithmic cost, unnecessary allocations, N+1 calls
4. Testing: missing or weakened test coverage for the changed behavior
5. Maintainability: unclear naming, duplication, dead code";

fn default_model() -> String {
    "claude-3-sonnet-20240229".into()
}

fn default_base_url() -> String {
    "https://api.anthropic.com".into()
}

/// Analyzer (LLM provider) settings.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// API key for the provider.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Base URL for API requests.
    pub base_url: String,
    /// Maximum completion tokens per request.
    pub max_tokens: u32,
}

/// Repository host settings identifying one pull request.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Access token. Used as a bearer token, or as the password half of
    /// basic auth when `username` is set.
    pub token: String,
    /// Username for basic auth (app passwords).
    pub username: Option<String>,
    /// Workspace the repository lives in.
    pub workspace: String,
    /// Repository slug.
    pub repo_slug: String,
    /// Pull request id.
    pub pr_id: u64,
}

/// Immutable configuration for one review run, loaded once at startup and
/// passed into the pipeline. Nothing deeper reads the environment.
///
/// # Examples
///
/// ```
/// use prsentry_core::ReviewerConfig;
///
/// let err = ReviewerConfig::from_lookup(|_| None).unwrap_err();
/// assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
/// assert!(err.to_string().contains("BITBUCKET_PR_ID"));
/// ```
#[derive(Debug, Clone)]
pub struct ReviewerConfig {
    pub analyzer: AnalyzerConfig,
    pub host: HostConfig,
    /// Instruction preamble for the review prompt.
    pub guidelines: String,
    /// Also publish low-severity findings as comments.
    pub include_low_severity: bool,
}

const REQUIRED_VARS: [&str; 5] = [
    "ANTHROPIC_API_KEY",
    "BITBUCKET_TOKEN",
    "BITBUCKET_WORKSPACE",
    "BITBUCKET_REPO_SLUG",
    "BITBUCKET_PR_ID",
];

impl ReviewerConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`SentryError::Config`] listing every missing required
    /// variable, or describing an unparseable value.
    pub fn from_env() -> Result<Self, SentryError> {
        Self::from_lookup(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
    }

    /// Load configuration through an explicit lookup function.
    ///
    /// This is what [`ReviewerConfig::from_env`] uses underneath; tests pass
    /// a map instead of mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SentryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let missing: Vec<&str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|key| lookup(key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(SentryError::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let pr_id_raw = lookup("BITBUCKET_PR_ID").unwrap_or_default();
        let pr_id: u64 = pr_id_raw.parse().map_err(|_| {
            SentryError::Config(format!("BITBUCKET_PR_ID is not a number: {pr_id_raw}"))
        })?;

        let max_tokens = match lookup("ANTHROPIC_MAX_TOKENS") {
            Some(raw) => raw.parse().map_err(|_| {
                SentryError::Config(format!("ANTHROPIC_MAX_TOKENS is not a number: {raw}"))
            })?,
            None => 4096,
        };

        Ok(Self {
            analyzer: AnalyzerConfig {
                api_key: lookup("ANTHROPIC_API_KEY").unwrap_or_default(),
                model: lookup("ANTHROPIC_MODEL").unwrap_or_else(default_model),
                base_url: lookup("ANTHROPIC_BASE_URL").unwrap_or_else(default_base_url),
                max_tokens,
            },
            host: HostConfig {
                token: lookup("BITBUCKET_TOKEN").unwrap_or_default(),
                username: lookup("BITBUCKET_USERNAME"),
                workspace: lookup("BITBUCKET_WORKSPACE").unwrap_or_default(),
                repo_slug: lookup("BITBUCKET_REPO_SLUG").unwrap_or_default(),
                pr_id,
            },
            guidelines: lookup("REVIEW_GUIDELINES")
                .unwrap_or_else(|| DEFAULT_GUIDELINES.to_string()),
            include_low_severity: lookup("INCLUDE_LOW_SEVERITY")
                .map(|v| parse_bool(&v))
                .unwrap_or(false),
        })
    }
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
