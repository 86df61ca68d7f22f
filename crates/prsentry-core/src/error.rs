/// Errors that can occur across the prsentry pipeline.
///
/// Each variant wraps a specific failure domain. Library crates use this type
/// directly; the binary crate reports through `miette` at the boundary.
///
/// # Examples
///
/// ```
/// use prsentry_core::SentryError;
///
/// let err = SentryError::Config("missing ANTHROPIC_API_KEY".into());
/// assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum SentryError {
    /// Invalid or missing configuration. Fatal at startup; no partial run is
    /// attempted.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network or HTTP failure talking to the repository host.
    #[error("repository host error: {0}")]
    Host(String),

    /// The host rejected our credentials. Distinguished from [`Self::Host`]
    /// so callers never retry it.
    #[error("repository host rejected credentials: {0}")]
    Unauthorized(String),

    /// Transport error or non-success status from the analyzer API.
    #[error("analyzer error: {0}")]
    Analyzer(String),

    /// The analyzer returned a success status but no usable content.
    #[error("analyzer returned an empty response")]
    EmptyAnalysis,

    /// The analyzer returned content that is not a well-formed review object.
    #[error("malformed analyzer response: {0}")]
    MalformedResponse(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
