//! Core types, configuration, and error handling for prsentry.
//!
//! This crate provides the shared foundation used by the review crates:
//! - [`SentryError`] — unified error type using `thiserror`
//! - [`ReviewerConfig`] — configuration loaded from the environment
//! - Shared types: [`Severity`], [`Category`], [`ReviewIssue`],
//!   [`ReviewResult`], [`RunVerdict`], [`PullRequestChanges`]

mod config;
mod error;
mod types;

pub use config::{AnalyzerConfig, HostConfig, ReviewerConfig, DEFAULT_GUIDELINES};
pub use error::SentryError;
pub use types::{
    Category, ChangedFile, CommentAnchor, PullRequestChanges, ReviewIssue, ReviewResult,
    RunVerdict, Severity,
};

/// A convenience `Result` type for prsentry operations.
pub type Result<T> = std::result::Result<T, SentryError>;
