//! The review pipeline: host client, analyzer client, response parsing,
//! comment formatting, and the orchestrator that drives one run.
//!
//! One invocation reviews one pull request: fetch the diff and metadata,
//! send them to the analyzer, parse the findings, publish them back as PR
//! comments, and compute a pass/fail verdict for the CI gate.

pub mod analyzer;
pub mod comment;
pub mod host;
pub mod parser;
pub mod pipeline;
pub mod prompt;
