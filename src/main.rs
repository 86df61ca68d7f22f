use clap::Parser;
use miette::Result;

use prsentry_core::ReviewerConfig;
use prsentry_review::analyzer::ClaudeClient;
use prsentry_review::host::BitbucketClient;
use prsentry_review::pipeline::{ReviewOptions, ReviewPipeline};

#[derive(Parser)]
#[command(
    name = "prsentry",
    version,
    about = "AI code review gate for Bitbucket pipelines",
    long_about = "prsentry reviews one pull request per invocation: it fetches the diff\n\
                   and metadata from Bitbucket, asks an LLM for findings, posts them back\n\
                   as PR comments, and exits non-zero when the findings should block the\n\
                   pipeline.\n\n\
                   Configuration comes from the environment (ANTHROPIC_API_KEY,\n\
                   BITBUCKET_TOKEN, BITBUCKET_WORKSPACE, BITBUCKET_REPO_SLUG,\n\
                   BITBUCKET_PR_ID, and optional overrides).\n\n\
                   Exit codes:\n  \
                     0  review passed, or this PR was already reviewed\n  \
                     1  review failed, or an error occurred during the run"
)]
struct Cli {
    /// Also publish low-severity findings as comments
    #[arg(long)]
    include_low_severity: bool,

    /// Enable verbose logging
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = ReviewerConfig::from_env()?;
    if cli.include_low_severity {
        config.include_low_severity = true;
    }

    let host = BitbucketClient::new(config.host.clone())?;
    let analyzer = ClaudeClient::new(&config.analyzer)?;
    let pipeline = ReviewPipeline::new(host, analyzer, ReviewOptions::from(&config));

    let passed = pipeline.run().await;
    std::process::exit(if passed { 0 } else { 1 });
}
