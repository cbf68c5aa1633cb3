//! Starfork CLI entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse flags**: the username to verify, an optional configuration
//!    file, and an optional GitHub token.
//! 2. **Load configuration**: defaults, TOML file, and `STARFORK_*`
//!    environment variables, validated before any network call.
//! 3. **Wire observability**: configure `tracing-subscriber` (pretty or JSON
//!    on stderr) and, when configured, an OpenTelemetry OTLP exporter.
//! 4. **Construct infrastructure**: a [`github::GithubClient`] serving both
//!    the bulk snapshot and the fallback pages, and a
//!    [`account::Secp256k1AccountGenerator`], injected into the
//!    [`engine::Verifier`].
//! 5. **Report**: print the account record as JSON on stdout and choose the
//!    exit status: `0` on success, `2` when the user has not starred or
//!    forked, `1` for any other failure.

mod config;
mod telemetry;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use account::Secp256k1AccountGenerator;
use anyhow::Result;
use clap::Parser;
use engine::{FallbackScanner, Verifier};
use github::GithubClient;
use verification::{VerificationError, VerificationRequest};

/// Exit status for a negative verdict (not starred / not forked).
const EXIT_VERDICT: u8 = 2;

/// Verify that a GitHub user starred and forked the repository, then issue
/// them a fresh account.
#[derive(Parser, Debug)]
#[command(name = "starfork")]
#[command(version, about, long_about = None)]
struct Args {
    /// Your GitHub username
    #[arg(short, long)]
    username: Option<String>,

    /// Path to configuration file
    #[arg(short, long, env = "STARFORK_CONFIG")]
    config: Option<PathBuf>,

    /// GitHub token (overrides github.token from configuration)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            exit_code(&err)
        }
    }
}

fn exit_code(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<VerificationError>() {
        Some(e) if e.is_verdict() => ExitCode::from(EXIT_VERDICT),
        Some(VerificationError::Input { .. }) => {
            eprintln!("Usage: starfork -u <YOUR_GITHUB_USERNAME>");
            ExitCode::FAILURE
        }
        _ => ExitCode::FAILURE,
    }
}

/// Rejects a missing or blank username before any configuration is read.
fn required_username(username: Option<&str>) -> Result<&str, VerificationError> {
    username
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| VerificationError::Input {
            message: "a GitHub username is required".to_string(),
        })
}

async fn run(args: Args) -> Result<()> {
    let username = required_username(args.username.as_deref())?;
    let config = config::load(args.config.as_deref())?;
    let _telemetry = telemetry::init(&config.telemetry)?;
    tracing::debug!("starfork v{}", env!("CARGO_PKG_VERSION"));

    let runtime = config.into_runtime(args.token)?;
    let request = VerificationRequest::new(username, runtime.bulk_window, runtime.page_size)?;

    let github = Arc::new(GithubClient::new(runtime.github)?);
    let verifier = Verifier::new(
        github.clone(),
        FallbackScanner::new(github, runtime.fallback),
        Arc::new(Secp256k1AccountGenerator::new()),
        runtime.verifier,
    );

    let outcome = verifier.verify(&request).await?;
    tracing::info!(
        run_id = %outcome.run_id,
        stargazer_source = ?outcome.stargazer.source,
        fork = ?outcome.fork,
        "Account issued"
    );
    println!("{}", serde_json::to_string(&outcome.record)?);
    Ok(())
}
