//! Report aggregator CLI.
//!
//! Reads a finished pipeline run (`final_output.json` or the path given as
//! the first argument), scores it on both tracks, and writes the nested
//! report plus its flattened single-row CSV projection.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use recruiter::config::Config;
use recruiter::llm_client::LlmClient;
use recruiter::models::RunArtifact;
use recruiter::report::build_report;

const REPORT_JSON: &str = "recruitment_system_evaluation.json";
const REPORT_CSV: &str = "recruitment_system_evaluation.csv";

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("recruiter={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let input = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("final_output.json"));
    info!("Evaluating pipeline run from {}", input.display());

    let artifact: RunArtifact = serde_json::from_str(
        &fs::read_to_string(&input)
            .with_context(|| format!("failed to read '{}'", input.display()))?,
    )
    .with_context(|| format!("'{}' is not a pipeline run artifact", input.display()))?;

    let llm = LlmClient::new(config.anthropic_api_key.clone());
    let report = build_report(&llm, &artifact).await?;

    fs::write(REPORT_JSON, serde_json::to_string_pretty(&report)?)?;
    fs::write(REPORT_CSV, report.to_csv()?)?;

    println!("Saved {REPORT_JSON}");
    println!("Saved {REPORT_CSV}");
    Ok(())
}
