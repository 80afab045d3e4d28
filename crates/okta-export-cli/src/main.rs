//! okta-export - Okta directory export to CSV, zipped and attached to Jira

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use okta_export_cli::config::{self, OktaSettings};
use okta_export_cli::{run_request, RunOptions, UploadStatus};

/// Export Okta users, groups, applications and devices
#[derive(Parser, Debug)]
#[command(name = "okta-export")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file holding the export request
    #[arg(long, default_value = "input.json")]
    input: PathBuf,

    /// Inline export request; takes precedence over --input
    #[arg(long, env = "INPUT_JSON", hide_env_values = true)]
    input_json: Option<String>,

    /// Directory the CSV files are written to
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Zip archive path
    #[arg(long, default_value = "okta_data.zip")]
    archive: PathBuf,

    /// Do not attach the archive to Jira
    #[arg(long)]
    skip_upload: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    let args = Args::parse();

    info!("Starting okta-export v{}", env!("CARGO_PKG_VERSION"));

    let request = config::load_request(args.input_json.as_deref(), &args.input)
        .context("Failed to load export request")?;
    request.action().context("Invalid export request")?;

    let okta = OktaSettings::from_env().context("Failed to load Okta credentials")?;

    let jira = if args.skip_upload {
        None
    } else {
        Some(config::jira_settings_from_env())
    };

    let options = RunOptions {
        output_dir: args.output_dir,
        archive_path: args.archive,
    };

    let summary = run_request(&request, &okta, jira, &options)
        .await
        .context("Export aborted")?;

    let failed = summary.report.failures().count();
    if failed > 0 {
        warn!(
            "{} of {} export(s) failed",
            failed,
            summary.report.steps.len()
        );
    }

    match &summary.upload {
        UploadStatus::Uploaded(receipt) => {
            info!("Attached {} to {}", receipt.file_name, receipt.issue_key)
        }
        UploadStatus::Failed(reason) => warn!("Archive was not attached: {}", reason),
        UploadStatus::Skipped | UploadStatus::NothingToUpload => {}
    }

    info!("Done");
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,okta_export=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .init();
}
