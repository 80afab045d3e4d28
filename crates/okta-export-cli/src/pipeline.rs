//! One export run: token, dispatch, archive, upload

use std::path::{Path, PathBuf};
use tracing::{error, info, instrument, warn};

use okta_export_core::{Action, ExportRequest, Result};
use okta_export_directory::{acquire_token, DirectoryClient, Dispatcher, RunReport};
use okta_export_jira::{AttachmentUploader, JiraSettings, UploadReceipt};

use crate::archive::{create_archive, reset_output_dir};
use crate::config::OktaSettings;

/// Where a run writes its files
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub output_dir: PathBuf,
    pub archive_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Uploaded(UploadReceipt),
    /// Upload was not requested
    Skipped,
    /// No archive was produced
    NothingToUpload,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report: RunReport,
    pub archive: Option<PathBuf>,
    pub upload: UploadStatus,
}

/// Validate a request and run it.
///
/// An invalid request fails here, before the token exchange or any
/// directory call.
pub async fn run_request(
    request: &ExportRequest,
    okta: &OktaSettings,
    jira: Option<Result<JiraSettings>>,
    options: &RunOptions,
) -> Result<RunSummary> {
    let action = request.action()?;
    info!("Action: {}", action);
    run(&action, okta, jira, options).await
}

/// Run one action end to end.
///
/// The output directory is cleared of earlier CSV files before anything is
/// exported. Only a failed token exchange or a failed reset aborts the run.
/// Failed exports are in the report; archive and upload problems are logged
/// and recorded in the summary. Pass `None` for `jira` to skip the upload.
#[instrument(skip_all, fields(action = %action))]
pub async fn run(
    action: &Action,
    okta: &OktaSettings,
    jira: Option<Result<JiraSettings>>,
    options: &RunOptions,
) -> Result<RunSummary> {
    let token = acquire_token(&okta.client_id, &okta.domain, &okta.private_key_pem, &okta.scope)
        .await?;

    reset_output_dir(&options.output_dir)?;

    let client = DirectoryClient::new(&okta.domain, &token)?;
    let dispatcher = Dispatcher::new(client, &options.output_dir);
    let report = dispatcher.execute(action).await;

    for summary in report.exported() {
        info!("{} ({} rows)", summary.path.display(), summary.rows);
    }

    let archive = match create_archive(&options.output_dir, &options.archive_path) {
        Ok(archive) => archive,
        Err(e) => {
            error!("Failed to create archive: {}", e);
            None
        }
    };

    let upload = match (archive.as_deref(), jira) {
        (None, _) => {
            info!("No archive produced, nothing to upload");
            UploadStatus::NothingToUpload
        }
        (Some(_), None) => {
            info!("Upload skipped");
            UploadStatus::Skipped
        }
        (Some(path), Some(settings)) => match upload(path, settings).await {
            Ok(receipt) => UploadStatus::Uploaded(receipt),
            Err(e) => {
                warn!("Upload failed: {}", e);
                UploadStatus::Failed(e.to_string())
            }
        },
    };

    Ok(RunSummary {
        report,
        archive,
        upload,
    })
}

async fn upload(path: &Path, settings: Result<JiraSettings>) -> Result<UploadReceipt> {
    AttachmentUploader::new(settings?)?.upload(path).await
}
