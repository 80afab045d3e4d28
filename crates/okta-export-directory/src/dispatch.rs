//! Action dispatcher
//!
//! Maps a validated [`Action`] onto one or more resource exports and runs
//! them one after another. Sub-calls are independent: a failed fetch is
//! recorded and logged, and the remaining sub-calls of a bundle still run.
//! Files written before a failure stay on disk.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument, warn};

use okta_export_core::{
    export_record, export_records, Action, DirectorySource, ExportError, ExportSummary, Result,
};

use crate::resources::Resource;

/// Resources an action exports, in execution order
pub fn plan(action: &Action) -> Vec<Resource> {
    match action {
        Action::AllUsers => vec![Resource::Users],
        Action::AllGroups => vec![Resource::Groups],
        Action::GroupBundle { group_id } => vec![
            Resource::GroupDetail(group_id.clone()),
            Resource::GroupApps(group_id.clone()),
            Resource::GroupUsers(group_id.clone()),
        ],
        Action::AllApps => vec![Resource::Apps],
        Action::AppBundle { app_id } => vec![
            Resource::AppDetail(app_id.clone()),
            Resource::AppGroups(app_id.clone()),
        ],
        Action::AllDevices => vec![Resource::Devices],
        Action::DeviceDetail { device_id } => vec![Resource::DeviceDetail(device_id.clone())],
    }
}

/// Outcome of one resource export
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Exported(ExportSummary),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct StepReport {
    pub resource: Resource,
    pub outcome: StepOutcome,
}

/// Everything one action did
#[derive(Debug, Clone)]
pub struct RunReport {
    pub action: Action,
    pub steps: Vec<StepReport>,
}

impl RunReport {
    pub fn exported(&self) -> impl Iterator<Item = &ExportSummary> {
        self.steps.iter().filter_map(|s| match &s.outcome {
            StepOutcome::Exported(summary) => Some(summary),
            StepOutcome::Failed(_) => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Resource, &str)> {
        self.steps.iter().filter_map(|s| match &s.outcome {
            StepOutcome::Failed(reason) => Some((&s.resource, reason.as_str())),
            StepOutcome::Exported(_) => None,
        })
    }

    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Runs actions against a directory source, writing into one output directory
pub struct Dispatcher<S> {
    source: S,
    output_dir: PathBuf,
}

impl<S: DirectorySource> Dispatcher<S> {
    pub fn new(source: S, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            output_dir: output_dir.into(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    #[instrument(skip(self, action), fields(action = %action))]
    pub async fn execute(&self, action: &Action) -> RunReport {
        if let Err(e) = fs::create_dir_all(&self.output_dir) {
            error!(
                "Failed to create output directory {}: {}",
                self.output_dir.display(),
                e
            );
        }

        let mut steps = Vec::new();
        for resource in plan(action) {
            let outcome = match self.export_resource(&resource).await {
                Ok(summary) => StepOutcome::Exported(summary),
                Err(e) => {
                    error!("Failed to export {}: {}", resource, e);
                    StepOutcome::Failed(e.to_string())
                }
            };
            steps.push(StepReport { resource, outcome });
        }

        let report = RunReport {
            action: action.clone(),
            steps,
        };

        let failed = report.failures().count();
        if failed == 0 {
            info!("Action {} finished: {} file(s) exported", action, report.steps.len());
        } else {
            warn!(
                "Action {} finished with {} of {} export(s) failed",
                action,
                failed,
                report.steps.len()
            );
        }

        report
    }

    async fn export_resource(&self, resource: &Resource) -> Result<ExportSummary> {
        let file_name = resource.file_name();
        if Path::new(&file_name).file_name() != Some(OsStr::new(&file_name)) {
            return Err(ExportError::config(format!(
                "Refusing to write {} outside {}",
                file_name,
                self.output_dir.display()
            )));
        }

        let destination = self.output_dir.join(file_name);
        let mapping = resource.mapping();

        if resource.is_collection() {
            let records = self.source.fetch_all(&resource.path()).await?;
            if records.is_empty() {
                warn!("No records returned for {}", resource);
            }
            export_records(&records, &mapping, &destination)
        } else {
            let record = self.source.fetch_one(&resource.path()).await?;
            export_record(&record, &mapping, &destination)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_plans() {
        let group = plan(&Action::GroupBundle {
            group_id: "00g1".to_string(),
        });
        assert_eq!(
            group,
            vec![
                Resource::GroupDetail("00g1".to_string()),
                Resource::GroupApps("00g1".to_string()),
                Resource::GroupUsers("00g1".to_string()),
            ]
        );

        let app = plan(&Action::AppBundle {
            app_id: "0oa1".to_string(),
        });
        assert_eq!(app.len(), 2);
        assert_eq!(plan(&Action::AllDevices), vec![Resource::Devices]);
    }
}
