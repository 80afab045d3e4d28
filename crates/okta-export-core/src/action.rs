//! Export requests and the fixed set of actions they can select
//!
//! A request arrives as a small JSON document (`{"action": "detail_app",
//! "app_id": "0oa..."}`). It is validated into an [`Action`] before any
//! network activity happens, so a bad request never costs a token exchange.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::error::{ExportError, Result};

/// Raw export request as supplied by the caller
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
}

impl ExportRequest {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| ExportError::config(format!("Invalid export request JSON: {}", e)))
    }

    /// Validate the request into an executable action
    pub fn action(&self) -> Result<Action> {
        let name = present(&self.action).ok_or_else(|| {
            ExportError::config("The 'action' key is missing from the input JSON")
        })?;
        let kind: ActionKind = name.parse()?;

        let action = match kind {
            ActionKind::AllUsers => Action::AllUsers,
            ActionKind::AllGroups => Action::AllGroups,
            ActionKind::DetailGroups => Action::GroupBundle {
                group_id: required(kind, "group_id", &self.group_id)?,
            },
            ActionKind::AllApps => Action::AllApps,
            ActionKind::DetailApp => Action::AppBundle {
                app_id: required(kind, "app_id", &self.app_id)?,
            },
            ActionKind::AllDevices => Action::AllDevices,
            ActionKind::DetailDevice => Action::DeviceDetail {
                device_id: required(kind, "device_id", &self.device_id)?,
            },
        };

        Ok(action)
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Identifier that is present and safe to place in a URL path and a file name
fn required(kind: ActionKind, field: &str, value: &Option<String>) -> Result<String> {
    let id = present(value).ok_or_else(|| {
        ExportError::config(format!("Action '{}' requires a {}.", kind, field))
    })?;

    let unsafe_id = id == "."
        || id == ".."
        || id.contains(['/', '\\'])
        || id.chars().any(char::is_control);
    if unsafe_id {
        return Err(ExportError::config(format!(
            "Action '{}' has an invalid {}: {:?}",
            kind, field, id
        )));
    }

    Ok(id.to_string())
}

/// Action names accepted in a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    AllUsers,
    AllGroups,
    DetailGroups,
    AllApps,
    DetailApp,
    AllDevices,
    DetailDevice,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllUsers => write!(f, "all_users"),
            Self::AllGroups => write!(f, "all_groups"),
            Self::DetailGroups => write!(f, "detail_groups"),
            Self::AllApps => write!(f, "all_apps"),
            Self::DetailApp => write!(f, "detail_app"),
            Self::AllDevices => write!(f, "all_devices"),
            Self::DetailDevice => write!(f, "detail_device"),
        }
    }
}

impl FromStr for ActionKind {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all_users" | "list-users" => Ok(Self::AllUsers),
            "all_groups" | "list-groups" => Ok(Self::AllGroups),
            "detail_groups" | "group-detail-bundle" => Ok(Self::DetailGroups),
            "all_apps" | "list-applications" => Ok(Self::AllApps),
            "detail_app" | "application-detail-bundle" => Ok(Self::DetailApp),
            "all_devices" | "list-devices" => Ok(Self::AllDevices),
            "detail_device" | "device-detail" => Ok(Self::DetailDevice),
            other => Err(ExportError::config(format!("Unsupported action: {}", other))),
        }
    }
}

/// A validated action, carrying the identifier it needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    AllUsers,
    AllGroups,
    /// Group metadata, its assigned applications and its member users
    GroupBundle { group_id: String },
    AllApps,
    /// Application metadata and its assigned groups
    AppBundle { app_id: String },
    AllDevices,
    DeviceDetail { device_id: String },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::AllUsers => ActionKind::AllUsers,
            Self::AllGroups => ActionKind::AllGroups,
            Self::GroupBundle { .. } => ActionKind::DetailGroups,
            Self::AllApps => ActionKind::AllApps,
            Self::AppBundle { .. } => ActionKind::DetailApp,
            Self::AllDevices => ActionKind::AllDevices,
            Self::DeviceDetail { .. } => ActionKind::DetailDevice,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GroupBundle { group_id } => write!(f, "detail_groups({})", group_id),
            Self::AppBundle { app_id } => write!(f, "detail_app({})", app_id),
            Self::DeviceDetail { device_id } => write!(f, "detail_device({})", device_id),
            other => write!(f, "{}", other.kind()),
        }
    }
}
