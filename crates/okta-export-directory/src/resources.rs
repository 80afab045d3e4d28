//! Catalogue of exportable directory resources

use std::fmt;

use okta_export_core::mapping::{
    FieldMapping, APP, APP_GROUP, DEVICE, GROUP_APP, GROUP_DETAIL, GROUP_LIST, GROUP_USER, USER,
};

/// One fetch + export unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Users,
    Groups,
    GroupDetail(String),
    GroupApps(String),
    GroupUsers(String),
    Apps,
    AppDetail(String),
    AppGroups(String),
    Devices,
    DeviceDetail(String),
}

impl Resource {
    /// API path relative to the org base URL
    pub fn path(&self) -> String {
        match self {
            Self::Users => "/api/v1/users?limit=200".to_string(),
            Self::Groups => "/api/v1/groups?limit=200".to_string(),
            Self::GroupDetail(id) => format!("/api/v1/groups/{}", encode(id)),
            Self::GroupApps(id) => format!("/api/v1/groups/{}/apps", encode(id)),
            Self::GroupUsers(id) => format!("/api/v1/groups/{}/users", encode(id)),
            Self::Apps => "/api/v1/apps".to_string(),
            Self::AppDetail(id) => format!("/api/v1/apps/{}", encode(id)),
            Self::AppGroups(id) => format!("/api/v1/apps/{}/groups", encode(id)),
            Self::Devices => "/api/v1/devices".to_string(),
            Self::DeviceDetail(id) => format!("/api/v1/devices/{}", encode(id)),
        }
    }

    pub fn mapping(&self) -> FieldMapping {
        match self {
            Self::Users => USER,
            Self::Groups => GROUP_LIST,
            Self::GroupDetail(_) => GROUP_DETAIL,
            Self::GroupApps(_) => GROUP_APP,
            Self::GroupUsers(_) => GROUP_USER,
            Self::Apps | Self::AppDetail(_) => APP,
            Self::AppGroups(_) => APP_GROUP,
            Self::Devices | Self::DeviceDetail(_) => DEVICE,
        }
    }

    /// Output file name inside the run's output directory
    pub fn file_name(&self) -> String {
        match self {
            Self::Users => "users.csv".to_string(),
            Self::Groups => "groups.csv".to_string(),
            Self::GroupDetail(id) => format!("group_detail_{}.csv", id),
            Self::GroupApps(id) => format!("group_apps_{}.csv", id),
            Self::GroupUsers(id) => format!("group_users_{}.csv", id),
            Self::Apps => "apps.csv".to_string(),
            Self::AppDetail(id) => format!("app_detail_{}.csv", id),
            Self::AppGroups(id) => format!("app_groups_{}.csv", id),
            Self::Devices => "devices.csv".to_string(),
            Self::DeviceDetail(id) => format!("device_detail_{}.csv", id),
        }
    }

    /// Whether the endpoint returns a paginated array rather than one record
    pub fn is_collection(&self) -> bool {
        !matches!(
            self,
            Self::GroupDetail(_) | Self::AppDetail(_) | Self::DeviceDetail(_)
        )
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Users => write!(f, "users"),
            Self::Groups => write!(f, "groups"),
            Self::GroupDetail(id) => write!(f, "group detail {}", id),
            Self::GroupApps(id) => write!(f, "group apps {}", id),
            Self::GroupUsers(id) => write!(f, "group users {}", id),
            Self::Apps => write!(f, "apps"),
            Self::AppDetail(id) => write!(f, "app detail {}", id),
            Self::AppGroups(id) => write!(f, "app groups {}", id),
            Self::Devices => write!(f, "devices"),
            Self::DeviceDetail(id) => write!(f, "device detail {}", id),
        }
    }
}

fn encode(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}
