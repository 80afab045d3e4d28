//! okta-export Jira upload
//!
//! Attaches the run's archive to a ticket, either through the service desk
//! temporary-attachment flow or the plain issue attachments endpoint.

pub mod attachment;

pub use attachment::{
    AttachmentUploader, JiraSettings, UploadMode, UploadReceipt, DEFAULT_SERVICE_DESK_ID,
};
