//! okta-export directory access
//!
//! Everything that talks to the Okta org:
//! - [`token`]: `private_key_jwt` client-credentials exchange
//! - [`pagination`]: Link-header pagination over collection endpoints
//! - [`client`]: the authenticated [`DirectoryClient`]
//! - [`resources`]: paths, field tables and file names per resource
//! - [`dispatch`]: runs an action as a sequence of fetch + export steps

pub mod client;
pub mod dispatch;
pub mod pagination;
pub mod resources;
pub mod token;


pub use client::{AccessToken, DirectoryClient};
pub use dispatch::{Dispatcher, RunReport, StepOutcome, StepReport};
pub use resources::Resource;
pub use token::acquire_token;
