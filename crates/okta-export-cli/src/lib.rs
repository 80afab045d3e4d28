//! okta-export command-line pipeline
//!
//! - [`config`]: export request, directory credentials and upload settings
//! - [`archive`]: zips the output directory
//! - [`pipeline`]: token, dispatch, archive and upload in one run

pub mod archive;
pub mod config;
pub mod pipeline;

pub use pipeline::{run, run_request, RunOptions, RunSummary, UploadStatus};
