//! okta-export core - domain types shared by the exporter crates
//!
//! - [`action`]: export requests and the actions they select
//! - [`mapping`]: per-resource field tables that flatten records into rows
//! - [`export`]: CSV writing
//! - [`traits`]: the seam between the dispatcher and the directory API

pub mod action;
pub mod error;
pub mod export;
pub mod mapping;
pub mod traits;

pub use action::*;
pub use error::*;
pub use export::*;
pub use mapping::{Field, FieldMapping};
pub use traits::*;
