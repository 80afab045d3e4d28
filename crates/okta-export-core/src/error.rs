//! Error types for okta-export

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Authentication error: {message}")]
    Auth { message: String },

    #[error("Fetch failed with HTTP {status}: {body}")]
    Fetch { status: u16, body: String },

    #[error("HTTP error: {message}")]
    Http { message: String },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("CSV error: {message}")]
    Csv { message: String },

    #[error("JSON error: {message}")]
    Json { message: String },

    #[error("Archive error: {message}")]
    Archive { message: String },

    #[error("Upload error: {message}")]
    Upload { message: String },
}

impl ExportError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    pub fn fetch(status: u16, body: impl Into<String>) -> Self {
        Self::Fetch {
            status,
            body: body.into(),
        }
    }

    pub fn http(message: impl Into<String>) -> Self {
        Self::Http {
            message: message.into(),
        }
    }

    pub fn json(message: impl Into<String>) -> Self {
        Self::Json {
            message: message.into(),
        }
    }

    pub fn archive(message: impl Into<String>) -> Self {
        Self::Archive {
            message: message.into(),
        }
    }

    pub fn upload(message: impl Into<String>) -> Self {
        Self::Upload {
            message: message.into(),
        }
    }

    /// Whether this error must terminate the run.
    ///
    /// Configuration and authentication failures stop the process before or
    /// instead of any export. Everything else is reported by the caller and
    /// the run carries on.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::Auth { .. })
    }
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        Self::Io {
            message: e.to_string(),
        }
    }
}

impl From<csv::Error> for ExportError {
    fn from(e: csv::Error) -> Self {
        Self::Csv {
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json {
            message: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
