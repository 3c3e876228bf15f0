use thiserror::Error;

use crate::models::DatasetId;

/// Transportnivå: alt som kan gå galt mellom oss og backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("request timeout: server took too long to respond")]
    Timeout,

    #[error("cannot connect to backend: {0}")]
    Transport(String),

    #[error("unexpected response body at {path}: {message}")]
    Decode { path: String, message: String },

    #[error("failed to read response body: {0}")]
    Io(#[from] std::io::Error),
    /// Ingen sesjon; kallet ble aldri sendt.
    #[error("not logged in")]
    NotAuthenticated,
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Retry gir bare mening når vi aldri fikk et svar fra serveren.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Timeout | ApiError::Transport(_))
    }

    /// Serverens egen melding hvis vi har en, ellers feilteksten.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("please enter both username and password")]
    MissingCredentials,

    #[error("invalid credentials, please check your username and password")]
    InvalidCredentials,

    #[error("login failed: {}", .message.as_deref().unwrap_or("backend unreachable"))]
    Unreachable { message: Option<String> },
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("please select a file first")]
    NoFileSelected,

    #[error("not logged in")]
    NotAuthenticated,

    #[error("upload rejected: {0}")]
    Rejected(String),

    #[error("upload failed: {0}")]
    Unreachable(String),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("not logged in")]
    NotAuthenticated,

    #[error("failed to load dataset {id}: {message}")]
    DatasetUnavailable { id: DatasetId, message: String },

    #[error("failed to generate PDF report for dataset {id}: {message}")]
    ReportGenerationFailed { id: DatasetId, message: String },

    #[error("could not determine the latest dataset: {0}")]
    LatestUnknown(String),

    #[error("request timeout: server took too long to respond")]
    Timeout,
}
