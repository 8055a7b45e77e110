use serde::Serialize;
use std::fmt;
use thiserror::Error;

pub const TIMEOUT_MESSAGE: &str =
    "Request timed out. The server may be waking up — please try again.";

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AppError {
    pub message: String,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

/// Why a submission ended in `Failed`. The `Display` text is what the user sees.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", content = "detail")]
pub enum FailureReason {
    #[error("{}", TIMEOUT_MESSAGE)]
    Timeout,
    #[error("{0}")]
    ServerRejected(String),
    #[error("{0}")]
    TransportError(String),
    #[error("Malformed response from server: {0}")]
    MalformedResponse(String),
}

/// A file the staging area refused to hold.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum RejectedFile {
    #[error("Unsupported file type '{mime_type}' for {name}. Please select a JPG or PNG image.")]
    UnsupportedType { name: String, mime_type: String },
    #[error("Failed to read {name}: {reason}")]
    Unreadable { name: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("An analysis is already in progress")]
    InFlight,
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError {
            message: err.to_string(),
        }
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError {
            message: err.to_string(),
        }
    }
}

impl From<FailureReason> for AppError {
    fn from(err: FailureReason) -> Self {
        AppError {
            message: err.to_string(),
        }
    }
}

impl From<RejectedFile> for AppError {
    fn from(err: RejectedFile) -> Self {
        AppError {
            message: err.to_string(),
        }
    }
}

impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        AppError {
            message: err.to_string(),
        }
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError { message: msg }
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError {
            message: msg.to_string(),
        }
    }
}
