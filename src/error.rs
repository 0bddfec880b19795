//! Error types for `ai-cartoonizer`
//!
//! This module defines all error types used throughout the application,
//! providing clear error messages and proper error propagation.
//!
//! Every failure a session can hit maps to a variant here, and
//! [`get_user_friendly_error`] turns each variant into the non-empty text the
//! controller stores as the session's last error.

use crate::preview::PreviewKind;
use thiserror::Error;

/// Simple error type for wrapping string messages while implementing `std::error::Error`
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StringError(pub String);

impl StringError {
    /// Create a new `StringError` from a string message
    pub fn new(msg: impl Into<String>) -> Box<Self> {
        Box::new(Self(msg.into()))
    }
}

/// Main error type for `ai-cartoonizer`
#[derive(Debug, Error)]
pub enum CartoonizerError {
    /// The submitted file does not declare an image media type
    #[error("Invalid file type: {media_type}")]
    InvalidFileType {
        /// File name as offered by the drop surface
        file_name: String,
        /// Declared media type that failed the image check
        media_type: String,
    },

    /// `generate` was invoked without a source file
    #[error("No file selected")]
    NoFileSelected,

    /// Style value is not one of the supported styles
    #[error("Invalid style: {0}")]
    InvalidStyle(String),

    /// A request is already in flight for this session
    #[error("A stylization request is already in progress")]
    Busy,

    /// The stylization service answered with a non-success status
    #[error("{}", service_error_message(.status, .detail.as_deref()))]
    ServiceError {
        /// HTTP status code of the reply
        status: u16,
        /// Structured `detail` field from the reply body, if present
        detail: Option<String>,
    },

    /// The request could not complete (connection refused, reset, DNS, ...)
    /// Preserves the underlying error source for full error chain transparency
    #[error("Failed to reach stylization service at {endpoint}: {source}")]
    NetworkFailure {
        /// Endpoint the request was sent to
        endpoint: String,
        /// Transport error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A display handle of this kind is still live
    #[error("A {0} preview handle is still live")]
    PreviewHandleLive(PreviewKind),

    /// Configuration error
    /// Preserves the underlying error source for full error chain transparency
    #[error("Configuration error: {0}")]
    ConfigError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for `ai-cartoonizer` operations
pub type Result<T> = std::result::Result<T, CartoonizerError>;

fn service_error_message(status: &u16, detail: Option<&str>) -> String {
    match detail {
        Some(detail) => format!("Service returned status {status}: {detail}"),
        None => format!("Service returned status {status}"),
    }
}

/// Convert an error to a user-friendly message
///
/// This is the text stored as the session's last error and shown by the front
/// end. It is never empty.
pub fn get_user_friendly_error(error: &CartoonizerError) -> String {
    match error {
        CartoonizerError::InvalidFileType {
            file_name,
            media_type,
        } => {
            format!(
                "{file_name} is not an image ({media_type}).\n\n\
                 Please choose a PNG, JPEG, WebP, GIF or BMP file."
            )
        }
        CartoonizerError::NoFileSelected => "Please upload an image first.".to_string(),
        CartoonizerError::InvalidStyle(value) => {
            format!("Unknown style '{value}'.\n\nAvailable styles: whitebox, sketch, oilpaint.")
        }
        CartoonizerError::Busy => "Your image is still being processed.\n\n\
             Please wait for the current request to finish."
            .to_string(),
        CartoonizerError::ServiceError { .. } => {
            format!("Failed to generate cartoon image.\n\n{error}")
        }
        CartoonizerError::NetworkFailure { endpoint, .. } => {
            format!(
                "Could not connect to the stylization service at {endpoint}.\n\n\
                 Please ensure:\n\
                 - The service is running\n\
                 - The endpoint address is correct\n\
                 - Your network connection is working"
            )
        }
        CartoonizerError::PreviewHandleLive(kind) => {
            format!(
                "Internal error: the previous {kind} preview was not released.\n\n\
                 Try resetting the session."
            )
        }
        CartoonizerError::ConfigError(_) => "Failed to load or save configuration.\n\n\
             Your settings may not persist.\n\
             Check that you have write permissions to the configuration directory."
            .to_string(),
        CartoonizerError::IoError(e) => {
            format!(
                "A file system error occurred:\n\n{e}\n\n\
                 Please check file permissions and disk space."
            )
        }
        CartoonizerError::JsonError(e) => {
            format!(
                "Configuration file is corrupted:\n\n{e}\n\n\
                 The application will use default settings."
            )
        }
    }
}
