//! Image Style Service boundary
//!
//! The service itself is an opaque collaborator: it receives an image and a
//! style and answers with a stylized image. This module defines the seam the
//! controller talks through and how a raw reply is interpreted.
//!
//! # Wire contract
//!
//! - `POST <base>/cartoonize/` with a two-field multipart form: `file` (image
//!   bytes) and `style` (`whitebox`, `sketch` or `oilpaint`)
//! - 2xx: body is the stylized image
//! - anything else: body may be JSON with a `detail` string
//!
//! One request per call. No retries, no timeout, no cancellation.

pub mod http;

pub use http::HttpStyleService;

use crate::error::{CartoonizerError, Result};
use crate::style::Style;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Path of the stylization endpoint, relative to the service base URL
pub const CARTOONIZE_PATH: &str = "/cartoonize/";

/// Media type assumed for successful replies that don't declare one
pub const DEFAULT_RESULT_MEDIA_TYPE: &str = "image/png";

/// One stylization request
#[derive(Debug, Clone)]
pub struct StylizeRequest {
    /// Original file name, sent as the part's file name
    pub file_name: String,
    /// Declared media type of the file
    pub media_type: String,
    /// File contents
    pub bytes: Arc<[u8]>,
    /// Requested style
    pub style: Style,
}

/// Raw reply from the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceReply {
    /// HTTP status code
    pub status: u16,
    /// `Content-Type` header, if any
    pub content_type: Option<String>,
    /// Response body
    pub body: Vec<u8>,
}

/// Successful stylization output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylizedImage {
    /// Media type of the image
    pub media_type: String,
    /// Encoded image bytes
    pub bytes: Vec<u8>,
}

/// The Image Style Service seam
///
/// Implementations send exactly one request per call. Transport failures are
/// reported as [`CartoonizerError::NetworkFailure`]; any reply that arrived,
/// whatever its status, is returned as a [`ServiceReply`].
pub trait StyleService: Send + Sync {
    /// Send `request` and return the raw reply
    fn stylize(&self, request: &StylizeRequest) -> Result<ServiceReply>;

    /// Human-readable endpoint, used in log lines and error messages
    fn endpoint(&self) -> String;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

/// Extract the structured `detail` string from an error body
///
/// Bodies that aren't JSON, or whose `detail` isn't a non-empty string, yield
/// `None`.
pub fn parse_error_detail(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(detail) if !detail.trim().is_empty() => Some(detail),
        other => {
            debug!("Ignoring non-string error detail: {}", other);
            None
        }
    }
}

impl ServiceReply {
    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Interpret the reply as a stylized image or a service error
    pub fn into_result(self) -> Result<StylizedImage> {
        if !self.is_success() {
            return Err(CartoonizerError::ServiceError {
                status: self.status,
                detail: parse_error_detail(&self.body),
            });
        }

        let media_type = self
            .content_type
            .as_deref()
            .map(|value| value.split(';').next().unwrap_or(value).trim())
            .filter(|value| crate::media::is_image_media_type(value))
            .unwrap_or(DEFAULT_RESULT_MEDIA_TYPE)
            .to_string();

        Ok(StylizedImage {
            media_type,
            bytes: self.body,
        })
    }
}
