//! Blocking HTTP client for the Image Style Service

use super::{CARTOONIZE_PATH, ServiceReply, StyleService, StylizeRequest};
use crate::error::{CartoonizerError, Result};
use reqwest::blocking::{Client, multipart};
use tracing::{debug, info, warn};

/// `StyleService` backed by a `reqwest` blocking client
#[derive(Debug, Clone)]
pub struct HttpStyleService {
    client: Client,
    endpoint: String,
}

impl HttpStyleService {
    /// Create a client for the service rooted at `base_url`
    ///
    /// The endpoint is `base_url` joined with `/cartoonize/`. Requests run to
    /// completion: the client's default timeout is disabled.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(None)
            .user_agent(format!("ai-cartoonizer/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                warn!("Failed to create HTTP client: {}", e);
                // Preserve error chain by wrapping the source error
                CartoonizerError::ConfigError(Box::new(e))
            })?;

        Ok(Self {
            client,
            endpoint: endpoint_url(base_url),
        })
    }

    fn build_form(request: &StylizeRequest) -> Result<multipart::Form> {
        let file_part = multipart::Part::bytes(request.bytes.to_vec())
            .file_name(request.file_name.clone())
            .mime_str(&request.media_type)
            .or_else(|e| {
                // Declared types are unvalidated strings from the drop surface
                debug!("Unusable media type '{}': {}", request.media_type, e);
                multipart::Part::bytes(request.bytes.to_vec())
                    .file_name(request.file_name.clone())
                    .mime_str(crate::media::UNKNOWN_MEDIA_TYPE)
            })
            .map_err(|e| CartoonizerError::ConfigError(Box::new(e)))?;

        Ok(multipart::Form::new()
            .part("file", file_part)
            .text("style", request.style.wire_name()))
    }
}

impl StyleService for HttpStyleService {
    fn stylize(&self, request: &StylizeRequest) -> Result<ServiceReply> {
        info!(
            "Sending {} ({} bytes) to {} with style {}",
            request.file_name,
            request.bytes.len(),
            self.endpoint,
            request.style
        );

        let form = Self::build_form(request)?;

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .map_err(|e| {
                warn!("Request to {} failed: {}", self.endpoint, e);
                CartoonizerError::NetworkFailure {
                    endpoint: self.endpoint.clone(),
                    source: Box::new(e),
                }
            })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = response.bytes().map_err(|e| {
            warn!("Failed to read reply body from {}: {}", self.endpoint, e);
            CartoonizerError::NetworkFailure {
                endpoint: self.endpoint.clone(),
                source: Box::new(e),
            }
        })?;

        debug!(
            "Reply from {}: status {}, {} bytes, content type {:?}",
            self.endpoint,
            status,
            body.len(),
            content_type
        );

        Ok(ServiceReply {
            status,
            content_type,
            body: body.to_vec(),
        })
    }

    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }
}

/// Join a base URL and the stylization path without doubling slashes
pub fn endpoint_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim().trim_end_matches('/'), CARTOONIZE_PATH)
}
