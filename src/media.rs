//! Source files offered by the drop surface
//!
//! A [`SourceFile`] carries the file name, the media type the drop surface
//! declared for it, and the raw bytes. The controller validates the declared
//! type itself instead of trusting whatever filtering the surface applied.

use crate::error::Result;
use image::{ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Media type declared for files whose extension is not recognized
pub const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// A file selected by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    name: String,
    media_type: String,
    bytes: Arc<[u8]>,
}

impl SourceFile {
    /// Create a source file from parts the drop surface already knows
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, declaring its media type from the extension
    ///
    /// This mirrors what a browser does for dropped files: the type is a claim
    /// based on the name, not a sniff of the content.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        let media_type = media_type_for_path(path);
        debug!("Read {} ({} bytes, declared {})", name, bytes.len(), media_type);
        Ok(Self::new(name, media_type, bytes))
    }

    /// File name as offered
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared media type
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// File contents
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared handle to the file contents
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    /// Whether the declared media type is in the image category
    pub fn is_image(&self) -> bool {
        is_image_media_type(&self.media_type)
    }
}

/// Whether a media type string belongs to the `image/` category
pub fn is_image_media_type(media_type: &str) -> bool {
    media_type
        .trim()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}

/// Media type implied by a path's extension
pub fn media_type_for_path(path: &Path) -> String {
    path.extension()
        .and_then(ImageFormat::from_extension)
        .map_or_else(|| UNKNOWN_MEDIA_TYPE.to_string(), |format| format.to_mime_type().to_string())
}

/// Best-effort pixel dimensions of an encoded image
///
/// Returns `None` when the format can't be recognized or the header is
/// unreadable; previews still work without dimensions.
pub fn probe_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format().ok()?;
    reader.format()?;
    reader.into_dimensions().ok()
}
