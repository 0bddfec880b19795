//! Downloadable result artifacts
//!
//! A download is a named copy of the bytes the service returned. Names follow
//! `ai-cartoonizer-<style>-<epoch-millis>.png`; the content is never re-encoded.

use crate::error::{CartoonizerError, Result, StringError};
use crate::style::Style;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

/// Fixed prefix of every download file name
pub const FILE_PREFIX: &str = "ai-cartoonizer";

/// A named result ready to be written somewhere
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    file_name: String,
    bytes: Arc<[u8]>,
}

impl DownloadArtifact {
    /// Create an artifact for `style` stamped with `epoch_millis`
    pub fn new(style: Style, bytes: Arc<[u8]>, epoch_millis: u128) -> Self {
        Self {
            file_name: file_name_for(style, epoch_millis),
            bytes,
        }
    }

    /// Create an artifact stamped with the current time
    pub fn now(style: Style, bytes: Arc<[u8]>) -> Self {
        Self::new(style, bytes, current_epoch_millis())
    }

    /// File name of the artifact
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Artifact contents
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Write the artifact into `dir`, creating the directory if needed
    ///
    /// The file is written to a temporary sibling and persisted in one rename,
    /// so a reader never observes a partial image.
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;

        let target = dir.join(&self.file_name);
        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(&self.bytes)?;
        temp.flush()?;
        temp.persist(&target).map_err(|e| {
            warn!("Failed to persist {}: {}", target.display(), e);
            CartoonizerError::IoError(e.error)
        })?;

        info!("Saved {} ({} bytes)", target.display(), self.bytes.len());
        Ok(target)
    }
}

/// Compose the download file name for `style` at `epoch_millis`
pub fn file_name_for(style: Style, epoch_millis: u128) -> String {
    format!("{FILE_PREFIX}-{}-{epoch_millis}.png", style.wire_name())
}

/// Milliseconds since the Unix epoch
pub fn current_epoch_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

/// Check that `dir` can be used as a download target
pub fn ensure_writable_dir(dir: &Path) -> Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(CartoonizerError::ConfigError(StringError::new(format!(
            "Download path {} is not a directory",
            dir.display()
        ))));
    }
    Ok(())
}
