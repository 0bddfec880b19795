#![expect(
    clippy::unwrap_used,
    reason = "Test utilities use .unwrap() for brevity"
)]

//! Shared test utilities for `ai-cartoonizer` unit tests.
//!
//! This module provides common test infrastructure used across multiple test modules.
//! It is only compiled during testing (`#[cfg(test)]`).

use crate::error::{CartoonizerError, Result, StringError};
use crate::media::SourceFile;
use crate::service::{ServiceReply, StyleService, StylizeRequest};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::mpsc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Global mutex to serialize tests that modify the APPDATA environment variable.
/// This prevents race conditions when multiple tests run in parallel and try to
/// set different APPDATA values.
static APPDATA_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Helper function to create a temporary test directory using tempfile.
/// Returns a `TempDir` that automatically cleans up when dropped.
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// RAII guard that sets the APPDATA environment variable for a test scope
/// and restores the original value when dropped.
///
/// **Safety Invariants:**
/// 1. Each test gets its own unique `TempDir`, so parallel tests write to different paths
/// 2. The guard restores the original value on drop, even on panic
/// 3. The `APPDATA_LOCK` mutex ensures tests modify APPDATA serially, not concurrently
pub struct AppdataGuard {
    original: Option<String>,
    // Held for the guard's lifetime to keep APPDATA access exclusive
    _lock: std::sync::MutexGuard<'static, ()>,
}

#[expect(
    unsafe_code,
    reason = "Test-only code that modifies environment variables with documented safety invariants"
)]
impl AppdataGuard {
    /// Create a new guard that sets APPDATA to the given temp directory path.
    pub fn new(temp_dir: &TempDir) -> Self {
        let lock = APPDATA_LOCK
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let original = std::env::var("APPDATA").ok();
        // SAFETY: APPDATA_LOCK serializes every writer; see struct-level invariants.
        unsafe {
            std::env::set_var("APPDATA", temp_dir.path());
        }
        Self {
            original,
            _lock: lock,
        }
    }
}

#[expect(
    unsafe_code,
    reason = "Test-only code that restores environment variables with documented safety invariants"
)]
impl Drop for AppdataGuard {
    fn drop(&mut self) {
        // SAFETY: still holding APPDATA_LOCK; restores the pre-test value.
        if let Some(ref original) = self.original {
            unsafe {
                std::env::set_var("APPDATA", original);
            }
        } else {
            unsafe {
                std::env::remove_var("APPDATA");
            }
        }
    }
}

/// Encoded 1x1 PNG
pub fn tiny_png() -> Vec<u8> {
    let mut png = Vec::new();
    image::write_buffer_with_format(
        &mut Cursor::new(&mut png),
        &[10, 20, 30, 255],
        1,
        1,
        image::ExtendedColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .unwrap();
    png
}

/// A dropped PNG file
pub fn png_file(name: &str) -> SourceFile {
    SourceFile::new(name, "image/png", tiny_png())
}

/// A dropped file declared as GIF (content is not a real GIF)
pub fn gif_file(name: &str) -> SourceFile {
    SourceFile::new(name, "image/gif", b"GIF89a".to_vec())
}

/// A dropped plain-text file
pub fn text_file(name: &str) -> SourceFile {
    SourceFile::new(name, "text/plain", b"hello".to_vec())
}

enum Scripted {
    Reply(ServiceReply),
    NetworkFailure,
}

/// Scripted stand-in for the Image Style Service
///
/// Replies are returned in the order they were pushed; when the script is
/// empty the service answers 200 with a tiny PNG. A gated service blocks each
/// call after recording it until the test releases the gate.
pub struct FakeStyleService {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<StylizeRequest>>,
    gate: Option<Mutex<mpsc::Receiver<()>>>,
}

impl FakeStyleService {
    /// An ungated fake
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// A fake whose calls wait for a message on the returned sender
    pub fn gated() -> (Self, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel();
        let mut service = Self::new();
        service.gate = Some(Mutex::new(rx));
        (service, tx)
    }

    /// Queue a reply
    pub fn push_reply(&self, reply: ServiceReply) {
        self.script.lock().push_back(Scripted::Reply(reply));
    }

    /// Queue a transport failure
    pub fn push_network_failure(&self) {
        self.script.lock().push_back(Scripted::NetworkFailure);
    }

    /// Number of requests received
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<StylizeRequest> {
        self.requests.lock().clone()
    }

    /// Block until at least `n` requests have been received
    pub fn wait_for_calls(&self, n: usize) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while self.call_count() < n {
            assert!(Instant::now() < deadline, "timed out waiting for {n} calls");
            std::thread::sleep(Duration::from_millis(5));
        }
    }
}

impl StyleService for FakeStyleService {
    fn stylize(&self, request: &StylizeRequest) -> Result<ServiceReply> {
        self.requests.lock().push(request.clone());

        if let Some(gate) = &self.gate {
            gate.lock().recv().unwrap();
        }

        match self.script.lock().pop_front() {
            Some(Scripted::Reply(reply)) => Ok(reply),
            Some(Scripted::NetworkFailure) => Err(CartoonizerError::NetworkFailure {
                endpoint: self.endpoint(),
                source: StringError::new("connection refused"),
            }),
            None => Ok(ServiceReply {
                status: 200,
                content_type: Some("image/png".to_string()),
                body: tiny_png(),
            }),
        }
    }

    fn endpoint(&self) -> String {
        "fake://service".to_string()
    }
}
