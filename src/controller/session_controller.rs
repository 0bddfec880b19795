//! Upload/process/result session controller
//!
//! This module implements the state machine that owns one session's file,
//! display handles, style selection and the single outbound request.

use crate::artifact::DownloadArtifact;
use crate::controller::state::{ProcessingState, SessionSnapshot};
use crate::error::{CartoonizerError, Result, get_user_friendly_error};
use crate::media::SourceFile;
use crate::preview::{PreviewHandle, PreviewKind, PreviewRegistry};
use crate::service::{ServiceReply, StyleService, StylizeRequest};
use crate::style::Style;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use std::sync::mpsc::{SyncSender, TrySendError};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Mutable state of one session, guarded by the controller's lock
#[derive(Debug, Default)]
struct Session {
    source_file: Option<SourceFile>,
    source_preview: Option<PreviewHandle>,
    result_preview: Option<PreviewHandle>,
    processing_state: ProcessingState,
    selected_style: Style,
    last_error: Option<String>,
    /// Bumped whenever an in-flight reply must no longer be applied
    attempt: u64,
    /// Set while a request is outstanding, even after a reset abandoned it
    in_flight: bool,
}

impl Session {
    fn record_error(&mut self, err: &CartoonizerError) {
        self.last_error = Some(get_user_friendly_error(err));
    }

    fn snapshot(&self, session_id: Uuid) -> SessionSnapshot {
        SessionSnapshot {
            session_id,
            state: self.processing_state,
            selected_style: self.selected_style,
            source_name: self.source_file.as_ref().map(|f| f.name().to_string()),
            source_media_type: self.source_file.as_ref().map(|f| f.media_type().to_string()),
            source_len: self.source_file.as_ref().map(|f| f.bytes().len()),
            result_len: self.result_preview.as_ref().map(|h| h.bytes().len()),
            request_in_flight: self.in_flight,
            last_error: self.last_error.clone(),
        }
    }
}

/// Controller for one upload/process/result session
///
/// All operations take `&self`: the session sits behind a lock that is never
/// held across the outbound request, so a view thread can keep calling
/// [`snapshot`](Self::snapshot) or [`reset`](Self::reset) while
/// [`generate`](Self::generate) waits on the service.
pub struct SessionController {
    session_id: Uuid,
    service: Arc<dyn StyleService>,
    previews: PreviewRegistry,
    session: Mutex<Session>,
    view_sender: Option<SyncSender<SessionSnapshot>>,
}

impl SessionController {
    /// Create a controller talking to `service`, with its own preview registry
    pub fn new(service: Arc<dyn StyleService>) -> Self {
        Self::with_previews(service, PreviewRegistry::new())
    }

    /// Create a controller that registers its display handles in `previews`
    pub fn with_previews(service: Arc<dyn StyleService>, previews: PreviewRegistry) -> Self {
        let session_id = Uuid::new_v4();
        info!("Session {} started (service: {})", session_id, service.endpoint());
        Self {
            session_id,
            service,
            previews,
            session: Mutex::new(Session::default()),
            view_sender: None,
        }
    }

    /// Push a snapshot to `sender` after every state change
    #[must_use]
    pub fn with_view_sender(mut self, sender: SyncSender<SessionSnapshot>) -> Self {
        self.view_sender = Some(sender);
        self
    }

    /// Session identifier
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Registry holding this session's display handles
    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    /// Current view state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().snapshot(self.session_id)
    }

    /// Current lifecycle state
    pub fn state(&self) -> ProcessingState {
        self.session.lock().processing_state
    }

    /// Last user-facing error message
    pub fn last_error(&self) -> Option<String> {
        self.session.lock().last_error.clone()
    }

    /// Bytes behind the live result handle, when a result is available
    pub fn result_bytes(&self) -> Option<Arc<[u8]>> {
        let session = self.session.lock();
        if session.processing_state != ProcessingState::Completed {
            return None;
        }
        session.result_preview.as_ref().map(PreviewHandle::shared_bytes)
    }

    /// Pixel dimensions of the live preview of `kind`
    pub fn preview_dimensions(&self, kind: PreviewKind) -> Option<(u32, u32)> {
        let session = self.session.lock();
        let handle = match kind {
            PreviewKind::Source => session.source_preview.as_ref(),
            PreviewKind::Result => session.result_preview.as_ref(),
        };
        handle.and_then(PreviewHandle::dimensions)
    }

    /// A drag gesture entered the drop surface
    pub fn drag_enter(&self) {
        let mut session = self.session.lock();
        if session.processing_state != ProcessingState::Idle {
            return;
        }
        session.processing_state = ProcessingState::AwaitingFile;
        drop(session);

        debug!("Session {}: drag entered", self.session_id);
        self.send_state_update();
    }

    /// A drag gesture left the drop surface without a successful drop
    pub fn drag_leave(&self) {
        let mut session = self.session.lock();
        if session.processing_state != ProcessingState::AwaitingFile {
            return;
        }
        session.processing_state = ProcessingState::Idle;
        drop(session);

        debug!("Session {}: drag left", self.session_id);
        self.send_state_update();
    }

    /// Accept the files delivered by one drop gesture
    ///
    /// Only the first file is considered; an empty drop has no effect.
    pub fn drop_files(&self, files: Vec<SourceFile>) -> Result<()> {
        let count = files.len();
        let Some(first) = files.into_iter().next() else {
            debug!("Session {}: empty drop ignored", self.session_id);
            return Ok(());
        };
        if count > 1 {
            warn!(
                "Session {}: {} files dropped, using only {}",
                self.session_id,
                count,
                first.name()
            );
        }
        self.submit_file(first)
    }

    /// Select `file` as the session's source image
    ///
    /// Non-image files and drops during an in-flight request are rejected; the
    /// rejection only updates the last error.
    pub fn submit_file(&self, file: SourceFile) -> Result<()> {
        let mut session = self.session.lock();

        let rejection = if session.processing_state == ProcessingState::Processing {
            Some(CartoonizerError::Busy)
        } else if !file.is_image() {
            Some(CartoonizerError::InvalidFileType {
                file_name: file.name().to_string(),
                media_type: file.media_type().to_string(),
            })
        } else {
            None
        };
        if let Some(err) = rejection {
            warn!("Session {}: rejected {}: {}", self.session_id, file.name(), err);
            return self.reject(session, err);
        }

        // Release before creating the replacement
        drop(session.source_preview.take());
        drop(session.result_preview.take());

        let handle = match self.previews.acquire(
            self.session_id,
            PreviewKind::Source,
            file.media_type(),
            file.shared_bytes(),
        ) {
            Ok(handle) => handle,
            Err(err) => {
                // Both handles are already gone, so the old file can't stay selected
                error!("Session {}: {}", self.session_id, err);
                session.source_file = None;
                session.processing_state = ProcessingState::Idle;
                return self.reject(session, err);
            }
        };

        info!(
            "Session {}: selected {} ({}, {} bytes)",
            self.session_id,
            file.name(),
            file.media_type(),
            file.bytes().len()
        );

        session.source_preview = Some(handle);
        session.source_file = Some(file);
        session.last_error = None;
        session.processing_state = ProcessingState::Ready;
        drop(session);

        self.send_state_update();
        Ok(())
    }

    /// Change the selected style
    pub fn select_style(&self, style: Style) -> Result<()> {
        let mut session = self.session.lock();
        if session.processing_state == ProcessingState::Processing {
            debug!("Session {}: style change to {} refused while processing", self.session_id, style);
            return self.reject(session, CartoonizerError::Busy);
        }

        session.selected_style = style;
        drop(session);

        debug!("Session {}: style set to {}", self.session_id, style);
        self.send_state_update();
        Ok(())
    }

    /// Change the selected style from its wire name
    pub fn select_style_named(&self, value: &str) -> Result<()> {
        match value.parse::<Style>() {
            Ok(style) => self.select_style(style),
            Err(err) => self.reject(self.session.lock(), err),
        }
    }

    /// Send the selected file to the service and wait for the result
    ///
    /// Exactly one request is issued per accepted call. While a request is
    /// outstanding, including one abandoned by [`reset`](Self::reset), further
    /// calls are rejected with [`CartoonizerError::Busy`] and send nothing. If
    /// the session is reset before the reply arrives, the reply is discarded
    /// and `Ok(())` is returned.
    pub fn generate(&self) -> Result<()> {
        let (request, attempt) = {
            let mut session = self.session.lock();

            if session.in_flight {
                warn!("Session {}: generate ignored, request already in flight", self.session_id);
                return self.reject(session, CartoonizerError::Busy);
            }

            let request = match session.source_file.as_ref() {
                Some(file) if session.processing_state.accepts_generate() => StylizeRequest {
                    file_name: file.name().to_string(),
                    media_type: file.media_type().to_string(),
                    bytes: file.shared_bytes(),
                    style: session.selected_style,
                },
                _ => {
                    warn!("Session {}: generate without a file", self.session_id);
                    return self.reject(session, CartoonizerError::NoFileSelected);
                }
            };

            drop(session.result_preview.take());
            session.last_error = None;
            session.processing_state = ProcessingState::Processing;
            session.in_flight = true;
            session.attempt += 1;
            (request, session.attempt)
        };
        self.send_state_update();

        info!(
            "Session {}: generating {} with style {} (attempt {})",
            self.session_id, request.file_name, request.style, attempt
        );

        let outcome = self
            .service
            .stylize(&request)
            .and_then(ServiceReply::into_result);

        self.finish_attempt(attempt, outcome)
    }

    fn finish_attempt(
        &self,
        attempt: u64,
        outcome: Result<crate::service::StylizedImage>,
    ) -> Result<()> {
        let mut session = self.session.lock();
        session.in_flight = false;

        if session.attempt != attempt || session.processing_state != ProcessingState::Processing {
            info!(
                "Session {}: discarding reply for superseded attempt {}",
                self.session_id, attempt
            );
            drop(session);
            self.send_state_update();
            return Ok(());
        }

        let handle = outcome.and_then(|image| {
            self.previews.acquire(
                self.session_id,
                PreviewKind::Result,
                image.media_type,
                image.bytes,
            )
        });

        match handle {
            Ok(handle) => {
                info!(
                    "Session {}: result ready ({} bytes)",
                    self.session_id,
                    handle.bytes().len()
                );
                session.result_preview = Some(handle);
                session.last_error = None;
                session.processing_state = ProcessingState::Completed;
                drop(session);
                self.send_state_update();
                Ok(())
            }
            Err(err) => {
                error!("Session {}: generation failed: {}", self.session_id, err);
                session.record_error(&err);
                session.processing_state = ProcessingState::Failed;
                drop(session);
                self.send_state_update();
                Err(err)
            }
        }
    }

    /// Return to the initial state, releasing both display handles
    ///
    /// Safe from any state. A reply still in flight is discarded on arrival.
    pub fn reset(&self) {
        let mut session = self.session.lock();
        let was_processing = session.processing_state == ProcessingState::Processing;

        drop(session.source_preview.take());
        drop(session.result_preview.take());
        session.source_file = None;
        session.last_error = None;
        session.selected_style = Style::default();
        session.processing_state = ProcessingState::Idle;
        session.attempt += 1;
        drop(session);

        if was_processing {
            info!("Session {}: reset while a request is in flight", self.session_id);
        } else {
            debug!("Session {}: reset", self.session_id);
        }
        self.send_state_update();
    }

    /// Produce the download artifact for the current result
    ///
    /// Returns `None`, with no other effect, unless the session is completed.
    pub fn download(&self) -> Option<DownloadArtifact> {
        let session = self.session.lock();
        if session.processing_state != ProcessingState::Completed {
            debug!(
                "Session {}: download ignored in state {}",
                self.session_id, session.processing_state
            );
            return None;
        }

        let handle = session.result_preview.as_ref()?;
        let artifact = DownloadArtifact::now(session.selected_style, handle.shared_bytes());
        debug!("Session {}: prepared {}", self.session_id, artifact.file_name());
        Some(artifact)
    }

    /// Record `err` as the last error, publish the change and return it
    fn reject<T>(&self, mut session: MutexGuard<'_, Session>, err: CartoonizerError) -> Result<T> {
        session.record_error(&err);
        drop(session);
        self.send_state_update();
        Err(err)
    }

    fn send_state_update(&self) {
        let Some(sender) = &self.view_sender else {
            return;
        };

        let snapshot = self.snapshot();
        debug!(
            "Session {}: sending state update ({})",
            self.session_id, snapshot.state
        );

        match sender.try_send(snapshot) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Session {}: view update queue full, dropping snapshot", self.session_id);
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!("Session {}: view disconnected", self.session_id);
            }
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        let session = self.session.get_mut();
        drop(session.source_preview.take());
        drop(session.result_preview.take());
        debug!("Session {} ended", self.session_id);
    }
}
