//! Session state types shared with the view layer

use crate::style::Style;
use std::fmt;
use uuid::Uuid;

/// Lifecycle of one upload/process/result session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProcessingState {
    /// No file selected
    #[default]
    Idle,
    /// A drag gesture is over the drop surface and no file is selected yet
    AwaitingFile,
    /// File selected, ready to generate
    Ready,
    /// Request in flight
    Processing,
    /// Result available
    Completed,
    /// Last attempt failed; the file is still selected so it can be retried
    Failed,
}

impl ProcessingState {
    /// Whether a generate request may start from this state
    pub fn accepts_generate(self) -> bool {
        matches!(self, Self::Ready | Self::Completed | Self::Failed)
    }
}

impl fmt::Display for ProcessingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::AwaitingFile => "awaiting file",
            Self::Ready => "ready",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Immutable view of a session, sent to the view layer after every change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Session identifier (appears in log lines)
    pub session_id: Uuid,
    /// Current lifecycle state
    pub state: ProcessingState,
    /// Currently selected style
    pub selected_style: Style,
    /// Name of the selected file
    pub source_name: Option<String>,
    /// Declared media type of the selected file
    pub source_media_type: Option<String>,
    /// Size of the selected file in bytes
    pub source_len: Option<usize>,
    /// Size of the stylized result in bytes
    pub result_len: Option<usize>,
    /// A request is still outstanding, possibly one abandoned by a reset
    pub request_in_flight: bool,
    /// Last user-facing error message
    pub last_error: Option<String>,
}

impl SessionSnapshot {
    /// Whether the generate action should be enabled
    pub fn can_generate(&self) -> bool {
        self.source_name.is_some() && self.state.accepts_generate() && !self.request_in_flight
    }

    /// Whether the style selector should be enabled
    pub fn style_editable(&self) -> bool {
        self.state != ProcessingState::Processing
    }

    /// Whether the download action should be enabled
    pub fn can_download(&self) -> bool {
        self.state == ProcessingState::Completed && self.result_len.is_some()
    }
}
