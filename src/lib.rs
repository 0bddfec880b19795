//! `ai-cartoonizer` - Turn photos into cartoons through a stylization service
//!
//! A client for an image stylization service: the user drops a photo, picks a
//! style, sends it off, and saves the stylized image that comes back. The
//! stylization itself happens remotely; this crate owns the session state
//! machine around it.
//!
//! `SessionController` drives one session, `StyleService` is the seam to the
//! remote service (`HttpStyleService` in production), and `PreviewRegistry`
//! accounts for the display handles a session holds.

// Module declarations
pub mod artifact;
pub mod config;
pub mod controller;
pub mod error;
pub mod media;
pub mod preview;
pub mod service;
pub mod style;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use controller::{ProcessingState, SessionController, SessionSnapshot};
pub use error::{CartoonizerError, Result};
pub use media::SourceFile;
pub use style::Style;
