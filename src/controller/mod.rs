//! Session controller module
//!
//! This module owns the upload/process/result lifecycle of a single session.
//!
//! # Overview
//!
//! The session controller is the only stateful component. It:
//! - **Receives files** from the drop surface and validates their media type
//! - **Owns display handles** for the source preview and the stylized result
//! - **Issues one request** per generate action to the Image Style Service
//! - **Sends snapshots** to the view layer after every change
//!
//! # State Machine
//!
//! ```text
//!            drag_enter             drop (image)
//!   Idle ───────────────▶ AwaitingFile ─────────▶ Ready ◀──────────┐
//!    ▲  ◀─────────────── (drag_leave)               │ generate      │ drop
//!    │                                              ▼               │
//!    │ reset (any state)                       Processing ──────────┤
//!    │                                         │        │           │
//!    │                                  2xx    ▼        ▼ error     │
//!    └───────────────────────────────── Completed     Failed ───────┘
//! ```
//!
//! `Completed` and `Failed` keep the selected file, so generate can run again
//! from either. While `Processing`, drops, style changes and further generate
//! calls are rejected with `Busy`.
//!
//! # Concurrency
//!
//! The session state lives behind a `parking_lot::Mutex` that is released for
//! the duration of the outbound request. The `Processing` state is the guard
//! against a second in-flight request. A reset during `Processing` bumps an
//! attempt counter so the late reply is dropped instead of applied.

pub mod session_controller;
pub mod state;

pub use session_controller::SessionController;
pub use state::{ProcessingState, SessionSnapshot};
