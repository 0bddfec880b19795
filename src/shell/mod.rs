//! Terminal front end
//!
//! Provides the command-line arguments, the interactive shell and the text
//! rendering of session snapshots. Every user action maps to exactly one
//! `SessionController` trigger.

pub mod cli;
pub mod repl;
pub mod view;

pub use cli::Args;
