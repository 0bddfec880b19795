//! Display handle accounting
//!
//! A display handle is an ephemeral reference to in-memory image bytes that the
//! view layer can render. Handles must be released exactly once, so they are
//! modelled as scoped values: acquiring one registers it, dropping it releases it.
//!
//! # Rules
//!
//! - At most one handle per [`PreviewKind`] is live in a registry.
//! - [`PreviewRegistry::acquire`] refuses to create a handle while another of
//!   the same kind is still live, so callers must release before replacing.
//! - Handles are not `Clone`; a handle never serves both roles.

pub mod registry;

pub use registry::{PreviewHandle, PreviewKind, PreviewRegistry};
