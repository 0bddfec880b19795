//! Preview registry and scoped display handles

use crate::error::{CartoonizerError, Result};
use crate::media::probe_dimensions;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Role a display handle plays in the view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreviewKind {
    /// Preview of the file the user dropped
    Source,
    /// Preview of the stylized image returned by the service
    Result,
}

impl fmt::Display for PreviewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Result => f.write_str("result"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LiveEntry {
    owner: Uuid,
    kind: PreviewKind,
}

#[derive(Debug, Default)]
struct RegistryInner {
    next_id: u64,
    live: HashMap<u64, LiveEntry>,
    created: usize,
    released: usize,
}

/// Thread-safe accounting table for display handles
///
/// Cloning the registry yields another view of the same table, which is how
/// tests observe the handles a controller creates and releases. Several
/// sessions may share one registry; each owner holds at most one live handle
/// per kind.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl PreviewRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a display handle of `kind` over `bytes` for `owner`
    ///
    /// Fails with [`CartoonizerError::PreviewHandleLive`] while `owner` still
    /// holds an unreleased handle of the same kind.
    pub fn acquire(
        &self,
        owner: Uuid,
        kind: PreviewKind,
        media_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Result<PreviewHandle> {
        let entry = LiveEntry { owner, kind };
        let mut inner = self.inner.lock();
        if inner.live.values().any(|live| *live == entry) {
            warn!("Session {}: refusing to create {} preview while one is still live", owner, kind);
            return Err(CartoonizerError::PreviewHandleLive(kind));
        }

        inner.next_id += 1;
        let id = inner.next_id;
        inner.live.insert(id, entry);
        inner.created += 1;
        drop(inner);

        debug!("Session {}: acquired {} preview handle #{}", owner, kind, id);

        Ok(PreviewHandle {
            id,
            owner,
            kind,
            media_type: media_type.into(),
            bytes: bytes.into(),
            registry: Arc::clone(&self.inner),
        })
    }

    /// Number of live handles of `kind`, across all owners
    pub fn live_count(&self, kind: PreviewKind) -> usize {
        self.inner
            .lock()
            .live
            .values()
            .filter(|live| live.kind == kind)
            .count()
    }

    /// Number of live handles of `kind` held by `owner`
    pub fn live_count_for(&self, owner: Uuid, kind: PreviewKind) -> usize {
        let entry = LiveEntry { owner, kind };
        self.inner
            .lock()
            .live
            .values()
            .filter(|live| **live == entry)
            .count()
    }

    /// Total number of live handles
    pub fn total_live(&self) -> usize {
        self.inner.lock().live.len()
    }

    /// Number of handles ever created
    pub fn created_count(&self) -> usize {
        self.inner.lock().created
    }

    /// Number of handles released
    pub fn released_count(&self) -> usize {
        self.inner.lock().released
    }
}

/// A scoped display handle; dropping it releases it
pub struct PreviewHandle {
    id: u64,
    owner: Uuid,
    kind: PreviewKind,
    media_type: String,
    bytes: Arc<[u8]>,
    registry: Arc<Mutex<RegistryInner>>,
}

impl PreviewHandle {
    /// Registry-unique handle id
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Session that holds this handle
    pub fn owner(&self) -> Uuid {
        self.owner
    }

    /// Role of this handle
    pub fn kind(&self) -> PreviewKind {
        self.kind
    }

    /// Media type of the underlying bytes
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Underlying image bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared handle to the underlying bytes
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    /// Pixel dimensions, if the image header is readable
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        probe_dimensions(&self.bytes)
    }
}

impl fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewHandle")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("kind", &self.kind)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        let mut inner = self.registry.lock();
        if inner.live.remove(&self.id).is_some() {
            inner.released += 1;
            debug!("Released {} preview handle #{}", self.kind, self.id);
        } else {
            warn!("{} preview handle #{} was already released", self.kind, self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_and_drop_balances_counts() {
        let registry = PreviewRegistry::new();
        let owner = Uuid::new_v4();
        let handle = registry
            .acquire(owner, PreviewKind::Source, "image/png", vec![1u8, 2, 3])
            .unwrap();
        assert_eq!(registry.live_count(PreviewKind::Source), 1);
        assert_eq!(handle.bytes(), &[1u8, 2, 3][..]);
        assert_eq!(handle.owner(), owner);

        drop(handle);
        assert_eq!(registry.live_count(PreviewKind::Source), 0);
        assert_eq!(registry.created_count(), 1);
        assert_eq!(registry.released_count(), 1);
    }

    #[test]
    fn second_handle_of_same_kind_is_refused() {
        let registry = PreviewRegistry::new();
        let owner = Uuid::new_v4();
        let _first = registry
            .acquire(owner, PreviewKind::Result, "image/png", vec![0u8])
            .unwrap();
        let err = registry
            .acquire(owner, PreviewKind::Result, "image/png", vec![1u8])
            .unwrap_err();
        assert!(matches!(
            err,
            CartoonizerError::PreviewHandleLive(PreviewKind::Result)
        ));
        assert_eq!(registry.created_count(), 1);
    }

    #[test]
    fn kinds_are_tracked_independently() {
        let registry = PreviewRegistry::new();
        let owner = Uuid::new_v4();
        let source = registry
            .acquire(owner, PreviewKind::Source, "image/jpeg", vec![0u8])
            .unwrap();
        let result = registry
            .acquire(owner, PreviewKind::Result, "image/png", vec![1u8])
            .unwrap();
        assert_eq!(registry.total_live(), 2);
        assert_ne!(source.id(), result.id());

        drop(source);
        assert_eq!(registry.live_count(PreviewKind::Source), 0);
        assert_eq!(registry.live_count(PreviewKind::Result), 1);
    }

    #[test]
    fn owners_are_tracked_independently() {
        let registry = PreviewRegistry::new();
        let (first, second) = (Uuid::new_v4(), Uuid::new_v4());
        let _a = registry
            .acquire(first, PreviewKind::Source, "image/png", vec![0u8])
            .unwrap();
        let _b = registry
            .acquire(second, PreviewKind::Source, "image/png", vec![1u8])
            .unwrap();

        assert_eq!(registry.live_count(PreviewKind::Source), 2);
        assert_eq!(registry.live_count_for(first, PreviewKind::Source), 1);
        assert_eq!(registry.live_count_for(second, PreviewKind::Source), 1);
    }

    #[test]
    fn replacement_after_release_succeeds() {
        let registry = PreviewRegistry::new();
        let owner = Uuid::new_v4();
        let mut slot = Some(
            registry
                .acquire(owner, PreviewKind::Source, "image/png", vec![0u8])
                .unwrap(),
        );
        slot.take();
        slot = Some(
            registry
                .acquire(owner, PreviewKind::Source, "image/png", vec![1u8])
                .unwrap(),
        );
        assert_eq!(slot.as_ref().map(PreviewHandle::bytes), Some(&[1u8][..]));
        assert_eq!(registry.created_count(), 2);
        assert_eq!(registry.released_count(), 1);
    }

    #[test]
    fn registry_clones_share_accounting() {
        let registry = PreviewRegistry::new();
        let observer = registry.clone();
        let _handle = registry
            .acquire(Uuid::new_v4(), PreviewKind::Source, "image/png", vec![0u8])
            .unwrap();
        assert_eq!(observer.live_count(PreviewKind::Source), 1);
    }
}
