//! Per-track cache of backend-native buffers
//!
//! Entries are keyed by the identity of the shared `TrackBuffer` and hold a
//! weak reference to it, so a replaced or dropped track is evicted on the
//! next lookup instead of pinning a stale native buffer.

use std::sync::{Arc, Weak};

use super::loader::TrackBuffer;

#[derive(Debug)]
pub struct BufferCache<T> {
    entries: Vec<(Weak<TrackBuffer>, T)>,
}

impl<T> Default for BufferCache<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: Clone> BufferCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Native buffer for `track`, built with `build` on first use
    pub fn get_or_try_insert<E>(
        &mut self,
        track: &Arc<TrackBuffer>,
        build: impl FnOnce(&TrackBuffer) -> Result<T, E>,
    ) -> Result<T, E> {
        self.entries.retain(|(weak, _)| weak.strong_count() > 0);

        if let Some((_, native)) = self
            .entries
            .iter()
            .find(|(weak, _)| std::ptr::eq(weak.as_ptr(), Arc::as_ptr(track)))
        {
            return Ok(native.clone());
        }

        let native = build(track)?;
        self.entries.push((Arc::downgrade(track), native.clone()));
        Ok(native)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
