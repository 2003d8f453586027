//! Per-store record of objects known to exist in the backend.

use spindle_core::ObjectId;
use std::collections::HashSet;
use std::sync::Mutex;

/// Set of object ids known to be present in the backend.
///
/// Grows monotonically for the lifetime of the owning store; entries are
/// never evicted or persisted. The lock is held only for a single lookup or
/// insert, never across a backend call, so racing callers may both miss and
/// probe the backend, but the set itself stays consistent.
#[derive(Debug, Default)]
pub struct ExistenceCache {
    seen: Mutex<HashSet<ObjectId>>,
}

impl ExistenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.lock().contains(id)
    }

    pub fn insert(&self, id: ObjectId) {
        self.lock().insert(id);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<ObjectId>> {
        self.seen.lock().unwrap_or_else(|e| e.into_inner())
    }
}
