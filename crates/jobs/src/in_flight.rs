//! Per-record in-flight tracking.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use docforge_core::RecordKey;

use crate::error::GenerationError;

/// Records with a generation currently running.
///
/// Cloning shares the underlying set.
#[derive(Debug, Clone, Default)]
pub struct InFlightRegistry {
    inner: Arc<Mutex<HashSet<RecordKey>>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key`, failing if a generation for it is already running.
    pub fn try_acquire(&self, key: RecordKey) -> Result<InFlightGuard, GenerationError> {
        let mut set = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if !set.insert(key.clone()) {
            return Err(GenerationError::AlreadyInFlight(key));
        }
        Ok(InFlightGuard {
            registry: self.clone(),
            key,
        })
    }

    pub fn contains(&self, key: &RecordKey) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(key)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Releases its record when dropped.
#[derive(Debug)]
pub struct InFlightGuard {
    registry: InFlightRegistry,
    key: RecordKey,
}

impl InFlightGuard {
    pub fn key(&self) -> &RecordKey {
        &self.key
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.registry
            .inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docforge_core::{RecordKind, SourceRecordId};

    fn key(kind: RecordKind, id: &str) -> RecordKey {
        RecordKey {
            kind,
            source_record_id: SourceRecordId::parse(id).unwrap(),
        }
    }

    #[test]
    fn second_acquire_for_same_record_is_rejected() {
        let registry = InFlightRegistry::new();
        let _guard = registry.try_acquire(key(RecordKind::Referat, "1")).unwrap();

        let err = registry.try_acquire(key(RecordKind::Referat, "1")).unwrap_err();
        assert!(matches!(err, GenerationError::AlreadyInFlight(k) if k.to_string() == "referate/1"));
    }

    #[test]
    fn different_records_do_not_conflict() {
        let registry = InFlightRegistry::new();
        let _a = registry.try_acquire(key(RecordKind::Referat, "1")).unwrap();
        let _b = registry.try_acquire(key(RecordKind::Submission, "1")).unwrap();
        let _c = registry.try_acquire(key(RecordKind::Referat, "2")).unwrap();
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn dropping_guard_releases_record() {
        let registry = InFlightRegistry::new();
        let k = key(RecordKind::Submission, "8");

        let guard = registry.try_acquire(k.clone()).unwrap();
        assert!(registry.contains(&k));
        drop(guard);

        assert!(!registry.contains(&k));
        assert!(registry.try_acquire(k).is_ok());
    }
}
