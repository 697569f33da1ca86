use std::collections::BTreeMap;
use std::sync::{
    Arc,
    Mutex,
    MutexGuard,
    PoisonError,
};

use crate::pod::{
    PodKey,
    PodRecord,
};

/// The single source of truth for the pod view.
///
/// Cloning a `PodRegistry` is cheap and yields a handle to the same underlying map.  Every method
/// takes the lock for exactly one operation; callers never see the guard, so there is no way to hold
/// the lock across an `.await` or a multi-step lifecycle transition.
#[derive(Clone, Debug, Default)]
pub struct PodRegistry {
    pods: Arc<Mutex<BTreeMap<PodKey, PodRecord>>>,
}

impl PodRegistry {
    pub fn new() -> PodRegistry {
        PodRegistry::default()
    }

    pub fn upsert(&self, key: PodKey, record: PodRecord) {
        self.lock().insert(key, record);
    }

    pub fn remove(&self, key: &PodKey) -> Option<PodRecord> {
        self.lock().remove(key)
    }

    pub fn get(&self, key: &PodKey) -> Option<PodRecord> {
        self.lock().get(key).cloned()
    }

    pub fn contains(&self, key: &PodKey) -> bool {
        self.lock().contains_key(key)
    }

    pub fn snapshot(&self) -> BTreeMap<PodKey, PodRecord> {
        self.lock().clone()
    }

    pub fn keys(&self) -> Vec<PodKey> {
        self.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A writer can only panic between whole-record inserts and removes, so the map behind a
    // poisoned lock is still consistent.
    fn lock(&self) -> MutexGuard<'_, BTreeMap<PodKey, PodRecord>> {
        self.pods.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
