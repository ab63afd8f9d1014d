//! In-crate test doubles shared by the core test modules.

use std::collections::HashMap;

use chatlet_types::error::StateError;
use tokio::sync::Mutex;

use crate::persist::state::StateStore;

/// In-memory [`StateStore`] with a write counter and a failure switch.
pub(crate) struct MemoryStateStore {
    map: Mutex<HashMap<String, String>>,
    writes: Mutex<usize>,
    failing: Mutex<bool>,
}

impl MemoryStateStore {
    pub(crate) fn new() -> Self {
        Self {
            map: Mutex::new(HashMap::new()),
            writes: Mutex::new(0),
            failing: Mutex::new(false),
        }
    }

    pub(crate) async fn write_count(&self) -> usize {
        *self.writes.lock().await
    }

    pub(crate) async fn fail_writes(&self, failing: bool) {
        *self.failing.lock().await = failing;
    }
}

impl StateStore for MemoryStateStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StateError> {
        Ok(self.map.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StateError> {
        if *self.failing.lock().await {
            return Err(StateError::Io("simulated write failure".to_string()));
        }
        self.map
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        *self.writes.lock().await += 1;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StateError> {
        self.map.lock().await.remove(key);
        Ok(())
    }
}

/// A [`StateStore`] whose backend is entirely unavailable.
pub(crate) struct UnavailableStateStore;

impl StateStore for UnavailableStateStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StateError> {
        Err(StateError::Unavailable("restricted context".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StateError> {
        Err(StateError::Unavailable("restricted context".to_string()))
    }

    async fn remove(&self, _key: &str) -> Result<(), StateError> {
        Err(StateError::Unavailable("restricted context".to_string()))
    }
}
