//! Process-wide client state shared between screens, and the on-device key/value store.

pub mod device;

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

pub use device::{DeviceStore, StoreError};

/// Write side of the shared client state that the profile aggregator publishes into.
/// Injected as `Arc<dyn SharedStore>` so the aggregator never reaches for a global.
pub trait SharedStore: Send + Sync {
    fn set_personal_details(&self, payload: Value);
    fn set_employment_list(&self, payload: Value);
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SharedState {
    pub personal_details: Map<String, Value>,
    pub employment_list: Vec<Value>,
}

/// In-process store holding the personal-detail record and the employment list.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<SharedState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> SharedState {
        self.lock().clone()
    }
}

impl SharedStore for InMemoryStore {
    /// Shallow-merges object fields over the stored record. Non-object payloads are ignored.
    fn set_personal_details(&self, payload: Value) {
        let mut state = self.lock();
        match payload {
            Value::Object(fields) => state.personal_details.extend(fields),
            Value::Null => return,
            other => {
                debug!("ignoring non-object personal details payload: {other}");
                return;
            }
        }
        debug!(
            "personal details updated ({} fields)",
            state.personal_details.len()
        );
    }

    fn set_employment_list(&self, payload: Value) {
        let mut state = self.lock();
        state.employment_list = match payload {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => vec![other],
        };
        debug!(
            "employment list replaced ({} entries)",
            state.employment_list.len()
        );
    }
}
