use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::models::profile::UserId;

/// Key under which the logged-in user's id is kept.
pub const USER_ID_KEY: &str = "userId";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("device store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("device store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Small string key/value store persisted as one JSON object on disk.
/// A missing file reads as an empty store.
#[derive(Debug, Clone)]
pub struct DeviceStore {
    path: PathBuf,
}

impl DeviceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.remove(key))
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)?;
        debug!("device store: set {key}");
        Ok(())
    }

    /// Returns whether the key was present.
    pub fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let mut entries = self.load()?;
        let existed = entries.remove(key).is_some();
        if existed {
            self.save(&entries)?;
        }
        Ok(existed)
    }

    /// Reads the stored user id. A value that is not an integer reads as absent.
    pub fn subject_id(&self) -> Result<Option<UserId>, StoreError> {
        let Some(raw) = self.get(USER_ID_KEY)? else {
            return Ok(None);
        };
        match raw.trim().parse::<UserId>() {
            Ok(id) => Ok(Some(id)),
            Err(_) => {
                warn!("ignoring non-numeric {USER_ID_KEY} '{raw}' in device store");
                Ok(None)
            }
        }
    }

    pub fn set_subject_id(&self, id: UserId) -> Result<(), StoreError> {
        self.set(USER_ID_KEY, &id.to_string())
    }
}
