use std::sync::Arc;

use anyhow::Result;

use crate::api_client::{ApiClient, ProfileApi};
use crate::config::Config;
use crate::jobs::JobBoard;
use crate::profile::ProfileAggregator;
use crate::store::{DeviceStore, InMemoryStore};

/// Shared client state handed to every command.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn ProfileApi>,
    /// Process-wide store other screens read personal details and employment from.
    pub shared: Arc<InMemoryStore>,
    pub device: DeviceStore,
}

impl AppState {
    pub fn from_config(config: Config) -> Result<Self> {
        let api = ApiClient::new(config.api_base_url, config.http_timeout)?;
        Ok(Self {
            device: DeviceStore::new(config.device_store_path),
            api: Arc::new(api),
            shared: Arc::new(InMemoryStore::new()),
        })
    }

    /// A fresh aggregator wired to this state's API client and shared store.
    pub fn aggregator(&self) -> ProfileAggregator {
        ProfileAggregator::new(self.api.clone(), self.shared.clone())
    }

    pub fn job_board(&self) -> JobBoard {
        JobBoard::new(self.api.clone())
    }
}
