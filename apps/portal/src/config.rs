use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Url;

/// Production base URL of the mobile REST API.
pub const DEFAULT_API_BASE_URL: &str = "https://devcrm20.abacasys.com/ords/canwinn/mobile_api";
const DEFAULT_DEVICE_STORE: &str = "portal-device.json";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Client configuration loaded from environment variables.
/// Every variable has a default, so a bare environment still yields a usable config.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: Url,
    pub device_store_path: PathBuf,
    pub http_timeout: Duration,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let api_base_url = std::env::var("PORTAL_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        let http_timeout_secs = match std::env::var("PORTAL_HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .context("PORTAL_HTTP_TIMEOUT_SECS must be a whole number of seconds")?,
            Err(_) => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Config {
            api_base_url: parse_base_url(&api_base_url)?,
            device_store_path: std::env::var("PORTAL_DEVICE_STORE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DEVICE_STORE)),
            http_timeout: Duration::from_secs(http_timeout_secs.max(1)),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("'{raw}' is not a valid API base URL"))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("API base URL must use http or https, got '{}'", url.scheme());
    }
    Ok(url)
}
