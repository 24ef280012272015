//! Runtime configuration, loaded from the environment (and `.env` when present)

use crate::constants::{APP_DIR_NAME, DEFAULT_API_URL, DEFAULT_HTTP_TIMEOUT_SECS};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the backend, always ending with `/`
    pub api_url: String,
    /// Directory holding the token store
    pub data_dir: PathBuf,
    pub http_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            data_dir: default_data_dir(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    /// Load `.env` (if any) then read `MAXIPLAY_*` variables
    pub fn load() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => log::debug!("[Config] Loaded {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => log::warn!("[Config] Failed to load .env file: {}", e),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup; unset or invalid values fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("MAXIPLAY_API_URL").filter(|u| !u.trim().is_empty()) {
            config.api_url = normalize_base_url(&url);
        }
        if let Some(dir) = lookup("MAXIPLAY_DATA_DIR").filter(|d| !d.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup("MAXIPLAY_HTTP_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.http_timeout = Duration::from_secs(secs),
                _ => log::warn!(
                    "[Config] Ignoring invalid MAXIPLAY_HTTP_TIMEOUT_SECS={:?}",
                    raw
                ),
            }
        }

        config
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

pub fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    }
}
