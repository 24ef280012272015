use crate::constants::USER_AGENT;
use once_cell::sync::Lazy;
use std::time::Duration;

static STREAMING_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    // No overall timeout: audio downloads run for the length of the track
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_else(|e| {
            log::error!("[Http] Failed to build streaming client, using defaults: {}", e);
            reqwest::Client::new()
        })
});

/// Shared client for long-lived media downloads
pub fn streaming_client() -> &'static reqwest::Client {
    &STREAMING_CLIENT
}

/// Client for API calls, bounded by `timeout`
pub fn api_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .build()
}
