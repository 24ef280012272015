// Listening history endpoints
use super::client::ApiClient;
use crate::error::Result;
use crate::models::responses::{AudiosResponse, HistoriesResponse};
use crate::models::{History, Track};
use reqwest::Method;

pub async fn fetch_histories(client: &ApiClient) -> Result<Vec<History>> {
    let resp: HistoriesResponse = client
        .send_json(client.authed(Method::GET, "/history")?)
        .await?;
    Ok(resp.histories)
}

pub async fn fetch_recently_played(client: &ApiClient) -> Result<Vec<Track>> {
    let resp: AudiosResponse = client
        .send_json(client.authed(Method::GET, "/history/recently-played")?)
        .await?;
    Ok(resp.audios)
}

/// Remove individual history entries (by entry id, not audio id)
pub async fn remove_histories(client: &ApiClient, entry_ids: &[String]) -> Result<()> {
    if entry_ids.is_empty() {
        return Ok(());
    }
    let encoded = serde_json::to_string(entry_ids)?;
    client
        .send_unit(
            client
                .authed(Method::DELETE, "/history")?
                .query(&[("histories", encoded.as_str())]),
        )
        .await
}

pub async fn clear_history(client: &ApiClient) -> Result<()> {
    client
        .send_unit(client.authed(Method::DELETE, "/history")?.query(&[("all", "yes")]))
        .await
}
