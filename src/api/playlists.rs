// Playlist API endpoints
use super::client::{segment, ApiClient};
use crate::error::{AppError, Result};
use crate::models::responses::{PlaylistAudiosResponse, PlaylistsResponse};
use crate::models::{CompletePlaylist, Playlist, Visibility};
use reqwest::Method;
use serde_json::json;

/// Create a playlist, optionally seeded with one track
pub async fn create_playlist(
    client: &ApiClient,
    title: &str,
    visibility: Visibility,
    first_audio_id: Option<&str>,
) -> Result<()> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Invalid("playlist title is missing".to_string()));
    }

    log::debug!("[Playlists] Creating {} playlist '{}'", visibility, title);
    client
        .send_unit(client.authed(Method::POST, "/playlist/create")?.json(&json!({
            "resId": first_audio_id,
            "title": title,
            "visibility": visibility,
        })))
        .await
}

/// Rename / change visibility, and optionally add one track
pub async fn update_playlist(client: &ApiClient, playlist: &Playlist, add_audio_id: Option<&str>) -> Result<()> {
    client
        .send_unit(client.authed(Method::PATCH, "/playlist")?.json(&json!({
            "id": playlist.id,
            "item": add_audio_id,
            "title": playlist.title,
            "visibility": playlist.visibility,
        })))
        .await
}

pub async fn remove_from_playlist(client: &ApiClient, playlist_id: &str, audio_id: &str) -> Result<()> {
    client
        .send_unit(
            client
                .authed(Method::DELETE, "/playlist")?
                .query(&[("playlistId", playlist_id), ("resId", audio_id)]),
        )
        .await
}

pub async fn delete_playlist(client: &ApiClient, playlist_id: &str) -> Result<()> {
    client
        .send_unit(
            client
                .authed(Method::DELETE, "/playlist")?
                .query(&[("playlistId", playlist_id), ("all", "yes")]),
        )
        .await
}

/// Playlists owned by the signed-in user
pub async fn fetch_own_playlists(client: &ApiClient) -> Result<Vec<Playlist>> {
    let resp: PlaylistsResponse = client
        .send_json(client.authed(Method::GET, "/playlist/by-profile")?)
        .await?;
    Ok(resp.playlist)
}

/// Public playlists of another profile
pub async fn fetch_public_playlists(client: &ApiClient, profile_id: &str) -> Result<Vec<Playlist>> {
    let path = format!("/profile/playlist/{}", segment(profile_id));
    let resp: PlaylistsResponse = client.send_json(client.request(Method::GET, &path)).await?;
    Ok(resp.playlist)
}

/// Playlists generated by the backend from listening history
pub async fn fetch_auto_generated_playlists(client: &ApiClient) -> Result<Vec<Playlist>> {
    let resp: PlaylistsResponse = client
        .send_json(client.authed(Method::GET, "/profile/auto-generated-playlist")?)
        .await?;
    Ok(resp.playlist)
}

/// Tracks of a playlist. Private playlists go through the owner-only endpoint.
pub async fn fetch_playlist_audios(client: &ApiClient, playlist_id: &str, private: bool) -> Result<CompletePlaylist> {
    let req = if private {
        client.authed(Method::GET, &format!("/playlist/{}", segment(playlist_id)))?
    } else {
        client.request(
            Method::GET,
            &format!("/profile/playlist-audios/{}", segment(playlist_id)),
        )
    };
    let resp: PlaylistAudiosResponse = client.send_json(req).await?;
    Ok(resp.list)
}
