// Audio endpoints: uploads, edits and listings
use super::auth::{file_part, mime_for};
use super::client::{segment, ApiClient};
use crate::error::{AppError, Result};
use crate::models::responses::AudiosResponse;
use crate::models::{Category, Track};
use crate::utils::formatting::map_range;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Method};
use std::path::PathBuf;

const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Form fields for a new upload
#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub title: String,
    pub about: String,
    pub category: Category,
    pub file: PathBuf,
    pub poster: Option<PathBuf>,
}

/// Fields for editing an existing track; the media file itself cannot change
#[derive(Debug, Clone)]
pub struct AudioUpdate {
    pub title: String,
    pub about: String,
    pub category: Category,
    pub poster: Option<PathBuf>,
}

/// Upload a new track, reporting progress (0-100) as the file is handed to the transport
pub async fn upload_audio<F>(client: &ApiClient, upload: &AudioUpload, on_progress: F) -> Result<()>
where
    F: FnMut(u8) + Send + Sync + 'static,
{
    if upload.title.trim().is_empty() {
        return Err(AppError::Invalid("title is missing".to_string()));
    }

    let bytes = tokio::fs::read(&upload.file).await?;
    let total = bytes.len() as u64;
    let file_name = upload
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("audio")
        .to_string();
    log::info!("[Upload] Uploading {} ({} bytes)", file_name, total);

    let audio_part = Part::stream_with_length(progress_body(bytes, on_progress), total)
        .file_name(file_name)
        .mime_str(mime_for(&upload.file))?;

    let mut form = Form::new()
        .text("title", upload.title.trim().to_string())
        .text("about", upload.about.trim().to_string())
        .text("category", upload.category.as_str())
        .part("file", audio_part);
    if let Some(poster) = &upload.poster {
        form = form.part("poster", file_part(poster).await?);
    }

    client
        .send_unit(client.authed(Method::POST, "/audio/create")?.multipart(form))
        .await?;
    log::info!("[Upload] Upload finished");
    Ok(())
}

pub async fn update_audio(client: &ApiClient, audio_id: &str, update: &AudioUpdate) -> Result<()> {
    let mut form = Form::new()
        .text("title", update.title.trim().to_string())
        .text("about", update.about.trim().to_string())
        .text("category", update.category.as_str());
    if let Some(poster) = &update.poster {
        form = form.part("poster", file_part(poster).await?);
    }

    let path = format!("/audio/{}", segment(audio_id));
    client
        .send_unit(client.authed(Method::PATCH, &path)?.multipart(form))
        .await
}

pub async fn fetch_latest_uploads(client: &ApiClient) -> Result<Vec<Track>> {
    let resp: AudiosResponse = client
        .send_json(client.request(Method::GET, "/audio/latest"))
        .await?;
    Ok(resp.audios)
}

pub async fn fetch_recommended(client: &ApiClient) -> Result<Vec<Track>> {
    let resp: AudiosResponse = client
        .send_json(client.request(Method::GET, "/profile/recommended"))
        .await?;
    Ok(resp.audios)
}

/// Uploads of the signed-in user
pub async fn fetch_own_uploads(client: &ApiClient) -> Result<Vec<Track>> {
    let resp: AudiosResponse = client
        .send_json(client.authed(Method::GET, "/profile/uploads")?)
        .await?;
    Ok(resp.audios)
}

pub async fn fetch_public_uploads(client: &ApiClient, profile_id: &str) -> Result<Vec<Track>> {
    let path = format!("/profile/uploads/{}", segment(profile_id));
    let resp: AudiosResponse = client.send_json(client.request(Method::GET, &path)).await?;
    Ok(resp.audios)
}

/// Chunked body that reports the percentage sent after each chunk
fn progress_body<F>(bytes: Vec<u8>, mut on_progress: F) -> Body
where
    F: FnMut(u8) + Send + Sync + 'static,
{
    let total = bytes.len() as f64;
    let chunks: Vec<Vec<u8>> = bytes.chunks(UPLOAD_CHUNK_SIZE).map(|c| c.to_vec()).collect();
    let mut sent = 0usize;
    let mut last_reported: Option<u8> = None;

    let stream = futures_util::stream::iter(chunks.into_iter().map(move |chunk| {
        sent += chunk.len();
        let percent = map_range(sent as f64, 0.0, total, 0.0, 100.0) as u8;
        if last_reported != Some(percent) {
            last_reported = Some(percent);
            on_progress(percent);
        }
        Ok::<Vec<u8>, std::io::Error>(chunk)
    }));
    Body::wrap_stream(stream)
}
