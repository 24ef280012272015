// Authentication endpoints
use super::client::ApiClient;
use crate::error::{AppError, Result};
use crate::models::responses::{MessageResponse, ProfileResponse, SignInResponse, SignUpResponse};
use crate::models::{NewUser, Profile};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::json;
use std::path::Path;

/// Create an account. The backend emails a one-time code for verification.
pub async fn sign_up(client: &ApiClient, name: &str, email: &str, password: &str) -> Result<NewUser> {
    log::debug!("[Auth] Creating account for {}", email);
    let resp: SignUpResponse = client
        .send_json(client.request(Method::POST, "/auth/create").json(&json!({
            "name": name,
            "email": email,
            "password": password,
        })))
        .await?;
    Ok(resp.user)
}

/// Verify an email with the code the user received; returns the server's message
pub async fn verify_email(client: &ApiClient, user_id: &str, otp: &str) -> Result<String> {
    let otp = otp.trim();
    if otp.is_empty() || !otp.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Invalid("verification code must be digits".to_string()));
    }

    let resp: MessageResponse = client
        .send_json(client.request(Method::POST, "/auth/verify-email").json(&json!({
            "userId": user_id,
            "token": otp,
        })))
        .await?;
    Ok(resp.message.unwrap_or_else(|| "Email verified!".to_string()))
}

/// Ask the backend to send a fresh verification code
pub async fn re_verify_email(client: &ApiClient, user_id: &str) -> Result<()> {
    client
        .send_unit(
            client
                .request(Method::POST, "/auth/re-verify-email")
                .json(&json!({ "userId": user_id })),
        )
        .await
}

/// Returns the profile and the bearer token for later requests
pub async fn sign_in(client: &ApiClient, email: &str, password: &str) -> Result<(Profile, String)> {
    log::debug!("[Auth] Signing in {}", email);
    let resp: SignInResponse = client
        .send_json(client.request(Method::POST, "/auth/sign-in").json(&json!({
            "email": email,
            "password": password,
        })))
        .await?;
    Ok((resp.profile, resp.token))
}

/// Check the current token; fails with a server error when it was revoked
pub async fn is_auth(client: &ApiClient) -> Result<Profile> {
    let resp: ProfileResponse = client
        .send_json(client.authed(Method::GET, "/auth/is-auth")?)
        .await?;
    Ok(resp.profile)
}

pub async fn log_out(client: &ApiClient, from_all: bool) -> Result<()> {
    let mut req = client.authed(Method::POST, "/auth/log-out")?;
    if from_all {
        req = req.query(&[("fromAll", "yes")]);
    }
    client.send_unit(req).await
}

pub async fn update_profile(client: &ApiClient, name: &str, avatar: Option<&Path>) -> Result<Profile> {
    let mut form = Form::new().text("name", name.trim().to_string());
    if let Some(path) = avatar {
        form = form.part("avatar", file_part(path).await?);
    }

    let resp: ProfileResponse = client
        .send_json(client.authed(Method::POST, "/auth/update-profile")?.multipart(form))
        .await?;
    Ok(resp.profile)
}

/// Multipart part holding a whole file, with a MIME type guessed from the extension
pub(crate) async fn file_part(path: &Path) -> Result<Part> {
    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file")
        .to_string();
    Ok(Part::bytes(bytes).file_name(name).mime_str(mime_for(path))?)
}

pub(crate) fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("mp3") => "audio/mpeg",
        Some("m4a") => "audio/mp4",
        Some("wav") => "audio/wav",
        Some("ogg") => "audio/ogg",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
