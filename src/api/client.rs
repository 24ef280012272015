use crate::config::{normalize_base_url, AppConfig};
use crate::error::{AppError, Result};
use crate::models::responses::ErrorBody;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

/// HTTP client for the backend. Requests carry `Authorization: Bearer <token>`
/// once a token is set.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            http: crate::utils::http::api_client(config.http_timeout)?,
            base_url: normalize_base_url(&config.api_url),
            token: None,
        })
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Like `request`, but fails early when no token is set
    pub(crate) fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        if self.token.is_none() {
            return Err(AppError::AuthRequired);
        }
        Ok(self.request(method, path))
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = check_status(builder.send().await?).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub(crate) async fn send_unit(&self, builder: RequestBuilder) -> Result<()> {
        check_status(builder.send().await?).await?;
        Ok(())
    }
}

/// Turn non-2xx responses into `AppError::Server`, preferring the `{ "error" }` body
pub(crate) async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => body.error,
        Err(_) if !text.trim().is_empty() => text.trim().to_string(),
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Something went wrong")
            .to_string(),
    };
    log::warn!("[Api] {} -> {}", status, message);

    Err(AppError::Server {
        status: status.as_u16(),
        message,
    })
}

/// Percent-encode one path segment (ids come from the server but are not trusted)
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use wiremock::MockServer;

    pub fn client_for(server: &MockServer, token: Option<&str>) -> ApiClient {
        let config = AppConfig {
            api_url: server.uri(),
            ..AppConfig::default()
        };
        ApiClient::new(&config)
            .unwrap()
            .with_token(token.map(str::to_string))
    }
}
