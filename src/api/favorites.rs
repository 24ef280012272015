// Favorite endpoints
use super::client::ApiClient;
use crate::error::Result;
use crate::models::responses::{AudiosResponse, IsFavoriteResponse};
use crate::models::Track;
use reqwest::Method;

/// Flip the favorite flag of a track on the server
pub async fn toggle_favorite(client: &ApiClient, audio_id: &str) -> Result<()> {
    client
        .send_unit(
            client
                .authed(Method::POST, "/favorite")?
                .query(&[("audioId", audio_id)]),
        )
        .await
}

pub async fn fetch_favorites(client: &ApiClient) -> Result<Vec<Track>> {
    let resp: AudiosResponse = client
        .send_json(client.authed(Method::GET, "/favorite")?)
        .await?;
    Ok(resp.audios)
}

pub async fn is_favorite(client: &ApiClient, audio_id: &str) -> Result<bool> {
    let resp: IsFavoriteResponse = client
        .send_json(
            client
                .authed(Method::GET, "/favorite/is-fav")?
                .query(&[("audioId", audio_id)]),
        )
        .await?;
    Ok(resp.result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::test_support::client_for;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn toggle_and_query_favorite() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/favorite"))
            .and(query_param("audioId", "t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "status": "added" })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/favorite/is-fav"))
            .and(query_param("audioId", "t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "result": true })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("tok"));
        toggle_favorite(&client, "t1").await.unwrap();
        assert!(is_favorite(&client, "t1").await.unwrap());
    }
}
