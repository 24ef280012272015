// Public profile and follow endpoints
use super::client::{segment, ApiClient};
use crate::error::Result;
use crate::models::responses::{IsFollowingResponse, PublicProfileResponse};
use crate::models::PublicProfile;
use reqwest::Method;

/// Follow or unfollow, depending on the current relation
pub async fn toggle_follow(client: &ApiClient, profile_id: &str) -> Result<()> {
    let path = format!("/profile/update-follower/{}", segment(profile_id));
    client.send_unit(client.authed(Method::POST, &path)?).await
}

pub async fn fetch_public_profile(client: &ApiClient, profile_id: &str) -> Result<PublicProfile> {
    let path = format!("/profile/info/{}", segment(profile_id));
    let resp: PublicProfileResponse = client.send_json(client.request(Method::GET, &path)).await?;
    Ok(resp.profile)
}

pub async fn is_following(client: &ApiClient, profile_id: &str) -> Result<bool> {
    let path = format!("/profile/is-following/{}", segment(profile_id));
    let resp: IsFollowingResponse = client.send_json(client.authed(Method::GET, &path)?).await?;
    Ok(resp.status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::test_support::client_for;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn public_profile_and_follow_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/profile/info/u2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "profile": { "id": "u2", "name": "Bo", "followers": 10, "followings": 2 }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/profile/is-following/u2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "status": false })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("tok"));
        let profile = fetch_public_profile(&client, "u2").await.unwrap();
        assert_eq!(profile.followers, 10);
        assert!(!is_following(&client, "u2").await.unwrap());
    }
}
