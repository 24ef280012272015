/// Social service: favorites, follows and history edits
///
/// Every operation updates local state first so the caller can redraw
/// immediately, then confirms with the backend and rolls back on failure.

use super::notifications::Notifications;
use crate::api::{favorites, history, profile, ApiClient};
use crate::models::history::without_entries;
use crate::models::History;
use std::collections::HashSet;

/// Follow relation with another profile, as displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FollowState {
    pub is_following: bool,
    pub followers: u64,
}

impl FollowState {
    fn flipped(self) -> Self {
        if self.is_following {
            Self {
                is_following: false,
                followers: self.followers.saturating_sub(1),
            }
        } else {
            Self {
                is_following: true,
                followers: self.followers.saturating_add(1),
            }
        }
    }
}

/// Toggle favorite status for a track; returns whether it ends up favorited
pub async fn toggle_favorite(
    client: &ApiClient,
    favorite_ids: &mut HashSet<String>,
    audio_id: &str,
    notifications: &Notifications,
) -> bool {
    let was_favorite = favorite_ids.contains(audio_id);
    if was_favorite {
        log::info!("[Favorite] Removing {}", audio_id);
        favorite_ids.remove(audio_id);
    } else {
        log::info!("[Favorite] Adding {}", audio_id);
        favorite_ids.insert(audio_id.to_string());
    }

    match favorites::toggle_favorite(client, audio_id).await {
        Ok(()) => {
            notifications.success(if was_favorite {
                "Removed from favorites"
            } else {
                "Added to favorites"
            });
            !was_favorite
        }
        Err(e) => {
            // Roll back
            if was_favorite {
                favorite_ids.insert(audio_id.to_string());
            } else {
                favorite_ids.remove(audio_id);
            }
            notifications.report("Favorite", &e);
            was_favorite
        }
    }
}

/// Follow or unfollow a profile, adjusting the shown follower count
pub async fn toggle_follow(
    client: &ApiClient,
    profile_id: &str,
    state: &mut FollowState,
    notifications: &Notifications,
) {
    let previous = *state;
    *state = previous.flipped();
    log::info!(
        "[Follow] {} {}",
        if state.is_following { "Following" } else { "Unfollowing" },
        profile_id
    );

    if let Err(e) = profile::toggle_follow(client, profile_id).await {
        *state = previous;
        notifications.report("Follow", &e);
    }
}

/// Drop history entries locally, then on the server
pub async fn remove_histories(
    client: &ApiClient,
    histories: &mut Vec<History>,
    entry_ids: &[String],
    notifications: &Notifications,
) {
    if entry_ids.is_empty() {
        return;
    }

    let remaining = without_entries(histories, entry_ids);
    let previous = std::mem::replace(histories, remaining);
    match history::remove_histories(client, entry_ids).await {
        Ok(()) => log::info!("[History] Removed {} entries", entry_ids.len()),
        Err(e) => {
            *histories = previous;
            notifications.report("History", &e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::test_support::client_for;
    use crate::models::HistoryAudio;
    use crate::services::notifications::NotificationKind;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn server_responding(http_method: &str, route: &str, status: u16) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method(http_method))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({ "error": "nope" })))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn favorite_toggle_commits_on_success() {
        let server = server_responding("POST", "/favorite", 200).await;
        let client = client_for(&server, Some("tok"));
        let notifications = Notifications::new();
        let mut ids = HashSet::new();

        assert!(toggle_favorite(&client, &mut ids, "t1", &notifications).await);
        assert!(ids.contains("t1"));
        assert_eq!(notifications.drain()[0].kind, NotificationKind::Success);
    }

    #[tokio::test]
    async fn favorite_toggle_reverts_on_failure() {
        let server = server_responding("POST", "/favorite", 500).await;
        let client = client_for(&server, Some("tok"));
        let notifications = Notifications::new();
        let mut ids: HashSet<String> = ["t1".to_string()].into_iter().collect();

        assert!(toggle_favorite(&client, &mut ids, "t1", &notifications).await);
        assert!(ids.contains("t1"));

        let drained = notifications.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].kind, NotificationKind::Error);
        assert_eq!(drained[0].message, "nope");
    }

    #[tokio::test]
    async fn follow_adjusts_count_and_reverts_on_failure() {
        let ok = server_responding("POST", "/profile/update-follower/u2", 200).await;
        let notifications = Notifications::new();
        let mut state = FollowState {
            is_following: false,
            followers: 4,
        };

        toggle_follow(&client_for(&ok, Some("tok")), "u2", &mut state, &notifications).await;
        assert_eq!(
            state,
            FollowState {
                is_following: true,
                followers: 5
            }
        );

        let failing = server_responding("POST", "/profile/update-follower/u2", 500).await;
        toggle_follow(&client_for(&failing, Some("tok")), "u2", &mut state, &notifications).await;
        assert_eq!(state.followers, 5);
        assert!(state.is_following);
        assert_eq!(notifications.len(), 1);
    }

    #[test]
    fn unfollow_never_underflows() {
        let state = FollowState {
            is_following: true,
            followers: 0,
        };
        assert_eq!(state.flipped().followers, 0);
    }

    #[tokio::test]
    async fn history_removal_reverts_on_failure() {
        let server = server_responding("DELETE", "/history", 500).await;
        let client = client_for(&server, Some("tok"));
        let notifications = Notifications::new();
        let original = vec![History {
            date: "2024-03-01".to_string(),
            audios: vec![HistoryAudio {
                id: "h1".to_string(),
                audio_id: "t1".to_string(),
                title: "One".to_string(),
                date: "2024-03-01T09:00:00Z".to_string(),
            }],
        }];
        let mut histories = original.clone();

        remove_histories(&client, &mut histories, &["h1".to_string()], &notifications).await;
        assert_eq!(histories, original);
        assert_eq!(notifications.len(), 1);
    }
}
