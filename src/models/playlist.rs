use super::Track;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    pub fn from_private(private: bool) -> Self {
        if private {
            Visibility::Private
        } else {
            Visibility::Public
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(self, Visibility::Private)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub items_count: u32,
    #[serde(default)]
    pub owner: Option<String>,
}

/// A playlist together with its resolved tracks
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
pub struct CompletePlaylist {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub audios: Vec<Track>,
}

impl CompletePlaylist {
    /// Drop one track locally (optimistic removal)
    pub fn without(&self, track_id: &str) -> CompletePlaylist {
        CompletePlaylist {
            id: self.id.clone(),
            title: self.title.clone(),
            audios: self
                .audios
                .iter()
                .filter(|t| t.id != track_id)
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_uses_lowercase_wire_names() {
        let playlist: Playlist = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "title": "Drive",
            "visibility": "private",
            "itemsCount": 3
        }))
        .unwrap();
        assert!(playlist.visibility.is_private());
        assert_eq!(playlist.items_count, 3);
        assert_eq!(
            serde_json::to_value(Visibility::from_private(false)).unwrap(),
            serde_json::json!("public")
        );
    }
}
