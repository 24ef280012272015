use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Owner {
    pub id: String,
    pub name: String,
}

/// A playable audio item. Immutable once fetched; re-fetching replaces it wholesale.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub about: String,
    #[serde(default)]
    pub category: String,
    /// Remote media URL
    pub file: String,
    #[serde(default)]
    pub poster: Option<String>,
    pub owner: Owner,
}

impl Track {
    pub fn is_same(&self, other: &Track) -> bool {
        self.id == other.id
    }
}
