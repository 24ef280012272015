use serde::{Deserialize, Serialize};

/// The signed-in user's own profile
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub followings: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct PublicProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub followings: u64,
}

/// Returned by sign-up; the id is needed to verify the email afterwards
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub id: String,
    pub name: String,
    pub email: String,
}
