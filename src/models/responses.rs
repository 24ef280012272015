// Envelope types for API responses
use super::{CompletePlaylist, History, NewUser, Playlist, Profile, PublicProfile, Track};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AudiosResponse {
    #[serde(default)]
    pub audios: Vec<Track>,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistsResponse {
    #[serde(default)]
    pub playlist: Vec<Playlist>,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistAudiosResponse {
    pub list: CompletePlaylist,
}

#[derive(Debug, Deserialize)]
pub struct HistoriesResponse {
    #[serde(default)]
    pub histories: Vec<History>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileResponse {
    pub profile: Profile,
}

#[derive(Debug, Deserialize)]
pub struct PublicProfileResponse {
    pub profile: PublicProfile,
}

#[derive(Debug, Deserialize)]
pub struct SignInResponse {
    pub profile: Profile,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct SignUpResponse {
    pub user: NewUser,
}

#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IsFavoriteResponse {
    pub result: bool,
}

#[derive(Debug, Deserialize)]
pub struct IsFollowingResponse {
    pub status: bool,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
