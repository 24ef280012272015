// Data models for MaxiPlay API entities

pub mod category;
pub mod history;
pub mod playlist;
pub mod responses;
pub mod track;
pub mod user;

// Re-export commonly used types
pub use category::Category;
pub use history::{History, HistoryAudio};
pub use playlist::{CompletePlaylist, Playlist, Visibility};
pub use track::{Owner, Track};
pub use user::{NewUser, Profile, PublicProfile};
