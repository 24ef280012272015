// MaxiPlay backend API modules

pub mod audios;
pub mod auth;
pub mod client;
pub mod favorites;
pub mod history;
pub mod playlists;
pub mod profile;

pub use client::ApiClient;
