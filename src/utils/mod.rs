pub mod audio_controller;
pub mod error_handling;
pub mod formatting;
pub mod http;
pub mod media;
pub mod mediaplay;
pub mod token_store;

// Re-export commonly used types
pub use audio_controller::{AudioCommand, AudioController};
pub use mediaplay::RodioEngine;
pub use token_store::TokenStore;
