pub mod core;
pub mod engine;

pub use engine::{MediaEngine, MediaHandle, PlaybackStatus};
