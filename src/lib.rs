//! MaxiPlay client core: streaming playback, REST API and session handling.

pub mod api;
pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

pub use config::AppConfig;
pub use error::{AppError, Result};
