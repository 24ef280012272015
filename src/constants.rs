//! Application constants and configuration values

// === API ===
pub const DEFAULT_API_URL: &str = "https://maxiplay-server.onrender.com/";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const USER_AGENT: &str = concat!("maxiplay/", env!("CARGO_PKG_VERSION"));

// === Storage ===
pub const APP_DIR_NAME: &str = "maxiplay";
pub const STORAGE_FILE_NAME: &str = "storage.json";

// === Audio Playback ===
pub const PLAYER_TICK_MILLIS: u64 = 50;
pub const SKIP_STEP_SECS: i64 = 10;
pub const DEFAULT_PLAYBACK_RATE: f32 = 1.0;
pub const STREAM_START_TIMEOUT_SECS: u64 = 10;
pub const STREAM_IDLE_TIMEOUT_SECS: u64 = 5;
/// Seeks landing this close to EOF count as end of track (a few MP3 frames)
pub const SEEK_END_MARGIN_BYTES: u64 = 2048;

// === Notifications ===
pub const NOTIFICATION_QUEUE_LIMIT: usize = 16;

// === Token Store ===
pub const TOKEN_KEY: &str = "auth_token";
pub const STORAGE_KEY_SALT: &[u8] = b"maxiplay-token-store-v1";
