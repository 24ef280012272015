use crate::error::Result;

/// Snapshot of a loaded handle, delivered to the controller on every tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaybackStatus {
    pub is_loaded: bool,
    pub is_playing: bool,
    pub position_ms: u64,
    pub duration_ms: Option<u64>,
    /// True exactly once, on the tick the track reaches its natural end
    pub did_just_finish: bool,
}

impl PlaybackStatus {
    pub fn unloaded() -> Self {
        Self::default()
    }
}

/// One loaded media stream on the device
pub trait MediaHandle {
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self) -> Result<()>;
    fn seek(&mut self, position_ms: u64) -> Result<()>;
    fn set_rate(&mut self, rate: f32) -> Result<()>;
    /// Report current status; may consume the one-shot `did_just_finish` edge
    fn status(&mut self) -> PlaybackStatus;
    /// Release device and network resources. Must be idempotent.
    fn unload(&mut self);
}

/// Device playback primitive: turns a media URL into a live handle
pub trait MediaEngine {
    fn load(&mut self, url: &str, should_play: bool) -> Result<Box<dyn MediaHandle>>;
}
