use crate::constants::DEFAULT_PLAYBACK_RATE;
use crate::models::Track;
use crate::utils::error_handling::safe_lock;
use std::sync::{Arc, Mutex};

/// Transport state mirrored from the live handle for readers (CLI, UI)
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub on_going_audio: Option<Track>,
    pub on_going_list: Vec<Track>,
    pub is_playing: bool,
    pub is_busy: bool,
    pub playback_rate: f32,
    pub position_ms: u64,
    pub duration_ms: u64,
    /// The last track of the list played to its end
    pub list_finished: bool,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            on_going_audio: None,
            on_going_list: Vec::new(),
            is_playing: false,
            is_busy: false,
            playback_rate: DEFAULT_PLAYBACK_RATE,
            position_ms: 0,
            duration_ms: 0,
            list_finished: false,
        }
    }
}

impl PlayerState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Index of the current track inside the current list
    pub fn current_index(&self) -> Option<usize> {
        let current = self.on_going_audio.as_ref()?;
        self.on_going_list.iter().position(|t| t.is_same(current))
    }

    pub fn is_current(&self, track: &Track) -> bool {
        self.on_going_audio
            .as_ref()
            .map(|t| t.is_same(track))
            .unwrap_or(false)
    }

    /// Progress in percent (0-100), 0 while the duration is unknown
    pub fn progress_percent(&self) -> u8 {
        crate::utils::formatting::map_range(
            self.position_ms as f64,
            0.0,
            self.duration_ms as f64,
            0.0,
            100.0,
        ) as u8
    }
}

/// Cloneable handle to the player state shared between the audio thread and readers
#[derive(Clone, Default)]
pub struct SharedPlayerState {
    inner: Arc<Mutex<PlayerState>>,
}

impl SharedPlayerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> PlayerState {
        safe_lock(&self.inner, "PlayerState")
            .map(|state| state.clone())
            .unwrap_or_default()
    }

    pub fn update<F: FnOnce(&mut PlayerState)>(&self, f: F) {
        if let Some(mut state) = safe_lock(&self.inner, "PlayerState") {
            f(&mut state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Owner;

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            title: id.to_uppercase(),
            about: String::new(),
            category: "Music".to_string(),
            file: format!("https://cdn.example.com/{}.mp3", id),
            poster: None,
            owner: Owner {
                id: "u1".to_string(),
                name: "Ana".to_string(),
            },
        }
    }

    #[test]
    fn current_index_follows_track_id() {
        let mut state = PlayerState::default();
        assert_eq!(state.current_index(), None);

        state.on_going_list = vec![track("a"), track("b"), track("c")];
        state.on_going_audio = Some(track("b"));
        assert_eq!(state.current_index(), Some(1));

        state.on_going_audio = Some(track("z"));
        assert_eq!(state.current_index(), None);
    }

    #[test]
    fn progress_is_zero_without_duration() {
        let mut state = PlayerState::default();
        state.position_ms = 5_000;
        assert_eq!(state.progress_percent(), 0);

        state.duration_ms = 20_000;
        assert_eq!(state.progress_percent(), 25);
    }

    #[test]
    fn shared_updates_are_visible_in_snapshots() {
        let shared = SharedPlayerState::new();
        let reader = shared.clone();
        shared.update(|s| {
            s.is_playing = true;
            s.position_ms = 1_200;
        });
        let snap = reader.snapshot();
        assert!(snap.is_playing);
        assert_eq!(snap.position_ms, 1_200);

        shared.update(PlayerState::reset);
        assert_eq!(reader.snapshot(), PlayerState::default());
    }
}
