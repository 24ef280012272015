use crate::app::sound_slot::SoundSlot;
use crate::constants::DEFAULT_PLAYBACK_RATE;
use crate::error::AppError;
use crate::models::Track;
use crate::services::notifications::Notifications;
use crate::state::SharedPlayerState;
use crate::utils::media::{MediaEngine, PlaybackStatus};

/// Owns the single playback session: the live handle, the current track and list.
///
/// All operations are synchronous and must be called from one thread (the
/// audio thread in [`crate::utils::audio_controller`]). Derived transport state
/// is pushed into [`SharedPlayerState`] for readers.
pub struct PlaybackController<E: MediaEngine> {
    engine: E,
    slot: SoundSlot,
    state: SharedPlayerState,
    notifications: Notifications,
}

impl<E: MediaEngine> PlaybackController<E> {
    pub fn new(engine: E, state: SharedPlayerState, notifications: Notifications) -> Self {
        Self {
            engine,
            slot: SoundSlot::new(),
            state,
            notifications,
        }
    }

    pub fn state(&self) -> &SharedPlayerState {
        &self.state
    }

    /// A track was pressed inside `list`
    pub fn press(&mut self, track: &Track, list: &[Track]) {
        if !self.slot.is_loaded() {
            self.state.update(|s| s.on_going_list = list.to_vec());
            self.load_and_play(track);
            return;
        }

        if self.state.snapshot().is_current(track) {
            self.toggle_play_pause();
            return;
        }

        self.state.update(|s| s.on_going_list = list.to_vec());
        self.load_and_play(track);
    }

    pub fn toggle_play_pause(&mut self) {
        let is_playing = self.state.snapshot().is_playing;
        let Some(sound) = self.slot.get() else {
            return;
        };

        let result = if is_playing { sound.pause() } else { sound.play() };
        match result {
            Ok(()) => self.state.update(|s| s.is_playing = !is_playing),
            Err(e) => self.notifications.report("PlaybackController", &e),
        }
    }

    /// Load the track after the current one; returns false at the end of the list
    pub fn next(&mut self) -> bool {
        self.step(true)
    }

    /// Load the track before the current one; returns false at the start of the list
    pub fn previous(&mut self) -> bool {
        self.step(false)
    }

    fn step(&mut self, forward: bool) -> bool {
        let snapshot = self.state.snapshot();
        let Some(index) = snapshot.current_index() else {
            return false;
        };

        let target = if forward {
            index.checked_add(1)
        } else {
            index.checked_sub(1)
        };

        match target.and_then(|i| snapshot.on_going_list.get(i)) {
            Some(track) => {
                let track = track.clone();
                self.load_and_play(&track);
                true
            }
            None => {
                log::debug!(
                    "[PlaybackController] No {} track, staying on index {}",
                    if forward { "next" } else { "previous" },
                    index
                );
                false
            }
        }
    }

    pub fn seek(&mut self, position_ms: u64) {
        let Some(sound) = self.slot.get() else {
            return;
        };
        match sound.seek(position_ms) {
            Ok(()) => self.state.update(|s| {
                s.position_ms = position_ms;
                s.list_finished = false;
            }),
            Err(e) => self.notifications.report("PlaybackController", &e),
        }
    }

    /// Relative seek from the handle's reported position, never below zero
    pub fn skip(&mut self, delta_secs: i64) {
        let Some(sound) = self.slot.get() else {
            return;
        };

        let status = sound.status();
        if !status.is_loaded {
            return;
        }
        if status.did_just_finish {
            // Track ended between ticks; let the end-of-track path run instead
            self.on_status(status);
            return;
        }

        let target = status.position_ms as i64 + delta_secs.saturating_mul(1000);
        let mut target = target.max(0) as u64;
        if let Some(duration) = status.duration_ms.filter(|d| *d > 0) {
            target = target.min(duration);
        }
        self.seek(target);
    }

    pub fn set_rate(&mut self, rate: f32) {
        if !rate.is_finite() || rate <= 0.0 {
            self.notifications.report(
                "PlaybackController",
                &AppError::Invalid(format!("playback rate {}", rate)),
            );
            return;
        }

        if let Some(sound) = self.slot.get() {
            if let Err(e) = sound.set_rate(rate) {
                self.notifications.report("PlaybackController", &e);
                return;
            }
        }
        self.state.update(|s| s.playback_rate = rate);
    }

    /// Status callback, invoked once per tick for the live handle
    pub fn on_status(&mut self, status: PlaybackStatus) {
        if !status.is_loaded {
            self.state.update(|s| s.is_playing = false);
            return;
        }

        self.state.update(|s| {
            s.is_playing = status.is_playing;
            s.position_ms = status.position_ms;
            s.duration_ms = status.duration_ms.unwrap_or(0);
        });

        if status.did_just_finish {
            log::info!("[PlaybackController] Track finished, advancing");
            if !self.next() {
                log::info!("[PlaybackController] End of list reached");
                self.state.update(|s| s.list_finished = true);
            }
        }
    }

    /// Poll the live handle and feed its status back into the controller
    pub fn tick(&mut self) {
        let status = match self.slot.get() {
            Some(sound) => sound.status(),
            None => return,
        };
        self.on_status(status);
    }

    pub fn stop(&mut self) {
        log::debug!("[PlaybackController] Stopping playback");
        self.slot.unload();
        self.state.update(|s| s.reset());
    }

    fn load_and_play(&mut self, track: &Track) {
        self.state.update(|s| s.is_busy = true);

        // Release the previous stream before the device opens a new one
        self.slot.unload();

        log::info!(
            "[PlaybackController] Loading '{}' ({})",
            track.title,
            track.id
        );
        match self.engine.load(&track.file, true) {
            Ok(mut sound) => {
                let rate = self.state.snapshot().playback_rate;
                if (rate - DEFAULT_PLAYBACK_RATE).abs() > f32::EPSILON {
                    if let Err(e) = sound.set_rate(rate) {
                        log::warn!("[PlaybackController] Could not apply rate {}: {}", rate, e);
                    }
                }
                self.slot.set(sound);
                self.state.update(|s| {
                    s.on_going_audio = Some(track.clone());
                    s.is_playing = true;
                    s.position_ms = 0;
                    s.duration_ms = 0;
                    s.list_finished = false;
                });
            }
            Err(e) => {
                log::error!("[PlaybackController] Load failed for {}: {}", track.id, e);
                self.state.update(|s| {
                    s.on_going_audio = None;
                    s.is_playing = false;
                    s.position_ms = 0;
                    s.duration_ms = 0;
                });
                self.notifications.error(e.user_message());
            }
        }

        self.state.update(|s| s.is_busy = false);
    }
}

impl<E: MediaEngine> Drop for PlaybackController<E> {
    fn drop(&mut self) {
        self.slot.unload();
        self.state.update(|s| s.is_playing = false);
    }
}
