use crate::app::controller::PlaybackController;
use crate::constants::PLAYER_TICK_MILLIS;
use crate::models::Track;
use crate::services::notifications::Notifications;
use crate::state::{PlayerState, SharedPlayerState};
use crate::utils::media::MediaEngine;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread::JoinHandle;
use std::time::Duration;

pub enum AudioCommand {
    Press { track: Track, list: Vec<Track> },
    TogglePlayPause,
    Next,
    Previous,
    Seek(u64),
    Skip(i64),
    SetRate(f32),
    Stop,
    Shutdown,
}

/// Front end of the audio thread.
///
/// The thread owns the engine and the [`PlaybackController`]; this handle only
/// sends commands and reads the shared state. Dropping it shuts the thread
/// down, which releases the live sound.
pub struct AudioController {
    command_tx: Sender<AudioCommand>,
    state: SharedPlayerState,
    thread: Option<JoinHandle<()>>,
}

impl AudioController {
    /// Start the audio thread. `engine_factory` runs on that thread, so the
    /// engine itself does not need to be `Send`.
    pub fn spawn<E, F>(engine_factory: F, state: SharedPlayerState, notifications: Notifications) -> Self
    where
        E: MediaEngine + 'static,
        F: FnOnce() -> crate::error::Result<E> + Send + 'static,
    {
        let (command_tx, command_rx): (Sender<AudioCommand>, Receiver<AudioCommand>) = channel();
        let thread_state = state.clone();

        let thread = std::thread::Builder::new()
            .name("maxiplay-audio".to_string())
            .spawn(move || {
                let engine = match engine_factory() {
                    Ok(engine) => engine,
                    Err(e) => {
                        notifications.report("AudioController", &e);
                        return;
                    }
                };
                let mut controller = PlaybackController::new(engine, thread_state, notifications);
                run_loop(&mut controller, command_rx);
                log::debug!("[AudioController] Audio thread exiting");
            });

        let thread = match thread {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("[AudioController] Failed to spawn audio thread: {}", e);
                None
            }
        };

        Self {
            command_tx,
            state,
            thread,
        }
    }

    fn send(&self, cmd: AudioCommand) {
        if self.command_tx.send(cmd).is_err() {
            log::warn!("[AudioController] Audio thread is not running, command dropped");
        }
    }

    pub fn press(&self, track: Track, list: Vec<Track>) {
        self.send(AudioCommand::Press { track, list });
    }

    pub fn toggle_play_pause(&self) {
        self.send(AudioCommand::TogglePlayPause);
    }

    pub fn next(&self) {
        self.send(AudioCommand::Next);
    }

    pub fn previous(&self) {
        self.send(AudioCommand::Previous);
    }

    pub fn seek(&self, position_ms: u64) {
        self.send(AudioCommand::Seek(position_ms));
    }

    pub fn skip(&self, delta_secs: i64) {
        self.send(AudioCommand::Skip(delta_secs));
    }

    pub fn set_rate(&self, rate: f32) {
        self.send(AudioCommand::SetRate(rate));
    }

    pub fn stop(&self) {
        self.send(AudioCommand::Stop);
    }

    pub fn snapshot(&self) -> PlayerState {
        self.state.snapshot()
    }

    pub fn state(&self) -> &SharedPlayerState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .map(|t| !t.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for AudioController {
    fn drop(&mut self) {
        let _ = self.command_tx.send(AudioCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("[AudioController] Audio thread panicked");
            }
        }
    }
}

fn run_loop<E: MediaEngine>(controller: &mut PlaybackController<E>, command_rx: Receiver<AudioCommand>) {
    loop {
        loop {
            match command_rx.try_recv() {
                Ok(AudioCommand::Shutdown) | Err(TryRecvError::Disconnected) => {
                    controller.stop();
                    return;
                }
                Ok(cmd) => apply(controller, cmd),
                Err(TryRecvError::Empty) => break,
            }
        }

        controller.tick();
        std::thread::sleep(Duration::from_millis(PLAYER_TICK_MILLIS));
    }
}

fn apply<E: MediaEngine>(controller: &mut PlaybackController<E>, cmd: AudioCommand) {
    match cmd {
        AudioCommand::Press { track, list } => {
            log::debug!("[AudioController] Received Press for {}", track.id);
            controller.press(&track, &list);
        }
        AudioCommand::TogglePlayPause => controller.toggle_play_pause(),
        AudioCommand::Next => {
            controller.next();
        }
        AudioCommand::Previous => {
            controller.previous();
        }
        AudioCommand::Seek(position_ms) => {
            log::debug!("[AudioController] Received Seek to {} ms", position_ms);
            controller.seek(position_ms);
        }
        AudioCommand::Skip(delta) => controller.skip(delta),
        AudioCommand::SetRate(rate) => controller.set_rate(rate),
        AudioCommand::Stop => controller.stop(),
        AudioCommand::Shutdown => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, Result};
    use crate::models::Owner;
    use crate::utils::media::{MediaHandle, PlaybackStatus};
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    type Log = Arc<Mutex<Vec<String>>>;

    struct ThreadEngine {
        log: Log,
    }

    struct ThreadHandle {
        log: Log,
        playing: bool,
        position_ms: u64,
    }

    impl MediaEngine for ThreadEngine {
        fn load(&mut self, url: &str, should_play: bool) -> Result<Box<dyn MediaHandle>> {
            self.log.lock().unwrap().push(format!("load {}", url));
            Ok(Box::new(ThreadHandle {
                log: Arc::clone(&self.log),
                playing: should_play,
                position_ms: 0,
            }))
        }
    }

    impl MediaHandle for ThreadHandle {
        fn play(&mut self) -> Result<()> {
            self.playing = true;
            Ok(())
        }
        fn pause(&mut self) -> Result<()> {
            self.playing = false;
            Ok(())
        }
        fn seek(&mut self, position_ms: u64) -> Result<()> {
            self.position_ms = position_ms;
            Ok(())
        }
        fn set_rate(&mut self, _rate: f32) -> Result<()> {
            Ok(())
        }
        fn status(&mut self) -> PlaybackStatus {
            if self.playing {
                self.position_ms += 50;
            }
            PlaybackStatus {
                is_loaded: true,
                is_playing: self.playing,
                position_ms: self.position_ms,
                duration_ms: Some(300_000),
                did_just_finish: false,
            }
        }
        fn unload(&mut self) {
            self.log.lock().unwrap().push("unload".to_string());
        }
    }

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            title: id.to_string(),
            about: String::new(),
            category: String::new(),
            file: id.to_string(),
            poster: None,
            owner: Owner {
                id: "o".to_string(),
                name: "o".to_string(),
            },
        }
    }

    fn wait_until<F: Fn() -> bool>(cond: F) -> bool {
        let start = Instant::now();
        while start.elapsed() < Duration::from_secs(3) {
            if cond() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        false
    }

    #[test]
    fn commands_reach_the_audio_thread_and_ticks_update_state() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let engine_log = Arc::clone(&log);
        let audio = AudioController::spawn(
            move || Ok(ThreadEngine { log: engine_log }),
            SharedPlayerState::new(),
            Notifications::new(),
        );

        let list = vec![track("a"), track("b")];
        audio.press(list[0].clone(), list.clone());

        assert!(wait_until(|| audio.snapshot().position_ms > 0));
        assert!(audio.snapshot().is_playing);

        audio.next();
        assert!(wait_until(|| audio
            .snapshot()
            .on_going_audio
            .map(|t| t.id == "b")
            .unwrap_or(false)));

        drop(audio);
        let log = log.lock().unwrap().clone();
        assert_eq!(log, vec!["load a", "unload", "load b", "unload"]);
    }

    #[test]
    fn engine_failure_is_reported_and_thread_stops() {
        let notifications = Notifications::new();
        let audio = AudioController::spawn(
            || -> Result<ThreadEngine> { Err(AppError::Playback("no device".to_string())) },
            SharedPlayerState::new(),
            notifications.clone(),
        );

        assert!(wait_until(|| !audio.is_running()));
        assert_eq!(notifications.drain().len(), 1);

        // Commands after the thread died are dropped without panicking
        audio.press(track("a"), vec![track("a")]);
        assert!(audio.snapshot().on_going_audio.is_none());
    }
}
