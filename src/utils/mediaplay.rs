use crate::constants::{STREAM_IDLE_TIMEOUT_SECS, STREAM_START_TIMEOUT_SECS};
use crate::error::{AppError, Result};
use crate::utils::media::core::{SeekTarget, StreamInfo, StreamSession};
use crate::utils::media::{MediaEngine, MediaHandle, PlaybackStatus};
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Device engine backed by the default rodio output.
///
/// `OutputStream` is not `Send`, so the engine must be created on the thread
/// that uses it (see `AudioController::spawn`).
pub struct RodioEngine {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
}

impl RodioEngine {
    pub fn new() -> Result<Self> {
        let (_stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| AppError::Playback(format!("no audio output device: {}", e)))?;
        log::info!("[AudioPlayer] Audio output opened");
        Ok(Self {
            _stream,
            stream_handle,
        })
    }
}

impl MediaEngine for RodioEngine {
    fn load(&mut self, url: &str, should_play: bool) -> Result<Box<dyn MediaHandle>> {
        let player = AudioPlayer::open(url, self.stream_handle.clone(), should_play)?;
        Ok(Box::new(player))
    }
}

/// Progressive source: plays decoded frames as they arrive
struct StreamingSource {
    sample_rx: Receiver<Vec<i16>>,
    current_samples: Vec<i16>,
    sample_index: usize,
    sample_rate: u32,
    channels: u16,
    samples_played: Arc<AtomicU64>,
    ended: Arc<AtomicBool>,
    last_sample_time: Instant,
}

impl StreamingSource {
    fn new(
        sample_rx: Receiver<Vec<i16>>,
        info: &StreamInfo,
        samples_played: Arc<AtomicU64>,
        ended: Arc<AtomicBool>,
    ) -> Self {
        Self {
            sample_rx,
            current_samples: Vec::new(),
            sample_index: 0,
            sample_rate: info.sample_rate.max(1),
            channels: info.channels.max(1),
            samples_played,
            ended,
            last_sample_time: Instant::now(),
        }
    }

    fn finish(&mut self) -> Option<i16> {
        self.ended.store(true, Ordering::Relaxed);
        None
    }
}

impl Iterator for StreamingSource {
    type Item = i16;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.sample_index < self.current_samples.len() {
                let sample = self.current_samples[self.sample_index];
                self.sample_index += 1;
                self.samples_played.fetch_add(1, Ordering::Relaxed);
                return Some(sample);
            }

            match self.sample_rx.try_recv() {
                Ok(samples) => {
                    self.current_samples = samples;
                    self.sample_index = 0;
                    self.last_sample_time = Instant::now();
                }
                // Decoder thread exited: everything has been played
                Err(TryRecvError::Disconnected) => return self.finish(),
                Err(TryRecvError::Empty) => {
                    if self.last_sample_time.elapsed() > Duration::from_secs(STREAM_IDLE_TIMEOUT_SECS)
                    {
                        log::error!("[StreamingSource] Stream timeout detected - ending playback");
                        return self.finish();
                    }
                    // Underrun: yield silence while the network catches up
                    return Some(0);
                }
            }
        }
    }
}

impl Source for StreamingSource {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

/// One loaded track on the rodio output
pub struct AudioPlayer {
    url: String,
    stream_handle: OutputStreamHandle,
    sink: Sink,
    session: Option<StreamSession>,
    info: StreamInfo,
    duration_ms: Option<u64>,
    start_position_ms: u64,
    samples_played: Arc<AtomicU64>,
    ended: Arc<AtomicBool>,
    rate: f32,
    /// Set when a seek ran off the end or the stream could not be reopened
    end_reached: bool,
    finish_reported: bool,
    unloaded: bool,
}

impl AudioPlayer {
    pub fn open(url: &str, stream_handle: OutputStreamHandle, should_play: bool) -> Result<Self> {
        log::info!("[AudioPlayer] Opening stream {}", url);
        let session = StreamSession::open(url, 0, Duration::from_secs(STREAM_START_TIMEOUT_SECS))?;
        let info = session.info;
        let duration_ms = info.duration_ms();

        let sink = Sink::try_new(&stream_handle)
            .map_err(|e| AppError::Playback(format!("cannot create sink: {}", e)))?;

        let mut player = Self {
            url: url.to_string(),
            stream_handle,
            sink,
            session: None,
            info,
            duration_ms,
            start_position_ms: 0,
            samples_played: Arc::new(AtomicU64::new(0)),
            ended: Arc::new(AtomicBool::new(false)),
            rate: 1.0,
            end_reached: false,
            finish_reported: false,
            unloaded: false,
        };
        player.attach(session, !should_play);

        log::info!(
            "[AudioPlayer] Streaming {} Hz / {} ch / {} kbps, duration {:?} ms",
            info.sample_rate,
            info.channels,
            info.bitrate_kbps,
            duration_ms
        );
        Ok(player)
    }

    /// Feed a session into the current sink
    fn attach(&mut self, mut session: StreamSession, paused: bool) {
        self.samples_played = Arc::new(AtomicU64::new(0));
        self.ended = Arc::new(AtomicBool::new(false));
        self.end_reached = false;
        self.finish_reported = false;

        if let Some(rx) = session.samples.take() {
            let source = StreamingSource::new(
                rx,
                &session.info,
                Arc::clone(&self.samples_played),
                Arc::clone(&self.ended),
            );
            if paused {
                self.sink.pause();
            }
            self.sink.set_speed(self.rate);
            self.sink.append(source);
        }
        self.session = Some(session);
    }

    fn position_ms(&self) -> u64 {
        let played = self
            .info
            .samples_to_ms(self.samples_played.load(Ordering::Relaxed));
        let position = self.start_position_ms.saturating_add(played);
        match self.duration_ms {
            Some(total) => position.min(total),
            None => position,
        }
    }

    fn is_finished(&self) -> bool {
        self.end_reached || (self.ended.load(Ordering::Relaxed) && self.sink.empty())
    }

    /// Drop the current stream and park at `position_ms` as a finished track.
    /// The next `status()` reports `did_just_finish` once.
    fn finish_at(&mut self, position_ms: u64) {
        if let Some(session) = self.session.take() {
            session.close();
        }
        self.sink.stop();
        self.samples_played = Arc::new(AtomicU64::new(0));
        self.start_position_ms = position_ms;
        self.end_reached = true;
        self.finish_reported = false;
    }
}

impl MediaHandle for AudioPlayer {
    fn play(&mut self) -> Result<()> {
        if self.unloaded {
            return Err(AppError::Playback("sound is unloaded".to_string()));
        }
        self.sink.play();
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        if self.unloaded {
            return Err(AppError::Playback("sound is unloaded".to_string()));
        }
        self.sink.pause();
        log::debug!("[AudioPlayer] Paused at {} ms", self.position_ms());
        Ok(())
    }

    /// Restart the download at the byte offset matching `position_ms`
    fn seek(&mut self, position_ms: u64) -> Result<()> {
        if self.unloaded {
            return Err(AppError::Playback("sound is unloaded".to_string()));
        }
        let position_ms = match self.duration_ms {
            Some(total) => position_ms.min(total),
            None => position_ms,
        };

        let byte_offset = match self.info.seek_target(position_ms) {
            SeekTarget::Offset(offset) => offset,
            SeekTarget::End => {
                log::info!("[AudioPlayer] Seek to {} ms is past the audio, finishing", position_ms);
                self.finish_at(position_ms);
                return Ok(());
            }
        };
        log::info!(
            "[AudioPlayer] Seeking to {} ms (byte offset {})",
            position_ms,
            byte_offset
        );

        let was_paused = self.sink.is_paused();
        if let Some(old) = self.session.take() {
            old.close();
        }
        self.sink.stop();

        let reopened = StreamSession::open(
            &self.url,
            byte_offset,
            Duration::from_secs(STREAM_START_TIMEOUT_SECS),
        )
        .and_then(|session| {
            let sink = Sink::try_new(&self.stream_handle)
                .map_err(|e| AppError::Playback(format!("cannot create sink: {}", e)))?;
            Ok((session, sink))
        });

        match reopened {
            Ok((session, sink)) => {
                self.sink = sink;
                self.start_position_ms = position_ms;
                self.attach(session, was_paused);
                Ok(())
            }
            Err(e) => {
                // The old stream is gone; report the track as finished rather than hang
                log::warn!("[AudioPlayer] Could not resume at {} ms: {}", position_ms, e);
                self.finish_at(position_ms);
                Err(e)
            }
        }
    }

    fn set_rate(&mut self, rate: f32) -> Result<()> {
        self.rate = rate;
        self.sink.set_speed(rate);
        Ok(())
    }

    fn status(&mut self) -> PlaybackStatus {
        if self.unloaded {
            return PlaybackStatus::unloaded();
        }

        let finished = self.is_finished();
        let did_just_finish = finished && !self.finish_reported;
        if did_just_finish {
            self.finish_reported = true;
        }

        PlaybackStatus {
            is_loaded: true,
            is_playing: !finished && !self.sink.is_paused(),
            position_ms: self.position_ms(),
            duration_ms: self.duration_ms,
            did_just_finish,
        }
    }

    fn unload(&mut self) {
        if self.unloaded {
            return;
        }
        log::debug!("[AudioPlayer] Unloading {}", self.url);
        self.sink.stop();
        if let Some(session) = self.session.take() {
            session.close();
        }
        self.unloaded = true;
    }
}

impl Drop for AudioPlayer {
    fn drop(&mut self) {
        self.unload();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    fn info() -> StreamInfo {
        StreamInfo {
            sample_rate: 8_000,
            channels: 1,
            bitrate_kbps: 32,
            content_length: None,
            audio_start: 0,
        }
    }

    #[test]
    fn source_plays_frames_then_ends_when_decoder_exits() {
        let (tx, rx) = channel();
        let played = Arc::new(AtomicU64::new(0));
        let ended = Arc::new(AtomicBool::new(false));
        let mut source = StreamingSource::new(rx, &info(), Arc::clone(&played), Arc::clone(&ended));

        tx.send(vec![1, 2]).unwrap();
        tx.send(vec![3]).unwrap();
        drop(tx);

        let samples: Vec<i16> = source.by_ref().collect();
        assert_eq!(samples, vec![1, 2, 3]);
        assert_eq!(played.load(Ordering::Relaxed), 3);
        assert!(ended.load(Ordering::Relaxed));
    }

    #[test]
    fn source_yields_silence_on_underrun() {
        let (tx, rx) = channel::<Vec<i16>>();
        let played = Arc::new(AtomicU64::new(0));
        let ended = Arc::new(AtomicBool::new(false));
        let mut source = StreamingSource::new(rx, &info(), Arc::clone(&played), Arc::clone(&ended));

        assert_eq!(source.next(), Some(0));
        assert_eq!(played.load(Ordering::Relaxed), 0);
        assert!(!ended.load(Ordering::Relaxed));
        drop(tx);
    }
}
