// Network and decode stages of a media stream.
//
// Bytes are downloaded on one thread (own current-thread runtime) and handed
// to a decoder thread through a channel; decoded i16 frames come out the other
// side for the rodio source in `mediaplay`.

use crate::constants::SEEK_END_MARGIN_BYTES;
use crate::error::{AppError, Result};
use futures_util::StreamExt;
use minimp3::{Decoder as Mp3Decoder, Error as Mp3Error, Frame};
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

const ID3_HEADER_LEN: usize = 10;

/// Format of a stream, taken from its first decoded frame.
///
/// Duration and seek offsets assume a constant bitrate; for VBR files both are
/// estimates and position still comes from samples actually played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub bitrate_kbps: u32,
    /// Bytes the server will send from the requested offset
    pub content_length: Option<u64>,
    /// Size of a leading ID3v2 tag; audio frames start after it
    pub audio_start: u64,
}

/// Where a seek lands in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekTarget {
    /// Restart the download at this byte offset
    Offset(u64),
    /// Nothing decodable is left: treat as end of track
    End,
}

impl StreamInfo {
    /// Estimated duration of `bytes` of audio at the stream's bitrate
    pub fn duration_ms_for(&self, bytes: u64) -> Option<u64> {
        if self.bitrate_kbps == 0 {
            return None;
        }
        // kbps == bits per millisecond
        Some(bytes * 8 / self.bitrate_kbps as u64)
    }

    /// Estimated duration of the whole file, tag excluded
    pub fn duration_ms(&self) -> Option<u64> {
        let len = self.content_length?;
        self.duration_ms_for(len.saturating_sub(self.audio_start))
    }

    /// Byte offset matching a playback position
    pub fn byte_offset_for(&self, position_ms: u64) -> u64 {
        self.audio_start + position_ms * self.bitrate_kbps as u64 / 8
    }

    /// Decide how to seek to `position_ms`. Offsets at or near the end of the
    /// file cannot produce a frame, so they count as the end of the track.
    pub fn seek_target(&self, position_ms: u64) -> SeekTarget {
        if let Some(total) = self.duration_ms() {
            if position_ms >= total {
                return SeekTarget::End;
            }
        }
        let offset = self.byte_offset_for(position_ms);
        match self.content_length {
            Some(len) if offset.saturating_add(SEEK_END_MARGIN_BYTES) >= len => SeekTarget::End,
            _ => SeekTarget::Offset(offset),
        }
    }

    pub fn samples_to_ms(&self, samples: u64) -> u64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0;
        }
        samples / self.channels as u64 * 1000 / self.sample_rate as u64
    }
}

/// First response of a download: how much is coming and how much of it is tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamHead {
    pub content_length: Option<u64>,
    pub tag_len: u64,
}

/// Total size of an ID3v2 tag starting at `bytes[0]`, or 0 when there is none
pub fn id3v2_tag_len(bytes: &[u8]) -> u64 {
    if bytes.len() < ID3_HEADER_LEN || &bytes[..3] != b"ID3" {
        return 0;
    }
    // Size is syncsafe: 4 x 7 bits, header and footer excluded
    let size = bytes[6..10]
        .iter()
        .fold(0u64, |acc, b| (acc << 7) | (*b & 0x7f) as u64);
    let footer = if bytes[5] & 0x10 != 0 { ID3_HEADER_LEN as u64 } else { 0 };
    ID3_HEADER_LEN as u64 + size + footer
}

/// A running download + decode pipeline. Dropping it stops both threads.
pub struct StreamSession {
    pub info: StreamInfo,
    pub samples: Option<Receiver<Vec<i16>>>,
    shutdown: Arc<AtomicBool>,
}

impl StreamSession {
    /// Start streaming `url` from `byte_offset` and wait for the first frame
    pub fn open(url: &str, byte_offset: u64, start_timeout: Duration) -> Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let (chunk_tx, chunk_rx) = channel::<Vec<u8>>();
        let (head_tx, head_rx) = channel::<std::result::Result<StreamHead, String>>();
        let (info_tx, info_rx) = channel::<StreamInfo>();
        let (sample_tx, sample_rx) = channel::<Vec<i16>>();

        let url_owned = url.to_string();
        let download_shutdown = Arc::clone(&shutdown);
        std::thread::spawn(move || {
            let rt = match crate::utils::error_handling::create_runtime() {
                Ok(r) => r,
                Err(e) => {
                    let _ = head_tx.send(Err(e.to_string()));
                    return;
                }
            };
            if let Err(e) = rt.block_on(download_stream(
                &url_owned,
                byte_offset,
                chunk_tx,
                head_tx,
                download_shutdown,
            )) {
                log::warn!("[Streaming] Download ended with error: {}", e);
            }
        });

        let head = match head_rx.recv_timeout(start_timeout) {
            Ok(Ok(head)) => head,
            Ok(Err(msg)) => {
                shutdown.store(true, Ordering::Relaxed);
                return Err(AppError::Playback(msg));
            }
            Err(_) => {
                shutdown.store(true, Ordering::Relaxed);
                return Err(AppError::Playback("stream did not respond".to_string()));
            }
        };

        let decoder_shutdown = Arc::clone(&shutdown);
        std::thread::spawn(move || {
            decode_frames(
                ChannelReader::new(chunk_rx, Arc::clone(&decoder_shutdown)),
                info_tx,
                sample_tx,
                decoder_shutdown,
                head,
            );
        });

        match info_rx.recv_timeout(start_timeout) {
            Ok(info) => {
                log::debug!("[Streaming] Stream ready: {:?}", info);
                Ok(Self {
                    info,
                    samples: Some(sample_rx),
                    shutdown,
                })
            }
            Err(_) => {
                shutdown.store(true, Ordering::Relaxed);
                Err(AppError::Playback(
                    "no decodable audio in stream".to_string(),
                ))
            }
        }
    }

    pub fn close(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Download `url` from `byte_offset`, forwarding raw chunks to the decoder.
/// Sends the stream head (or the failure) on `head_tx` first. From the start
/// of the file the head waits for enough bytes to measure an ID3v2 tag.
pub async fn download_stream(
    url: &str,
    byte_offset: u64,
    chunk_tx: Sender<Vec<u8>>,
    head_tx: Sender<std::result::Result<StreamHead, String>>,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    let client = crate::utils::http::streaming_client();
    let mut req = client.get(url);
    if byte_offset > 0 {
        req = req.header(reqwest::header::RANGE, format!("bytes={}-", byte_offset));
    }

    let resp = match req.send().await {
        Ok(resp) => resp,
        Err(e) => {
            let _ = head_tx.send(Err(e.to_string()));
            return Err(e.into());
        }
    };
    if !resp.status().is_success() {
        let msg = format!("media server returned {}", resp.status());
        let _ = head_tx.send(Err(msg.clone()));
        return Err(AppError::Playback(msg));
    }
    let content_length = resp.content_length();

    // Mid-file ranges never start with a tag
    let mut head_sent = byte_offset > 0;
    if head_sent {
        let _ = head_tx.send(Ok(StreamHead {
            content_length,
            tag_len: 0,
        }));
    }
    let mut pending: Vec<u8> = Vec::new();

    let mut stream = resp.bytes_stream();
    while let Some(item) = stream.next().await {
        if shutdown.load(Ordering::Relaxed) {
            return Ok(());
        }
        let chunk = match item {
            Ok(chunk) => chunk,
            Err(e) => {
                if !head_sent {
                    let _ = head_tx.send(Err(e.to_string()));
                }
                return Err(e.into());
            }
        };

        if !head_sent {
            pending.extend_from_slice(&chunk);
            if pending.len() < ID3_HEADER_LEN {
                continue;
            }
            head_sent = true;
            let _ = head_tx.send(Ok(StreamHead {
                content_length,
                tag_len: id3v2_tag_len(&pending),
            }));
            if chunk_tx.send(std::mem::take(&mut pending)).is_err() {
                return Ok(());
            }
            continue;
        }

        if chunk_tx.send(chunk.to_vec()).is_err() {
            // Decoder is gone
            return Ok(());
        }
    }

    // Body shorter than a tag header
    if !head_sent {
        let _ = head_tx.send(Ok(StreamHead {
            content_length,
            tag_len: 0,
        }));
        if !pending.is_empty() {
            let _ = chunk_tx.send(pending);
        }
    }
    Ok(())
}

fn decode_frames<R: Read>(
    reader: R,
    info_tx: Sender<StreamInfo>,
    sample_tx: Sender<Vec<i16>>,
    shutdown: Arc<AtomicBool>,
    head: StreamHead,
) {
    let mut decoder = Mp3Decoder::new(reader);
    let mut announced = false;

    loop {
        if shutdown.load(Ordering::Relaxed) {
            return;
        }
        match decoder.next_frame() {
            Ok(Frame {
                data,
                sample_rate,
                channels,
                bitrate,
                ..
            }) => {
                if !announced {
                    announced = true;
                    let info = StreamInfo {
                        sample_rate: sample_rate.max(0) as u32,
                        channels: channels as u16,
                        bitrate_kbps: bitrate.max(0) as u32,
                        content_length: head.content_length,
                        audio_start: head.tag_len,
                    };
                    if info_tx.send(info).is_err() {
                        return;
                    }
                }
                if sample_tx.send(data).is_err() {
                    return;
                }
            }
            Err(Mp3Error::SkippedData) => continue,
            Err(Mp3Error::Eof) | Err(Mp3Error::InsufficientData) => {
                log::debug!("[Streaming] Decoder reached end of stream");
                return;
            }
            Err(Mp3Error::Io(e)) => {
                log::warn!("[Streaming] Decoder read error: {}", e);
                return;
            }
        }
    }
}

/// Blocking `Read` over chunks arriving on a channel. Ends (returns 0) when the
/// sender is dropped or the session is shut down.
pub struct ChannelReader {
    rx: Receiver<Vec<u8>>,
    buf: Vec<u8>,
    pos: usize,
    shutdown: Arc<AtomicBool>,
}

impl ChannelReader {
    pub fn new(rx: Receiver<Vec<u8>>, shutdown: Arc<AtomicBool>) -> Self {
        Self {
            rx,
            buf: Vec::new(),
            pos: 0,
            shutdown,
        }
    }
}

impl Read for ChannelReader {
    fn read(&mut self, out: &mut [u8]) -> std::io::Result<usize> {
        while self.pos >= self.buf.len() {
            if self.shutdown.load(Ordering::Relaxed) {
                return Ok(0);
            }
            match self.rx.recv_timeout(Duration::from_millis(200)) {
                Ok(chunk) => {
                    self.buf = chunk;
                    self.pos = 0;
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Ok(0),
            }
        }

        let n = out.len().min(self.buf.len() - self.pos);
        out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(bitrate_kbps: u32) -> StreamInfo {
        StreamInfo {
            sample_rate: 44_100,
            channels: 2,
            bitrate_kbps,
            content_length: None,
            audio_start: 0,
        }
    }

    #[test]
    fn duration_and_offset_follow_bitrate() {
        let info = info(128);
        // 128 kbps == 16 000 bytes per second
        assert_eq!(info.duration_ms_for(16_000 * 60), Some(60_000));
        assert_eq!(info.byte_offset_for(10_000), 160_000);
        assert_eq!(StreamInfo { bitrate_kbps: 0, ..info }.duration_ms_for(1_000), None);
    }

    #[test]
    fn samples_convert_to_millis() {
        let info = info(128);
        assert_eq!(info.samples_to_ms(44_100 * 2), 1_000);
        assert_eq!(info.samples_to_ms(0), 0);
    }

    #[test]
    fn channel_reader_concatenates_chunks_and_ends_on_disconnect() {
        let (tx, rx) = channel();
        tx.send(b"hello ".to_vec()).unwrap();
        tx.send(b"world".to_vec()).unwrap();
        drop(tx);

        let mut reader = ChannelReader::new(rx, Arc::new(AtomicBool::new(false)));
        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        assert_eq!(out, "hello world");
    }

    #[test]
    fn channel_reader_stops_on_shutdown() {
        let (_tx, rx) = channel::<Vec<u8>>();
        let shutdown = Arc::new(AtomicBool::new(true));
        let mut reader = ChannelReader::new(rx, shutdown);
        let mut buf = [0u8; 8];
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn garbage_input_produces_no_frames() {
        let (info_tx, info_rx) = channel();
        let (sample_tx, sample_rx) = channel();
        decode_frames(
            std::io::Cursor::new(vec![0u8; 4096]),
            info_tx,
            sample_tx,
            Arc::new(AtomicBool::new(false)),
            StreamHead {
                content_length: None,
                tag_len: 0,
            },
        );
        assert!(info_rx.try_recv().is_err());
        assert!(sample_rx.try_recv().is_err());
    }

    #[test]
    fn id3v2_tag_size_is_syncsafe() {
        // size bytes 0x00 0x00 0x02 0x01 -> 2 << 7 | 1 = 257
        let header = [b'I', b'D', b'3', 4, 0, 0, 0, 0, 2, 1];
        assert_eq!(id3v2_tag_len(&header), 10 + 257);

        let with_footer = [b'I', b'D', b'3', 4, 0, 0x10, 0, 0, 0, 5];
        assert_eq!(id3v2_tag_len(&with_footer), 10 + 5 + 10);

        assert_eq!(id3v2_tag_len(b"\xff\xfb\x90\x00 frame"), 0);
        assert_eq!(id3v2_tag_len(b"ID3"), 0);
    }

    #[test]
    fn tag_bytes_are_not_counted_as_audio() {
        let info = StreamInfo {
            content_length: Some(16_000 * 60 + 4_096),
            audio_start: 4_096,
            ..info(128)
        };
        assert_eq!(info.duration_ms(), Some(60_000));
        assert_eq!(info.byte_offset_for(0), 4_096);
        assert_eq!(info.byte_offset_for(1_000), 4_096 + 16_000);
    }

    #[test]
    fn seeking_to_or_near_the_end_is_end_of_track() {
        let info = StreamInfo {
            content_length: Some(960_000),
            ..info(128)
        };
        assert_eq!(info.duration_ms(), Some(60_000));
        assert_eq!(info.seek_target(60_000), SeekTarget::End);
        assert_eq!(info.seek_target(90_000), SeekTarget::End);
        // A few bytes short of EOF: no full frame left
        assert_eq!(info.seek_target(59_990), SeekTarget::End);
        assert_eq!(info.seek_target(30_000), SeekTarget::Offset(480_000));

        // Odd length that does not divide evenly into the bitrate
        let odd = StreamInfo {
            content_length: Some(5_000_123),
            ..info
        };
        let total = odd.duration_ms().unwrap();
        assert_eq!(odd.seek_target(total), SeekTarget::End);
        assert_eq!(odd.seek_target(total - 1), SeekTarget::End);
    }

    #[test]
    fn unknown_length_always_restarts() {
        assert_eq!(info(128).seek_target(3_600_000), SeekTarget::Offset(57_600_000));
    }

    mod download {
        use super::*;
        use crate::error::AppError;
        use std::sync::atomic::AtomicBool;
        use std::sync::mpsc::{channel, Receiver, Sender};
        use std::sync::Arc;
        use wiremock::matchers::{header, header_exists, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        type Channels = (
            Sender<Vec<u8>>,
            Receiver<Vec<u8>>,
            Sender<std::result::Result<StreamHead, String>>,
            Receiver<std::result::Result<StreamHead, String>>,
        );

        fn channels() -> Channels {
            let (chunk_tx, chunk_rx) = channel();
            let (head_tx, head_rx) = channel();
            (chunk_tx, chunk_rx, head_tx, head_rx)
        }

        fn id3_file() -> Vec<u8> {
            let mut body = vec![b'I', b'D', b'3', 4, 0, 0, 0, 0, 0, 20];
            body.extend_from_slice(&[0u8; 20]);
            body.extend_from_slice(b"frames");
            body
        }

        #[tokio::test]
        async fn start_of_file_sends_no_range_and_measures_tag() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/song.mp3"))
                .and(header_exists("range"))
                .respond_with(ResponseTemplate::new(416))
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path("/song.mp3"))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(id3_file()))
                .expect(1)
                .mount(&server)
                .await;

            let (chunk_tx, chunk_rx, head_tx, head_rx) = channels();
            let url = format!("{}/song.mp3", server.uri());
            download_stream(&url, 0, chunk_tx, head_tx, Arc::new(AtomicBool::new(false)))
                .await
                .unwrap();

            let head = head_rx.try_recv().unwrap().unwrap();
            assert_eq!(
                head,
                StreamHead {
                    content_length: Some(36),
                    tag_len: 30,
                }
            );
            let received: Vec<u8> = chunk_rx.try_iter().flatten().collect();
            assert_eq!(received, id3_file());
        }

        #[tokio::test]
        async fn offset_requests_a_byte_range() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/song.mp3"))
                .and(header("range", "bytes=100-"))
                .respond_with(ResponseTemplate::new(206).set_body_bytes(vec![7u8; 50]))
                .expect(1)
                .mount(&server)
                .await;

            let (chunk_tx, chunk_rx, head_tx, head_rx) = channels();
            let url = format!("{}/song.mp3", server.uri());
            download_stream(&url, 100, chunk_tx, head_tx, Arc::new(AtomicBool::new(false)))
                .await
                .unwrap();

            let head = head_rx.try_recv().unwrap().unwrap();
            assert_eq!(head.content_length, Some(50));
            assert_eq!(head.tag_len, 0);
            assert_eq!(chunk_rx.try_iter().flatten().count(), 50);
        }

        #[tokio::test]
        async fn unsatisfiable_range_is_reported_on_the_head() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/song.mp3"))
                .respond_with(ResponseTemplate::new(416))
                .mount(&server)
                .await;

            let (chunk_tx, chunk_rx, head_tx, head_rx) = channels();
            let url = format!("{}/song.mp3", server.uri());
            let result =
                download_stream(&url, 960_000, chunk_tx, head_tx, Arc::new(AtomicBool::new(false))).await;

            assert!(matches!(result, Err(AppError::Playback(_))));
            let message = head_rx.try_recv().unwrap().unwrap_err();
            assert!(message.contains("416"));
            assert!(chunk_rx.try_recv().is_err());
        }
    }
}
