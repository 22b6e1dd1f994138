//! RTP playback sink.
//!
//! Stands in for a video element: attached tracks are drained packet by
//! packet on a tokio task once played, and per-track counters are kept.

use crate::registry::TrackRegistry;
use janus_interfaces::{ApiError, MediaKind, MediaSink, RemoteTrack};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use webrtc::track::track_remote::TrackRemote;

/// Per-track counters (atomic, updated by the read task)
#[derive(Default)]
struct TrackCounters {
    packets: AtomicU64,
    bytes: AtomicU64,
    playing: AtomicBool,
}

/// Snapshot of one track's playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackStats {
    pub track_id: String,
    pub kind: MediaKind,
    pub codec: String,
    pub playing: bool,
    pub packets: u64,
    pub bytes: u64,
}

struct AttachedTrack {
    info: RemoteTrack,
    counters: Arc<TrackCounters>,
}

/// `MediaSink` that consumes RTP from tracks registered by the peer factory.
pub struct RtpPlayback {
    tracks: TrackRegistry,
    attached: Mutex<HashMap<String, AttachedTrack>>,
}

impl RtpPlayback {
    pub fn new(tracks: TrackRegistry) -> Self {
        Self {
            tracks,
            attached: Mutex::new(HashMap::new()),
        }
    }

    /// Counters for every attached track, ordered by track id.
    pub fn stats(&self) -> Vec<PlaybackStats> {
        let attached = self.attached.lock();
        let mut stats: Vec<PlaybackStats> = attached
            .values()
            .map(|track| PlaybackStats {
                track_id: track.info.id.clone(),
                kind: track.info.kind,
                codec: track.info.codec.clone(),
                playing: track.counters.playing.load(Ordering::Relaxed),
                packets: track.counters.packets.load(Ordering::Relaxed),
                bytes: track.counters.bytes.load(Ordering::Relaxed),
            })
            .collect();
        stats.sort_by(|a, b| a.track_id.cmp(&b.track_id));
        stats
    }
}

impl MediaSink for RtpPlayback {
    fn attach(&self, track: &RemoteTrack) -> Result<(), ApiError> {
        if !self.tracks.contains(&track.id) {
            return Err(ApiError::TrackNotFound(track.id.clone()));
        }
        let mut attached = self.attached.lock();
        if attached.contains_key(&track.id) {
            debug!("Track {} already attached.", track.id);
            return Ok(());
        }
        attached.insert(
            track.id.clone(),
            AttachedTrack {
                info: track.clone(),
                counters: Arc::new(TrackCounters::default()),
            },
        );
        info!("Attached {:?} track {} ({}).", track.kind, track.id, track.codec);
        Ok(())
    }

    fn play(&self, track_id: &str) -> Result<(), ApiError> {
        let counters = {
            let attached = self.attached.lock();
            let track = attached
                .get(track_id)
                .ok_or_else(|| ApiError::TrackNotFound(track_id.to_string()))?;
            track.counters.clone()
        };
        if counters.playing.swap(true, Ordering::SeqCst) {
            debug!("Track {} is already playing.", track_id);
            return Ok(());
        }

        let remote = self
            .tracks
            .get(track_id)
            .ok_or_else(|| ApiError::TrackNotFound(track_id.to_string()))?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            counters.playing.store(false, Ordering::SeqCst);
            ApiError::InternalError(format!("No runtime to play track {}: {}", track_id, e))
        })?;

        runtime.spawn(read_track(track_id.to_string(), remote, counters));
        info!("Playing track {}.", track_id);
        Ok(())
    }
}

// Consecutive read errors tolerated before a track is abandoned
const MAX_READ_ERRORS: u32 = 16;

async fn read_track(track_id: String, track: Arc<TrackRemote>, counters: Arc<TrackCounters>) {
    let mut errors = 0;
    loop {
        match track.read_rtp().await {
            Ok((packet, _attributes)) => {
                errors = 0;
                counters.packets.fetch_add(1, Ordering::Relaxed);
                counters
                    .bytes
                    .fetch_add(packet.payload.len() as u64, Ordering::Relaxed);
            }
            Err(e) => {
                let err_str = e.to_string().to_lowercase();
                if err_str.contains("eof") || err_str.contains("closed") {
                    break;
                }
                warn!("RTP read error on track {}: {}", track_id, e);
                errors += 1;
                if errors >= MAX_READ_ERRORS {
                    break;
                }
            }
        }
    }
    counters.playing.store(false, Ordering::SeqCst);
    info!(
        "Track {} ended after {} packets.",
        track_id,
        counters.packets.load(Ordering::Relaxed)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_track(id: &str) -> RemoteTrack {
        RemoteTrack {
            id: id.to_string(),
            stream_id: "janus".to_string(),
            kind: MediaKind::Video,
            codec: "video/VP8".to_string(),
        }
    }

    #[test]
    fn unknown_tracks_cannot_be_attached() {
        let playback = RtpPlayback::new(TrackRegistry::new());
        assert_eq!(
            playback.attach(&video_track("v0")),
            Err(ApiError::TrackNotFound("v0".into()))
        );
        assert!(playback.stats().is_empty());
    }

    #[test]
    fn play_requires_attach() {
        let playback = RtpPlayback::new(TrackRegistry::new());
        assert!(matches!(
            playback.play("v0"),
            Err(ApiError::TrackNotFound(id)) if id == "v0"
        ));
    }
}
