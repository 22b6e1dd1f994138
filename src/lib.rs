//! # Janus Subscriber
//!
//! Facade over the workspace: the session API from `janus-client` and the
//! webrtc-rs peer and playback implementations from `janus-webrtc`.

pub use janus_client::*;
pub use janus_webrtc::{PlaybackStats, RtpPlayback, TrackRegistry, WebRtcPeerFactory, peer_and_playback};
