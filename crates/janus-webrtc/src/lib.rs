//! # Janus WebRTC
//!
//! Implements the `janus-interfaces` peer and media traits with webrtc-rs.
//! [`WebRtcPeerFactory`] and [`RtpPlayback`] share a [`TrackRegistry`]: the
//! factory records every remote track its peers receive, the playback sink
//! reads RTP from the tracks it is asked to play.

mod error;
pub mod peer;
pub mod playback;
pub mod registry;

pub use peer::{WebRtcPeer, WebRtcPeerFactory};
pub use playback::{PlaybackStats, RtpPlayback};
pub use registry::TrackRegistry;

/// A peer factory and a playback sink wired to the same track registry.
pub fn peer_and_playback() -> (WebRtcPeerFactory, RtpPlayback) {
    let tracks = TrackRegistry::new();
    (
        WebRtcPeerFactory::new(tracks.clone()),
        RtpPlayback::new(tracks),
    )
}
