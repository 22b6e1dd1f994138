//! webrtc-rs implementation of `PeerConnection` / `PeerConnectionFactory`.
//!
//! Each peer is created with its callbacks already wired: gathered candidates,
//! remote tracks and connection state changes are translated into `PeerEvent`s
//! and handed to the signaling session.

use crate::error::{map_negotiation_error, map_setup_error};
use crate::registry::TrackRegistry;
use async_trait::async_trait;
use janus_interfaces::{
    ApiError, IceCandidate, MediaKind, PeerConnection, PeerConnectionFactory, PeerEvent,
    PeerEventCallback, PeerState, RemoteTrack, SdpType, SessionDescription,
};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::track::track_remote::TrackRemote;

/// Creates webrtc-rs peer connections and records their remote tracks in a
/// shared [`TrackRegistry`].
pub struct WebRtcPeerFactory {
    tracks: TrackRegistry,
}

impl WebRtcPeerFactory {
    pub fn new(tracks: TrackRegistry) -> Self {
        Self { tracks }
    }

    pub fn tracks(&self) -> &TrackRegistry {
        &self.tracks
    }
}

#[async_trait]
impl PeerConnectionFactory for WebRtcPeerFactory {
    async fn create(
        &self,
        stun_servers: &[String],
        on_event: PeerEventCallback,
    ) -> Result<Arc<dyn PeerConnection>, ApiError> {
        let mut media_engine = MediaEngine::default();
        media_engine
            .register_default_codecs()
            .map_err(|e| map_setup_error("Failed to register codecs", e))?;

        let mut registry = Registry::new();
        registry = register_default_interceptors(registry, &mut media_engine)
            .map_err(|e| map_setup_error("Failed to register interceptors", e))?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let peer_connection = api
            .new_peer_connection(rtc_configuration(stun_servers))
            .await
            .map_err(|e| map_setup_error("Failed to create peer connection", e))?;
        let peer_connection = Arc::new(peer_connection);

        register_callbacks(&peer_connection, on_event, self.tracks.clone());
        info!(
            "Peer connection created ({} STUN server(s)).",
            stun_servers.len()
        );

        Ok(Arc::new(WebRtcPeer {
            peer_connection,
            last_answer: Mutex::new(None),
        }))
    }
}

/// ICE configuration listing each STUN URL as its own server.
pub(crate) fn rtc_configuration(stun_servers: &[String]) -> RTCConfiguration {
    RTCConfiguration {
        ice_servers: stun_servers
            .iter()
            .map(|url| RTCIceServer {
                urls: vec![url.clone()],
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

fn register_callbacks(
    peer_connection: &RTCPeerConnection,
    on_event: PeerEventCallback,
    tracks: TrackRegistry,
) {
    let on_candidate = on_event.clone();
    peer_connection.on_ice_candidate(Box::new(move |candidate: Option<RTCIceCandidate>| {
        match candidate {
            Some(c) => match c.to_json() {
                Ok(init) => on_candidate(PeerEvent::IceCandidate(Some(to_candidate(init)))),
                Err(e) => warn!("Failed to serialize local ICE candidate: {}", e),
            },
            None => on_candidate(PeerEvent::IceCandidate(None)),
        }
        Box::pin(async {})
    }));

    let on_state = on_event.clone();
    peer_connection.on_peer_connection_state_change(Box::new(
        move |state: RTCPeerConnectionState| {
            debug!("Peer connection state: {}", state);
            on_state(PeerEvent::StateChanged(map_state(state)));
            Box::pin(async {})
        },
    ));

    peer_connection.on_track(Box::new(
        move |track: Arc<TrackRemote>,
              _receiver: Arc<RTCRtpReceiver>,
              _transceiver: Arc<RTCRtpTransceiver>| {
            let remote = RemoteTrack {
                id: track.id(),
                stream_id: track.stream_id(),
                kind: map_kind(track.kind()),
                codec: track.codec().capability.mime_type,
            };
            info!(
                "Remote track {} ({:?}, {}) on stream {}",
                remote.id, remote.kind, remote.codec, remote.stream_id
            );
            // Registered before the event so the sink can find it on attach
            tracks.insert(remote.id.clone(), track);
            on_event(PeerEvent::Track(remote));
            Box::pin(async {})
        },
    ));
}

pub(crate) fn to_candidate(init: RTCIceCandidateInit) -> IceCandidate {
    IceCandidate {
        candidate: init.candidate,
        sdp_mid: init.sdp_mid,
        sdp_m_line_index: init.sdp_mline_index,
    }
}

pub(crate) fn map_state(state: RTCPeerConnectionState) -> PeerState {
    match state {
        RTCPeerConnectionState::Connecting => PeerState::Connecting,
        RTCPeerConnectionState::Connected => PeerState::Connected,
        RTCPeerConnectionState::Disconnected => PeerState::Disconnected,
        RTCPeerConnectionState::Failed => PeerState::Failed,
        RTCPeerConnectionState::Closed => PeerState::Closed,
        _ => PeerState::New,
    }
}

pub(crate) fn map_kind(kind: RTPCodecType) -> MediaKind {
    match kind {
        RTPCodecType::Audio => MediaKind::Audio,
        RTPCodecType::Video => MediaKind::Video,
        _ => MediaKind::Unknown,
    }
}

/// A single webrtc-rs peer connection on the answering side.
pub struct WebRtcPeer {
    peer_connection: Arc<RTCPeerConnection>,
    // Answer produced by create_answer, reused when the same SDP is applied
    last_answer: Mutex<Option<RTCSessionDescription>>,
}

impl fmt::Debug for WebRtcPeer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebRtcPeer")
            .field("state", &self.peer_connection.connection_state())
            .finish()
    }
}

#[async_trait]
impl PeerConnection for WebRtcPeer {
    async fn set_remote_description(&self, description: SessionDescription) -> Result<(), ApiError> {
        let remote = match description.sdp_type {
            SdpType::Offer => RTCSessionDescription::offer(description.sdp),
            SdpType::Answer => RTCSessionDescription::answer(description.sdp),
            other => {
                return Err(ApiError::InvalidDescription(format!(
                    "Unsupported remote description type: {:?}",
                    other
                )));
            }
        }
        .map_err(|e| map_negotiation_error("Invalid remote SDP", e))?;

        self.peer_connection
            .set_remote_description(remote)
            .await
            .map_err(|e| map_negotiation_error("Failed to set remote description", e))
    }

    async fn create_answer(&self) -> Result<SessionDescription, ApiError> {
        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .map_err(|e| map_negotiation_error("Failed to create answer", e))?;
        let description = SessionDescription::answer(answer.sdp.clone());
        *self.last_answer.lock() = Some(answer);
        Ok(description)
    }

    async fn set_local_description(&self, description: SessionDescription) -> Result<(), ApiError> {
        if description.sdp_type != SdpType::Answer {
            return Err(ApiError::InvalidDescription(format!(
                "Local description must be an answer, got {:?}",
                description.sdp_type
            )));
        }

        let cached = self
            .last_answer
            .lock()
            .take()
            .filter(|answer| answer.sdp == description.sdp);
        let local = match cached {
            Some(answer) => answer,
            None => RTCSessionDescription::answer(description.sdp)
                .map_err(|e| map_negotiation_error("Invalid local SDP", e))?,
        };

        self.peer_connection
            .set_local_description(local)
            .await
            .map_err(|e| map_negotiation_error("Failed to set local description", e))
    }

    async fn close(&self) -> Result<(), ApiError> {
        self.peer_connection
            .close()
            .await
            .map_err(|e| map_setup_error("Failed to close peer connection", e))
    }
}
