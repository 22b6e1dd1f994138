use crate::common::{PeerEvent, SessionDescription};
use crate::error::ApiError;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// Callback through which a peer connection reports candidates, tracks and
/// state changes. Invoked from the WebRTC implementation's own tasks.
pub type PeerEventCallback = Arc<dyn Fn(PeerEvent) + Send + Sync>;

/// A single WebRTC peer connection, answering side.
///
/// The signaling session drives it through exactly one offer/answer exchange;
/// everything else (ICE, DTLS, RTP) is up to the implementation.
#[async_trait]
pub trait PeerConnection: Send + Sync + Debug {
    /// Applies the gateway's description (an offer).
    ///
    /// # Returns
    /// - `Ok(())` once the description is applied.
    /// - `Err(ApiError)` if the SDP is invalid or cannot be applied in the current state.
    async fn set_remote_description(&self, description: SessionDescription) -> Result<(), ApiError>;

    /// Generates an answer for the applied remote offer.
    async fn create_answer(&self) -> Result<SessionDescription, ApiError>;

    /// Applies a locally generated description (the answer).
    async fn set_local_description(&self, description: SessionDescription) -> Result<(), ApiError>;

    /// Tears the connection down. The session never calls this on its own.
    async fn close(&self) -> Result<(), ApiError>;
}

/// Builds peer connections for a handle.
#[async_trait]
pub trait PeerConnectionFactory: Send + Sync {
    /// Creates a peer connection using the given STUN server URLs and registers
    /// `on_event` for candidate, track and state notifications before returning.
    async fn create(
        &self,
        stun_servers: &[String],
        on_event: PeerEventCallback,
    ) -> Result<Arc<dyn PeerConnection>, ApiError>;
}
