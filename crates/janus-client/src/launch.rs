//! Session launching logic.

use crate::error::ClientError;
use crate::subscriber::{GetSessionInfo, SessionInfo};
use crate::supervisor::{SessionActors, SessionEnd, SessionSinks, Shutdown, SupervisorActor};
use actix::prelude::*;
use futures_channel::oneshot;
use janus_core::config::{self, Config};
use janus_core::logging;
use janus_interfaces::{MediaSink, PeerConnectionFactory, StatusSink};
use janus_protocol_handler::{GetRouterStats, RouterStats};
use log::{debug, info, warn};
use std::sync::Arc;

/// A running subscriber session.
pub struct Subscription {
    actors: SessionActors,
    finished: oneshot::Receiver<SessionEnd>,
}

impl Subscription {
    /// Current state and ids of the subscriber.
    pub async fn session_info(&self) -> Result<SessionInfo, ClientError> {
        self.actors
            .subscriber
            .send(GetSessionInfo)
            .await
            .map_err(|e| ClientError::SupervisorError(format!("Subscriber unreachable: {}", e)))
    }

    /// Dispatch counters of the router.
    pub async fn router_stats(&self) -> Result<RouterStats, ClientError> {
        self.actors
            .router
            .send(GetRouterStats)
            .await
            .map_err(|e| ClientError::SupervisorError(format!("Router unreachable: {}", e)))
    }

    /// Resolves once the session is over.
    pub async fn finished(&mut self) -> SessionEnd {
        (&mut self.finished).await.unwrap_or(SessionEnd::Shutdown)
    }

    /// Closes the gateway connection and stops the session.
    pub async fn shutdown(self) -> Result<(), ClientError> {
        self.actors
            .supervisor
            .send(Shutdown)
            .await
            .map_err(|e| ClientError::SupervisorError(format!("Mailbox error on shutdown: {}", e)))
    }

    pub fn actors(&self) -> &SessionActors {
        &self.actors
    }
}

/// Starts a subscriber session against the gateway described by `config`.
///
/// This is the primary entry point. It must be called from within a running
/// actix system.
///
/// # Arguments
/// * `config` - Optional pre-loaded configuration. If None, calls `load_config()`.
/// * `peer_factory` - Builds the WebRTC peer connection once the handle exists.
/// * `media_sink` - Receives the remote tracks.
/// * `status_sink` - Receives user-facing error text.
pub async fn launch(
    config: Option<Config>,
    peer_factory: Arc<dyn PeerConnectionFactory>,
    media_sink: Arc<dyn MediaSink>,
    status_sink: Arc<dyn StatusSink>,
) -> Result<Subscription, ClientError> {
    // 1. Load configuration if not provided
    let cfg = match config {
        Some(c) => c,
        None => config::load_config().map_err(ClientError::ConfigError)?,
    };

    // 2. Setup logging
    if let Err(e) = logging::setup_logging(&cfg.global.log_level) {
        warn!("Logging not initialized here: {}", e);
    }

    if System::try_current().is_none() {
        return Err(ClientError::ActorSystemError(
            "launch must run inside an actix system".into(),
        ));
    }

    info!(
        "Janus subscriber starting: {} (room {}, feed {})",
        cfg.gateway.url(),
        cfg.videoroom.room,
        cfg.videoroom.feed
    );
    debug!("Loaded configuration: {:?}", cfg);

    // 3. Start the supervisor, which wires and starts the session actors
    let (tx, rx) = oneshot::channel();
    let actors = SupervisorActor::start_session(
        cfg,
        SessionSinks {
            peer_factory,
            media_sink,
            status_sink,
        },
        tx,
    );
    info!("Session actors started.");

    Ok(Subscription {
        actors,
        finished: rx,
    })
}
