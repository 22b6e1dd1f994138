//! The SubscriberActor drives one VideoRoom subscriber session: it creates the
//! session and the plugin handle, joins the configured feed, answers the
//! gateway's offer and hands the received tracks to the media sink.

use crate::state::SubscriberState;
use actix::prelude::*;
use janus_core::{Config, InternalError};
use janus_interfaces::{
    ApiError, IceCandidate, MediaSink, PeerConnection, PeerConnectionFactory, PeerEvent,
    PeerEventCallback, PeerState, RemoteTrack, SessionDescription, StatusSink,
};
use janus_protocol_handler::{JanusMessage, JanusRequest, Route, RoutedMessage, VIDEOROOM_PLUGIN};
use janus_transport::SendMessage;
use log::{debug, error, info, trace, warn};
use std::sync::Arc;

/// Error code the VideoRoom plugin returns when the requested feed is not
/// being published.
pub const FEED_OFFLINE_ERROR_CODE: i64 = 428;

/// Status prefix shown before the gateway's error text for an offline feed.
pub const FEED_OFFLINE_PREFIX: &str = "GstWPE demo is offline. ";

// --- Messages ---

/// The gateway connection is open; the session may start.
#[derive(Message, Debug)]
#[rtype(result = "()")]
pub struct GatewayConnected;

/// An event reported by the peer connection, re-entering the actor.
#[derive(Message, Debug)]
#[rtype(result = "()")]
pub struct PeerEventMsg(pub PeerEvent);

/// Stops the keepalive timer, closes the peer connection and stops the actor.
#[derive(Message, Debug)]
#[rtype(result = "()")]
pub struct StopSession;

/// Snapshot of the session for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub state: SubscriberState,
    pub session_id: Option<u64>,
    pub handle_id: Option<u64>,
    pub has_peer: bool,
}

#[derive(Message, Debug)]
#[rtype(result = "SessionInfo")]
pub struct GetSessionInfo;

/// Sent to the observer (the supervisor) on every state transition.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct SubscriberStateChanged(pub SubscriberState);

// --- Actor ---

pub struct SubscriberActor {
    config: Config,
    // Outgoing side of the gateway connection
    connection: Recipient<SendMessage>,
    peer_factory: Arc<dyn PeerConnectionFactory>,
    media_sink: Arc<dyn MediaSink>,
    status_sink: Arc<dyn StatusSink>,
    observer: Option<Recipient<SubscriberStateChanged>>,
    state: SubscriberState,
    session_id: Option<u64>,
    handle_id: Option<u64>,
    peer: Option<Arc<dyn PeerConnection>>,
    // Offer/answer exchange in flight
    negotiating: bool,
    keepalive: Option<SpawnHandle>,
}

impl SubscriberActor {
    pub fn new(
        config: Config,
        connection: Recipient<SendMessage>,
        peer_factory: Arc<dyn PeerConnectionFactory>,
        media_sink: Arc<dyn MediaSink>,
        status_sink: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            config,
            connection,
            peer_factory,
            media_sink,
            status_sink,
            observer: None,
            state: SubscriberState::Idle,
            session_id: None,
            handle_id: None,
            peer: None,
            negotiating: false,
            keepalive: None,
        }
    }

    /// Reports every state transition to `observer`.
    pub fn with_observer(mut self, observer: Recipient<SubscriberStateChanged>) -> Self {
        self.observer = Some(observer);
        self
    }

    fn transition(&mut self, next: SubscriberState) {
        info!("Subscriber state {:?} -> {:?}", self.state, next);
        self.state = next;
        if let Some(observer) = &self.observer {
            observer.do_send(SubscriberStateChanged(next));
        }
    }

    fn send_request(&self, request: JanusRequest, ctx: &mut Context<Self>) {
        let json = match request.to_json() {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize {} request: {}", request.transaction(), e);
                return;
            }
        };
        trace!("Sending request: {}", json);

        let transaction = request.transaction().to_string();
        let send_future = self.connection.send(SendMessage(json));
        ctx.spawn(
            async move {
                match send_future.await {
                    Ok(Ok(())) => trace!("Request '{}' handed to transport.", transaction),
                    Ok(Err(e)) => error!("Transport error sending '{}': {}", transaction, e),
                    Err(e) => error!(
                        "{}",
                        InternalError::Actor(format!("sending '{}': {}", transaction, e))
                    ),
                }
            }
            .into_actor(self),
        );
    }

    /// Rejects a response that does not belong to the current step.
    fn reject(&self, route: Route, message: &JanusMessage) {
        let err = InternalError::UnexpectedMessage {
            state: format!("{:?}", self.state),
            detail: format!("{:?} response {}", route, message.raw),
        };
        warn!("{}", err);
    }

    fn handle_create_session(&mut self, message: JanusMessage, ctx: &mut Context<Self>) {
        let Some(session_id) = message.created_id() else {
            error!("Session creation failed: {}", message.raw);
            return;
        };
        info!("Session created: {}", session_id);
        self.session_id = Some(session_id);
        self.start_keepalive(ctx);
        self.send_request(JanusRequest::attach_videoroom(session_id), ctx);
        self.transition(SubscriberState::HandlePending);
    }

    fn start_keepalive(&mut self, ctx: &mut Context<Self>) {
        let interval = self.config.session.keepalive_interval;
        debug!("Sending keepalives every {:?}", interval);
        let handle = ctx.run_interval(interval, |act, ctx| {
            if let Some(session_id) = act.session_id {
                act.send_request(JanusRequest::keepalive(session_id), ctx);
            }
        });
        self.keepalive = Some(handle);
    }

    fn handle_create_handle(&mut self, message: JanusMessage, ctx: &mut Context<Self>) {
        if self.session_id.is_none() || self.handle_id.is_some() {
            self.reject(Route::CreateHandle, &message);
            return;
        }
        let Some(handle_id) = message.created_id() else {
            error!("Plugin attach failed: {}", message.raw);
            return;
        };
        info!("Attached to {} with handle {}", VIDEOROOM_PLUGIN, handle_id);
        self.handle_id = Some(handle_id);
        self.create_peer(ctx);
    }

    /// Builds the peer connection, then joins the feed once it exists.
    fn create_peer(&mut self, ctx: &mut Context<Self>) {
        let factory = self.peer_factory.clone();
        let stun_servers = self.config.ice.stun_servers.clone();
        let addr = ctx.address();
        let on_event: PeerEventCallback = Arc::new(move |event| addr.do_send(PeerEventMsg(event)));

        ctx.spawn(
            async move { factory.create(&stun_servers, on_event).await }
                .into_actor(self)
                .map(|result, act, ctx| match result {
                    Ok(peer) => {
                        act.peer = Some(peer);
                        act.send_join(ctx);
                    }
                    Err(e) => error!("Failed to create peer connection: {}", e),
                }),
        );
    }

    fn send_join(&mut self, ctx: &mut Context<Self>) {
        let (Some(session_id), Some(handle_id)) = (self.session_id, self.handle_id) else {
            error!("Cannot join without session and handle ids.");
            return;
        };
        let room = self.config.videoroom.room;
        let feed = self.config.videoroom.feed;
        info!("Joining room {} as subscriber to feed {}", room, feed);
        self.send_request(
            JanusRequest::join_subscriber(session_id, handle_id, room, feed),
            ctx,
        );
        self.transition(SubscriberState::JoinPending);
    }

    fn handle_join_subscriber(&mut self, message: JanusMessage, ctx: &mut Context<Self>) {
        if self.negotiating {
            self.reject(Route::JoinSubscriber, &message);
            return;
        }
        match message.jsep.clone() {
            Some(offer) => self.negotiate(offer, ctx),
            None => self.show_join_error(&message),
        }
    }

    fn show_join_error(&mut self, message: &JanusMessage) {
        let code = message.plugin_error_code();
        let text = message
            .plugin_error()
            .map(str::to_owned)
            .or_else(|| message.error.as_ref().map(|e| e.reason.clone()))
            .unwrap_or_default();
        let err = InternalError::Protocol {
            code,
            message: text.clone(),
        };
        warn!("Join refused: {}", err);

        if code == Some(FEED_OFFLINE_ERROR_CODE) {
            self.status_sink.set_text(FEED_OFFLINE_PREFIX);
        }
        self.status_sink.append_text(&text);
        self.transition(SubscriberState::Halted);
    }

    /// Applies the offer, answers it and sends the answer with `start`.
    fn negotiate(&mut self, offer: SessionDescription, ctx: &mut Context<Self>) {
        let Some(peer) = self.peer.clone() else {
            error!("Received an offer without a peer connection.");
            return;
        };
        self.negotiating = true;

        ctx.spawn(
            async move {
                peer.set_remote_description(offer).await?;
                let answer = peer.create_answer().await?;
                peer.set_local_description(answer.clone()).await?;
                Ok::<_, ApiError>(answer)
            }
            .into_actor(self)
            .map(|result, act, ctx| {
                act.negotiating = false;
                match result {
                    Ok(answer) => act.send_answer(answer, ctx),
                    Err(e) => error!("{}", InternalError::PeerConnection(e.to_string())),
                }
            }),
        );
    }

    fn send_answer(&mut self, answer: SessionDescription, ctx: &mut Context<Self>) {
        let (Some(session_id), Some(handle_id)) = (self.session_id, self.handle_id) else {
            error!("Cannot send answer without session and handle ids.");
            return;
        };
        self.send_request(JanusRequest::start(session_id, handle_id, answer), ctx);
        if self.state == SubscriberState::JoinPending {
            self.transition(SubscriberState::Publishing);
        }
    }

    fn handle_publish(&mut self, message: JanusMessage, ctx: &mut Context<Self>) {
        let (Some(peer), Some(description)) = (self.peer.clone(), message.jsep.clone()) else {
            info!("Ignoring publish message: {}", message.raw);
            return;
        };
        ctx.spawn(
            async move {
                if let Err(e) = peer.set_remote_description(description).await {
                    error!("Failed to apply published description: {}", e);
                }
            }
            .into_actor(self),
        );
    }

    fn forward_candidate(&self, candidate: Option<IceCandidate>, ctx: &mut Context<Self>) {
        let (Some(session_id), Some(handle_id)) = (self.session_id, self.handle_id) else {
            warn!("Dropping ICE candidate gathered before the handle exists.");
            return;
        };
        if candidate.is_none() {
            debug!("ICE gathering complete.");
        }
        self.send_request(JanusRequest::trickle(session_id, handle_id, candidate), ctx);
    }

    fn play_track(&mut self, track: RemoteTrack) {
        if let Err(e) = self.media_sink.attach(&track) {
            error!("Failed to attach track {}: {}", track.id, e);
            return;
        }
        if let Err(e) = self.media_sink.play(&track.id) {
            error!("Failed to play track {}: {}", track.id, e);
            return;
        }
        if self.state == SubscriberState::Publishing {
            self.transition(SubscriberState::Playing);
        }
    }
}

impl Actor for SubscriberActor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Context<Self>) {
        info!(
            "SubscriberActor started (room {}, feed {}).",
            self.config.videoroom.room, self.config.videoroom.feed
        );
    }

    fn stopping(&mut self, _ctx: &mut Context<Self>) -> Running {
        info!("SubscriberActor stopping in state {:?}.", self.state);
        Running::Stop
    }
}

// --- Message Handlers ---

impl Handler<GatewayConnected> for SubscriberActor {
    type Result = ();

    fn handle(&mut self, _msg: GatewayConnected, ctx: &mut Context<Self>) {
        if self.state != SubscriberState::Idle {
            warn!("Gateway connected again in state {:?}, ignoring.", self.state);
            return;
        }
        self.send_request(JanusRequest::create_session(), ctx);
        self.transition(SubscriberState::SessionPending);
    }
}

impl Handler<RoutedMessage> for SubscriberActor {
    type Result = ();

    fn handle(&mut self, msg: RoutedMessage, ctx: &mut Context<Self>) {
        let RoutedMessage { route, message } = msg;
        if !self.state.accepts(route) {
            self.reject(route, &message);
            return;
        }
        match route {
            Route::CreateSession => self.handle_create_session(message, ctx),
            Route::CreateHandle => self.handle_create_handle(message, ctx),
            Route::JoinSubscriber => self.handle_join_subscriber(message, ctx),
            Route::Publish => self.handle_publish(message, ctx),
            Route::Ack => trace!("Ack: {}", message.raw),
        }
    }
}

impl Handler<PeerEventMsg> for SubscriberActor {
    type Result = ();

    fn handle(&mut self, msg: PeerEventMsg, ctx: &mut Context<Self>) {
        match msg.0 {
            PeerEvent::IceCandidate(candidate) => self.forward_candidate(candidate, ctx),
            PeerEvent::Track(track) => self.play_track(track),
            PeerEvent::StateChanged(PeerState::Failed) => error!("Peer connection failed."),
            PeerEvent::StateChanged(state) => info!("Peer connection state: {:?}", state),
        }
    }
}

impl Handler<GetSessionInfo> for SubscriberActor {
    type Result = MessageResult<GetSessionInfo>;

    fn handle(&mut self, _msg: GetSessionInfo, _ctx: &mut Context<Self>) -> Self::Result {
        MessageResult(SessionInfo {
            state: self.state,
            session_id: self.session_id,
            handle_id: self.handle_id,
            has_peer: self.peer.is_some(),
        })
    }
}

impl Handler<StopSession> for SubscriberActor {
    type Result = ();

    fn handle(&mut self, _msg: StopSession, ctx: &mut Context<Self>) {
        if let Some(handle) = self.keepalive.take() {
            ctx.cancel_future(handle);
        }
        if let Some(peer) = self.peer.take() {
            // Detached so the close outlives the actor
            actix::spawn(async move {
                if let Err(e) = peer.close().await {
                    warn!("Error closing peer connection: {}", e);
                }
            });
        }
        ctx.stop();
    }
}
