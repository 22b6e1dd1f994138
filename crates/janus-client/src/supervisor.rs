//! The main Supervisor actor for a subscriber session.

use crate::state::SubscriberState;
use crate::subscriber::{GatewayConnected, StopSession, SubscriberActor, SubscriberStateChanged};
use actix::prelude::*;
use futures_channel::oneshot;
use janus_core::Config;
use janus_interfaces::{MediaSink, PeerConnectionFactory, StatusSink};
use janus_protocol_handler::RouterActor;
use janus_transport::{
    CloseConnection, ConnectParams, ConnectionActor, ConnectionState, ConnectionStatusUpdate,
    TransportError,
};
use log::{debug, error, info, warn};
use std::sync::Arc;

/// How a session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEnd {
    /// The plugin refused the join; the reason is in the status sink.
    Halted,
    /// The gateway connection closed (`None`) or failed.
    ConnectionClosed(Option<TransportError>),
    /// `Shutdown` was requested.
    Shutdown,
}

/// Collaborators handed to the subscriber.
pub struct SessionSinks {
    pub peer_factory: Arc<dyn PeerConnectionFactory>,
    pub media_sink: Arc<dyn MediaSink>,
    pub status_sink: Arc<dyn StatusSink>,
}

/// Addresses of the supervised actors.
#[derive(Clone)]
pub struct SessionActors {
    pub supervisor: Addr<SupervisorActor>,
    pub connection: Addr<ConnectionActor>,
    pub router: Addr<RouterActor>,
    pub subscriber: Addr<SubscriberActor>,
}

// --- Supervisor Messages ---

/// Closes the connection and stops the subscriber.
#[derive(Message, Debug)]
#[rtype(result = "()")]
pub struct Shutdown;

/// The top-level supervisor: owns the wiring between the connection, the
/// router and the subscriber, starts the session once the socket is open and
/// reports how the session ended.
pub struct SupervisorActor {
    connection: Addr<ConnectionActor>,
    subscriber: Addr<SubscriberActor>,
    last_state: SubscriberState,
    finished: Option<oneshot::Sender<SessionEnd>>,
}

impl SupervisorActor {
    /// Starts the supervisor together with the actors it supervises.
    ///
    /// The router forwards to the subscriber and the subscriber sends through
    /// the connection, which reports back here. The supervisor and subscriber
    /// contexts are created first so their addresses exist before any actor runs.
    pub fn start_session(
        config: Config,
        sinks: SessionSinks,
        finished: oneshot::Sender<SessionEnd>,
    ) -> SessionActors {
        let params = ConnectParams::from_config(&config);

        let supervisor_ctx = Context::<SupervisorActor>::new();
        let supervisor = supervisor_ctx.address();
        let subscriber_ctx = Context::<SubscriberActor>::new();

        let router = RouterActor::new(subscriber_ctx.address().recipient()).start();
        let connection = ConnectionActor::new(
            params,
            router.clone().recipient(),
            supervisor.clone().recipient(),
        )
        .start();

        let subscriber = subscriber_ctx.run(
            SubscriberActor::new(
                config,
                connection.clone().recipient(),
                sinks.peer_factory,
                sinks.media_sink,
                sinks.status_sink,
            )
            .with_observer(supervisor.clone().recipient()),
        );

        supervisor_ctx.run(SupervisorActor {
            connection: connection.clone(),
            subscriber: subscriber.clone(),
            last_state: SubscriberState::Idle,
            finished: Some(finished),
        });

        SessionActors {
            supervisor,
            connection,
            router,
            subscriber,
        }
    }

    fn finish(&mut self, end: SessionEnd) {
        if let Some(tx) = self.finished.take() {
            info!("Session finished: {:?}", end);
            if tx.send(end).is_err() {
                debug!("Nobody is waiting for the session outcome.");
            }
        }
    }
}

impl Actor for SupervisorActor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!("SupervisorActor started.");
    }

    fn stopping(&mut self, _ctx: &mut Context<Self>) -> Running {
        info!("SupervisorActor stopping (subscriber state {:?}).", self.last_state);
        self.finish(SessionEnd::Shutdown);
        Running::Stop
    }
}

// --- Message Handlers ---

// Handler for status updates from ConnectionActor
impl Handler<ConnectionStatusUpdate> for SupervisorActor {
    type Result = ();

    fn handle(&mut self, msg: ConnectionStatusUpdate, _ctx: &mut Context<Self>) {
        info!("Supervisor received ConnectionStatusUpdate: {:?}", msg.0);
        match msg.0 {
            ConnectionState::Connected => {
                self.subscriber.do_send(GatewayConnected);
            }
            ConnectionState::Disconnected(err) => {
                match &err {
                    Some(e) => warn!("Gateway connection lost: {}", e),
                    None => info!("Gateway connection closed."),
                }
                self.subscriber.do_send(StopSession);
                self.finish(SessionEnd::ConnectionClosed(err));
            }
            ConnectionState::FailedToStart(err) => {
                error!("Gateway connection failed to start: {}", err);
                self.subscriber.do_send(StopSession);
                self.finish(SessionEnd::ConnectionClosed(Some(err)));
            }
            other => debug!("Supervisor handling state: {:?}", other),
        }
    }
}

impl Handler<SubscriberStateChanged> for SupervisorActor {
    type Result = ();

    fn handle(&mut self, msg: SubscriberStateChanged, _ctx: &mut Context<Self>) {
        self.last_state = msg.0;
        if msg.0.is_halted() {
            self.finish(SessionEnd::Halted);
        } else if msg.0 == SubscriberState::Playing {
            info!("Media is playing.");
        }
    }
}

impl Handler<Shutdown> for SupervisorActor {
    type Result = ();

    fn handle(&mut self, _msg: Shutdown, ctx: &mut Context<Self>) {
        info!("Supervisor shutting down the session.");
        self.subscriber.do_send(StopSession);
        self.connection.do_send(CloseConnection);
        self.finish(SessionEnd::Shutdown);
        ctx.stop();
    }
}
