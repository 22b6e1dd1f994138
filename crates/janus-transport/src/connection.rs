use crate::error::TransportError;
use crate::factory::create_transport;
use crate::traits::Transport;
use crate::types::ConnectParams;
use actix::prelude::*;
use log::{error, info, trace, warn};
use tokio::sync::mpsc;

/// Actor responsible for managing the single WebSocket connection to the gateway.
///
/// It handles the connection lifecycle (connecting, disconnecting), runs
/// the read/write loop for the transport, forwards incoming messages,
/// accepts outgoing messages, and reports status changes to its supervisor.
pub struct ConnectionActor {
    params: ConnectParams,
    state: ConnectionState,
    // Recipient for received text frames (the router)
    message_handler: Recipient<IncomingMessage>,
    // Channel for sending outgoing messages to the write side of the loop
    outgoing_tx: Option<mpsc::Sender<String>>,
    // Supervisor for reporting state changes
    supervisor: Recipient<ConnectionStatusUpdate>,
    // Handle to the connection task
    connection_task: Option<SpawnHandle>,
}

/// Why the read/write loop ended.
enum LoopExit {
    Closed,
    LocalClose,
    Failed(TransportError),
}

impl ConnectionActor {
    pub fn new(
        params: ConnectParams,
        message_handler: Recipient<IncomingMessage>,
        supervisor: Recipient<ConnectionStatusUpdate>,
    ) -> Self {
        ConnectionActor {
            params,
            state: ConnectionState::Idle,
            message_handler,
            supervisor,
            outgoing_tx: None,
            connection_task: None,
        }
    }

    /// Helper to initiate the connection process.
    fn start_connection_task(&mut self, ctx: &mut Context<Self>) {
        if self.connection_task.is_some()
            || self.state == ConnectionState::Connecting
            || self.state == ConnectionState::Connected
        {
            warn!(
                "Connection task already running or actor in active state ({:?}). Ignoring start request.",
                self.state
            );
            return;
        }

        self.state = ConnectionState::Connecting;
        info!("ConnectionActor state -> Connecting ({})", self.params.url);
        self.notify_supervisor(self.state.clone());

        let transport_result = create_transport(&self.params);

        let addr = ctx.address();
        let message_handler = self.message_handler.clone();
        let connect_timeout = self.params.connection_timeout;

        let (outgoing_tx, mut outgoing_rx) = mpsc::channel::<String>(self.params.outgoing_buffer);
        self.outgoing_tx = Some(outgoing_tx);

        let connection_fut = async move {
            let transport = match transport_result {
                Ok(transport) => transport,
                Err(e) => {
                    error!("Failed to create transport: {}", e);
                    addr.do_send(TransportEvent::FailedToStart(e));
                    return;
                }
            };

            info!("Attempting to connect transport...");
            let mut transport =
                match tokio::time::timeout(connect_timeout, Self::connect_internal(transport)).await
                {
                    Ok(Ok(transport)) => transport,
                    Ok(Err(e)) => {
                        error!("Transport connect error: {}", e);
                        addr.do_send(TransportEvent::Disconnected(Some(e)));
                        return;
                    }
                    Err(_) => {
                        error!("Transport connection timed out after {:?}", connect_timeout);
                        addr.do_send(TransportEvent::Disconnected(Some(TransportError::Timeout)));
                        return;
                    }
                };

            info!("Transport connected successfully.");
            addr.do_send(TransportEvent::Connected);

            // === Combined Read/Write Loop ===
            let exit = loop {
                tokio::select! {
                    maybe_msg_to_send = outgoing_rx.recv() => {
                        match maybe_msg_to_send {
                            Some(msg_to_send) => {
                                if let Err(e) = transport.send(&msg_to_send).await {
                                    error!("Transport send error: {}. Disconnecting.", e);
                                    break LoopExit::Failed(e);
                                }
                            }
                            None => {
                                info!("Outgoing message channel closed, ending connection loop.");
                                break LoopExit::LocalClose;
                            }
                        }
                    },

                    receive_result = transport.receive() => {
                        match receive_result {
                            Some(Ok(msg)) => {
                                trace!("Received message: {}", msg);
                                message_handler.do_send(IncomingMessage(msg));
                            }
                            Some(Err(e)) => {
                                error!("Transport receive error: {}. Disconnecting.", e);
                                break LoopExit::Failed(e);
                            }
                            None => {
                                info!("Transport connection closed by remote.");
                                break LoopExit::Closed;
                            }
                        }
                    }
                }
            };

            // Close the socket before reporting, the actor stops on the report.
            if let Err(e) = transport.disconnect().await {
                warn!("Error during transport disconnect after loop exit: {}", e);
            }
            match exit {
                LoopExit::Closed | LoopExit::LocalClose => {
                    addr.do_send(TransportEvent::Disconnected(None))
                }
                LoopExit::Failed(e) => addr.do_send(TransportEvent::Disconnected(Some(e))),
            }
            info!("Connection task finished.");
        };

        self.connection_task = Some(ctx.spawn(connection_fut.into_actor(self)));
    }

    fn notify_supervisor(&self, state: ConnectionState) {
        self.supervisor.do_send(ConnectionStatusUpdate(state));
    }

    fn close_outgoing_channel(&mut self) {
        // Dropping the sender ends the loop, which closes the socket
        if self.outgoing_tx.take().is_some() {
            info!("Outgoing message channel closed.");
        }
    }

    async fn connect_internal(
        mut transport: Box<dyn Transport>,
    ) -> Result<Box<dyn Transport>, TransportError> {
        transport.connect().await?;
        Ok(transport)
    }
}

/// Represents the lifecycle state of the connection managed by `ConnectionActor`.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Connected,
    Disconnecting,
    Disconnected(Option<TransportError>), // Some(err) for error, None for graceful close
    FailedToStart(TransportError),        // Initial creation/startup failure
}

impl ConnectionState {
    /// True once the connection can no longer carry messages.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ConnectionState::Disconnected(_) | ConnectionState::FailedToStart(_)
        )
    }
}

// --- Actor Messages ---

/// Message to send a string out via the connection.
#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<(), TransportError>")]
pub struct SendMessage(pub String);

/// Message received from the transport, to be forwarded to the designated handler.
#[derive(Message, Debug)]
#[rtype(result = "()")]
pub struct IncomingMessage(pub String);

/// Asks the actor to close the socket. The actor stops once the loop has ended.
#[derive(Message, Debug)]
#[rtype(result = "()")]
pub struct CloseConnection;

/// Internal message used by the connection task to update the actor's state.
#[derive(Message)]
#[rtype(result = "()")]
enum TransportEvent {
    Connected,
    Disconnected(Option<TransportError>),
    FailedToStart(TransportError),
}

/// Message sent *to* the supervisor to report status changes.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct ConnectionStatusUpdate(pub ConnectionState);

// --- Actor Implementation ---

impl Actor for ConnectionActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!("ConnectionActor starting for {}", self.params.url);
        // Automatically attempt connection on start
        self.start_connection_task(ctx);
    }

    fn stopping(&mut self, _ctx: &mut Self::Context) -> Running {
        info!("ConnectionActor stopping.");
        self.close_outgoing_channel();
        self.connection_task = None;

        if !self.state.is_terminal() {
            self.state = ConnectionState::Disconnecting;
            info!("ConnectionActor state -> Disconnecting");
            self.notify_supervisor(self.state.clone());
        }
        Running::Stop
    }
}

// --- Message Handlers ---

impl Handler<TransportEvent> for ConnectionActor {
    type Result = ();

    fn handle(&mut self, msg: TransportEvent, ctx: &mut Context<Self>) {
        let new_state = match msg {
            TransportEvent::Connected => ConnectionState::Connected,
            TransportEvent::Disconnected(err_opt) => ConnectionState::Disconnected(err_opt),
            TransportEvent::FailedToStart(err) => ConnectionState::FailedToStart(err),
        };

        if self.state == new_state {
            trace!("Ignoring redundant state update: {:?}", new_state);
            return;
        }

        info!(
            "Connection state changing from {:?} -> {:?}",
            self.state, new_state
        );
        self.state = new_state;
        self.notify_supervisor(self.state.clone());

        if self.state.is_terminal() {
            warn!("ConnectionActor stopping due to state: {:?}", self.state);
            self.close_outgoing_channel();
            ctx.stop();
        }
    }
}

impl Handler<CloseConnection> for ConnectionActor {
    type Result = ();

    fn handle(&mut self, _msg: CloseConnection, ctx: &mut Context<Self>) {
        match self.state {
            ConnectionState::Connected => {
                self.state = ConnectionState::Disconnecting;
                self.notify_supervisor(self.state.clone());
                self.close_outgoing_channel();
            }
            // Nothing to close gracefully yet
            _ => ctx.stop(),
        }
    }
}

// Handler for sending messages *out* through the connection
impl Handler<SendMessage> for ConnectionActor {
    type Result = ResponseFuture<Result<(), TransportError>>;

    fn handle(&mut self, msg: SendMessage, _ctx: &mut Context<Self>) -> Self::Result {
        let current_state = self.state.clone();
        let maybe_tx = self.outgoing_tx.clone();

        Box::pin(async move {
            match (current_state, maybe_tx) {
                (ConnectionState::Connected, Some(tx)) => tx.send(msg.0).await.map_err(|e| {
                    error!("Outgoing message channel send error: {}", e);
                    TransportError::SendFailed(format!("Message channel send error: {}", e))
                }),
                (ConnectionState::Connected, None) => {
                    error!("Attempted to send message but outgoing channel is missing (state: Connected).");
                    Err(TransportError::NotConnected("Internal channel missing".into()))
                }
                (state, _) => {
                    warn!(
                        "Attempted to send message while not connected (State: {:?})",
                        state
                    );
                    Err(TransportError::NotConnected(format!(
                        "Current state: {:?}",
                        state
                    )))
                }
            }
        })
    }
}
