//! # Janus Transport
//!
//! This crate handles the low-level details of establishing and managing
//! the WebSocket connection to the Janus gateway, including negotiation of the
//! `janus-protocol` subprotocol.
//!
//! It defines the `Transport` trait for abstracting the communication
//! method and provides the `ConnectionActor` for managing the lifecycle
//! and message flow over a single connection within the actor system.

pub mod connection;
pub mod error;
pub mod factory;
pub mod traits;
pub mod types;
#[cfg(feature = "websocket")]
pub mod websocket;

// Re-export key items
pub use connection::{
    CloseConnection, ConnectionActor, ConnectionState, ConnectionStatusUpdate, IncomingMessage,
    SendMessage,
};
pub use error::TransportError;
pub use factory::create_transport;
pub use traits::Transport;
pub use types::{ConnectParams, WebSocketConnectOptions};
