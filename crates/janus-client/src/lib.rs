//! # Janus Client Library
//!
//! This crate provides the main entry point and orchestration logic for a
//! Janus VideoRoom subscriber. It ties together the interface, core,
//! transport and protocol handling crates.
//!
//! Users call [`launch`] with a peer connection factory and the media and
//! status sinks, then wait on the returned [`Subscription`].

// Re-export the seams users implement or pick an implementation of
pub use janus_interfaces::{
    ApiError, MediaSink, PeerConnection, PeerConnectionFactory, PeerEvent, StatusSink,
};

// Re-export core types if needed by users (e.g. Config for advanced setup)
pub use janus_core::{Config, DEFAULT_FEED_ID, DEFAULT_ROOM_ID};

pub use janus_protocol_handler::RouterStats;

mod error;
mod launch;
pub mod state;
pub mod status;
pub mod subscriber;
pub mod supervisor;

pub use error::ClientError;
pub use launch::{Subscription, launch};
pub use state::SubscriberState;
pub use status::LogStatusSink;
pub use subscriber::{SessionInfo, SubscriberActor};
pub use supervisor::{SessionEnd, SupervisorActor};
