//! # Janus Core
//!
//! Configuration, shared error types and logging setup for the VideoRoom
//! subscriber workspace.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{Config, DEFAULT_FEED_ID, DEFAULT_ROOM_ID, load_config, load_config_from};
pub use error::{CoreError, InternalError};
