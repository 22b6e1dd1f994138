//! # Janus Interfaces
//!
//! The seams between the signaling session and the media side: the peer
//! connection traits (`PeerConnection`, `PeerConnectionFactory`), the sinks that
//! stand in for the page's video and message elements (`MediaSink`,
//! `StatusSink`), the SDP/ICE value types exchanged over the wire, and the
//! `ApiError` those implementations return.

mod common;
mod error;
mod peer;
mod sink;

pub use common::*;
pub use error::*;
pub use peer::*;
pub use sink::*;
