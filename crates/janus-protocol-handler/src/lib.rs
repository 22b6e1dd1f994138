//! # Janus Protocol Handler
//!
//! Wire types for the Janus gateway JSON protocol, the builders for every
//! request the subscriber sends, and the actor that dispatches inbound
//! messages by their `janus` kind or `transaction` tag.

pub mod messages;
pub mod requests;
pub mod router_actor;
pub mod routing;

pub use messages::{GetRouterStats, JanusMessage, RoutedMessage, RouterStats};
pub use requests::{JanusRequest, VIDEOROOM_PLUGIN, VideoRoomRequest, transaction};
pub use router_actor::RouterActor;
pub use routing::{Route, RoutingTable};
