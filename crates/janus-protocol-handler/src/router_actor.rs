//! The RouterActor parses raw gateway frames and dispatches them through the
//! routing table.

use crate::messages::{GetRouterStats, JanusMessage, RoutedMessage, RouterStats};
use crate::routing::RoutingTable;
use actix::prelude::*;
use janus_transport::IncomingMessage;
use log::{debug, error, info, trace};

pub struct RouterActor {
    table: RoutingTable,
    // Where matched messages are forwarded (the subscriber)
    handler: Recipient<RoutedMessage>,
    stats: RouterStats,
}

impl RouterActor {
    pub fn new(handler: Recipient<RoutedMessage>) -> Self {
        Self::with_table(RoutingTable::default(), handler)
    }

    pub fn with_table(table: RoutingTable, handler: Recipient<RoutedMessage>) -> Self {
        Self {
            table,
            handler,
            stats: RouterStats::default(),
        }
    }

    /// Default receiver for messages no route claims.
    fn log_unrouted(&mut self, message: &JanusMessage) {
        self.stats.unrouted += 1;
        info!("Unhandled gateway message: {}", message.raw);
    }
}

impl Actor for RouterActor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Context<Self>) {
        info!("RouterActor started with {} routes.", self.table.len());
    }

    fn stopping(&mut self, _ctx: &mut Context<Self>) -> Running {
        info!("RouterActor stopping. {:?}", self.stats);
        Running::Stop
    }
}

// Handler for IncomingMessage from ConnectionActor
impl Handler<IncomingMessage> for RouterActor {
    type Result = ();

    fn handle(&mut self, msg: IncomingMessage, _ctx: &mut Context<Self>) {
        trace!("RouterActor received raw message: {}", msg.0);
        let message = match JanusMessage::parse(&msg.0) {
            Ok(message) => message,
            Err(e) => {
                self.stats.malformed += 1;
                error!("Failed to parse incoming message: {}. Raw: {}", e, msg.0);
                return;
            }
        };

        let Some(route) = self.table.resolve(&message) else {
            self.log_unrouted(&message);
            return;
        };

        debug!(
            "Routing {:?}/{:?} -> {:?}",
            message.janus, message.transaction, route
        );
        self.stats.routed += 1;
        self.handler.do_send(RoutedMessage { route, message });
    }
}

impl Handler<GetRouterStats> for RouterActor {
    type Result = MessageResult<GetRouterStats>;

    fn handle(&mut self, _msg: GetRouterStats, _ctx: &mut Context<Self>) -> Self::Result {
        MessageResult(self.stats)
    }
}
