//! Maps an inbound message to the handler that owns it.

use crate::messages::JanusMessage;
use crate::requests::transaction;
use std::collections::HashMap;

/// Receivers a gateway message can be dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    CreateSession,
    CreateHandle,
    JoinSubscriber,
    /// Offers pushed by the gateway. Applied as the remote description.
    Publish,
    /// Gateway acknowledgements. Consumed without effect.
    Ack,
}

/// Lookup table from a key (`janus` kind or `transaction` tag) to a route.
///
/// `janus` is consulted first, then `transaction`, so a `{"janus": "ack",
/// "transaction": "join_subscriber"}` lands on [`Route::Ack`] while the
/// plugin event carrying the same transaction reaches the join handler.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    routes: HashMap<&'static str, Route>,
}

impl RoutingTable {
    pub fn empty() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    pub fn with(mut self, key: &'static str, route: Route) -> Self {
        self.routes.insert(key, route);
        self
    }

    /// The route for `message`, or `None` when it should fall through to the
    /// default logger.
    pub fn resolve(&self, message: &JanusMessage) -> Option<Route> {
        [message.janus.as_deref(), message.transaction.as_deref()]
            .into_iter()
            .flatten()
            .find_map(|key| self.routes.get(key).copied())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Default for RoutingTable {
    /// The table used by the subscriber flow.
    fn default() -> Self {
        Self::empty()
            .with(transaction::CREATE_SESSION, Route::CreateSession)
            .with(transaction::CREATE_HANDLE, Route::CreateHandle)
            .with(transaction::JOIN_SUBSCRIBER, Route::JoinSubscriber)
            .with(transaction::PUBLISH, Route::Publish)
            .with("ack", Route::Ack)
    }
}
