//! Subscriber session states and the guards between them.

use janus_protocol_handler::Route;

/// Progress of the subscriber session.
///
/// `Idle → SessionPending → HandlePending → JoinPending → Publishing → Playing`,
/// or `JoinPending → Halted` when the gateway answers the join without an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberState {
    /// Waiting for the gateway connection.
    Idle,
    /// `create` sent, waiting for the session id.
    SessionPending,
    /// `attach` sent, waiting for the handle id.
    HandlePending,
    /// `join` sent, waiting for the offer.
    JoinPending,
    /// Answer sent with `start`, waiting for media.
    Publishing,
    /// A remote track is being played.
    Playing,
    /// The plugin refused the join. Nothing else happens in this session.
    Halted,
}

impl SubscriberState {
    /// Whether a response on `route` may be handled in this state.
    ///
    /// Only the three sequencing routes are guarded; `publish` and `ack` are
    /// accepted in any state.
    pub fn accepts(self, route: Route) -> bool {
        match route {
            Route::CreateSession => self == SubscriberState::SessionPending,
            Route::CreateHandle => self == SubscriberState::HandlePending,
            Route::JoinSubscriber => self == SubscriberState::JoinPending,
            Route::Publish | Route::Ack => true,
        }
    }

    pub fn is_halted(self) -> bool {
        self == SubscriberState::Halted
    }
}
