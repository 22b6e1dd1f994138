//! Outbound requests, in the exact JSON shape the gateway expects.

use janus_core::InternalError;
use janus_interfaces::{IceCandidate, SessionDescription};
use serde::Serialize;

pub const VIDEOROOM_PLUGIN: &str = "janus.plugin.videoroom";

/// Transaction tags. The flow never has two requests of the same kind in
/// flight, so fixed tags are enough to correlate responses.
pub mod transaction {
    pub const CREATE_SESSION: &str = "create_session";
    pub const CREATE_HANDLE: &str = "create_handle";
    pub const JOIN_SUBSCRIBER: &str = "join_subscriber";
    pub const CANDIDATE: &str = "candidate";
    pub const KEEPALIVE: &str = "keepalive";
    /// Tag of the `start` request. Its replies are not routed anywhere.
    pub const START: &str = "blah";
    pub const PUBLISH: &str = "publish";
}

/// A request sent to the gateway, tagged by its `janus` verb.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "janus", rename_all = "lowercase")]
pub enum JanusRequest {
    Create {
        transaction: String,
    },
    Attach {
        transaction: String,
        plugin: String,
        session_id: u64,
    },
    Message {
        transaction: String,
        body: VideoRoomRequest,
        #[serde(skip_serializing_if = "Option::is_none")]
        jsep: Option<SessionDescription>,
        session_id: u64,
        handle_id: u64,
    },
    Trickle {
        transaction: String,
        /// `None` is sent as `null`: end of candidates.
        candidate: Option<IceCandidate>,
        session_id: u64,
        handle_id: u64,
    },
    Keepalive {
        transaction: String,
        session_id: u64,
    },
}

/// Body of a VideoRoom plugin message.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "request", rename_all = "lowercase")]
pub enum VideoRoomRequest {
    Join {
        ptype: ParticipantType,
        room: u64,
        feed: u64,
    },
    Start,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantType {
    Subscriber,
}

impl JanusRequest {
    pub fn create_session() -> Self {
        JanusRequest::Create {
            transaction: transaction::CREATE_SESSION.to_string(),
        }
    }

    pub fn attach_videoroom(session_id: u64) -> Self {
        JanusRequest::Attach {
            transaction: transaction::CREATE_HANDLE.to_string(),
            plugin: VIDEOROOM_PLUGIN.to_string(),
            session_id,
        }
    }

    pub fn join_subscriber(session_id: u64, handle_id: u64, room: u64, feed: u64) -> Self {
        JanusRequest::Message {
            transaction: transaction::JOIN_SUBSCRIBER.to_string(),
            body: VideoRoomRequest::Join {
                ptype: ParticipantType::Subscriber,
                room,
                feed,
            },
            jsep: None,
            session_id,
            handle_id,
        }
    }

    pub fn start(session_id: u64, handle_id: u64, answer: SessionDescription) -> Self {
        JanusRequest::Message {
            transaction: transaction::START.to_string(),
            body: VideoRoomRequest::Start,
            jsep: Some(answer),
            session_id,
            handle_id,
        }
    }

    pub fn trickle(session_id: u64, handle_id: u64, candidate: Option<IceCandidate>) -> Self {
        JanusRequest::Trickle {
            transaction: transaction::CANDIDATE.to_string(),
            candidate,
            session_id,
            handle_id,
        }
    }

    pub fn keepalive(session_id: u64) -> Self {
        JanusRequest::Keepalive {
            transaction: transaction::KEEPALIVE.to_string(),
            session_id,
        }
    }

    /// Transaction tag of this request.
    pub fn transaction(&self) -> &str {
        match self {
            JanusRequest::Create { transaction }
            | JanusRequest::Attach { transaction, .. }
            | JanusRequest::Message { transaction, .. }
            | JanusRequest::Trickle { transaction, .. }
            | JanusRequest::Keepalive { transaction, .. } => transaction,
        }
    }

    pub fn to_json(&self) -> Result<String, InternalError> {
        serde_json::to_string(self).map_err(|e| InternalError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn value(request: &JanusRequest) -> Value {
        serde_json::from_str(&request.to_json().unwrap()).unwrap()
    }

    #[test]
    fn create_and_attach_shapes() {
        assert_eq!(
            value(&JanusRequest::create_session()),
            json!({"janus": "create", "transaction": "create_session"})
        );
        assert_eq!(
            value(&JanusRequest::attach_videoroom(111)),
            json!({
                "janus": "attach",
                "transaction": "create_handle",
                "plugin": "janus.plugin.videoroom",
                "session_id": 111
            })
        );
    }

    #[test]
    fn join_has_no_jsep_field() {
        assert_eq!(
            value(&JanusRequest::join_subscriber(111, 222, 1234, 42)),
            json!({
                "janus": "message",
                "transaction": "join_subscriber",
                "body": {"request": "join", "ptype": "subscriber", "room": 1234, "feed": 42},
                "session_id": 111,
                "handle_id": 222
            })
        );
    }

    #[test]
    fn start_carries_answer_as_jsep() {
        let request = JanusRequest::start(1, 2, SessionDescription::answer("v=0"));
        assert_eq!(
            value(&request),
            json!({
                "janus": "message",
                "transaction": "blah",
                "body": {"request": "start"},
                "jsep": {"type": "answer", "sdp": "v=0"},
                "session_id": 1,
                "handle_id": 2
            })
        );
    }

    #[test]
    fn end_of_candidates_is_sent_as_null() {
        let request = JanusRequest::trickle(1, 2, None);
        assert_eq!(value(&request)["candidate"], Value::Null);
        assert_eq!(request.transaction(), "candidate");
    }

    #[test]
    fn keepalive_names_only_the_session() {
        assert_eq!(
            value(&JanusRequest::keepalive(9)),
            json!({"janus": "keepalive", "transaction": "keepalive", "session_id": 9})
        );
    }

    #[test]
    fn session_ids_beyond_f64_precision_survive() {
        let id = 8_135_422_071_230_891u64;
        assert_eq!(value(&JanusRequest::keepalive(id))["session_id"], json!(id));
    }
}
