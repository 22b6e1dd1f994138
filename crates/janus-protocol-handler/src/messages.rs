//! Inbound gateway messages and the actix messages the router emits.

use crate::routing::Route;
use actix::prelude::*;
use janus_core::InternalError;
use janus_interfaces::SessionDescription;
use serde::Deserialize;
use serde_json::Value;

/// A message received from the gateway.
///
/// Only the fields the subscriber looks at are typed; the complete payload is
/// kept in `raw`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct JanusMessage {
    /// Event kind: `success`, `ack`, `event`, `error`, `webrtcup`, ...
    #[serde(default)]
    pub janus: Option<String>,
    /// Echo of the request's transaction tag, when the message answers one.
    #[serde(default)]
    pub transaction: Option<String>,
    #[serde(default)]
    pub session_id: Option<u64>,
    /// Handle that produced a plugin event.
    #[serde(default)]
    pub sender: Option<u64>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub plugindata: Option<PluginData>,
    #[serde(default)]
    pub jsep: Option<SessionDescription>,
    /// Gateway-level error (`{"janus": "error", "error": {...}}`).
    #[serde(default)]
    pub error: Option<GatewayError>,
    #[serde(skip)]
    pub raw: Value,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PluginData {
    #[serde(default)]
    pub plugin: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct GatewayError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub reason: String,
}

impl JanusMessage {
    /// Parses a text frame, keeping the whole payload alongside the typed view.
    pub fn parse(text: &str) -> Result<Self, InternalError> {
        let raw: Value = serde_json::from_str(text)?;
        let mut message: JanusMessage = serde_json::from_value(raw.clone())?;
        message.raw = raw;
        Ok(message)
    }

    /// The id announced by a `create`/`attach` success (`data.id`).
    pub fn created_id(&self) -> Option<u64> {
        self.data.as_ref()?.get("id")?.as_u64()
    }

    /// `plugindata.data.error_code`, if the plugin reported one.
    pub fn plugin_error_code(&self) -> Option<i64> {
        self.plugindata.as_ref()?.data.get("error_code")?.as_i64()
    }

    /// `plugindata.data.error`, if the plugin reported one.
    pub fn plugin_error(&self) -> Option<&str> {
        self.plugindata.as_ref()?.data.get("error")?.as_str()
    }
}

/// A parsed gateway message together with the receiver the routing table picked.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct RoutedMessage {
    pub route: Route,
    pub message: JanusMessage,
}

/// Counters kept by the router.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterStats {
    pub routed: u64,
    /// Messages that matched no route and went to the fallback logger.
    pub unrouted: u64,
    /// Frames that were not valid JSON (or not an object).
    pub malformed: u64,
}

#[derive(Message, Debug)]
#[rtype(result = "RouterStats")]
pub struct GetRouterStats;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_exposes_created_id_and_keeps_raw_payload() {
        let msg = JanusMessage::parse(
            r#"{"janus":"success","transaction":"create_session","data":{"id":111}}"#,
        )
        .unwrap();
        assert_eq!(msg.janus.as_deref(), Some("success"));
        assert_eq!(msg.transaction.as_deref(), Some("create_session"));
        assert_eq!(msg.created_id(), Some(111));
        assert_eq!(msg.raw["data"]["id"], 111);
    }

    #[test]
    fn plugin_error_fields_are_reachable() {
        let msg = JanusMessage::parse(
            r#"{"janus":"event","sender":222,"transaction":"join_subscriber",
                "plugindata":{"plugin":"janus.plugin.videoroom",
                              "data":{"videoroom":"event","error_code":428,"error":"No such feed (42)"}}}"#,
        )
        .unwrap();
        assert_eq!(msg.plugin_error_code(), Some(428));
        assert_eq!(msg.plugin_error(), Some("No such feed (42)"));
        assert!(msg.jsep.is_none());
    }

    #[test]
    fn offer_is_parsed_from_jsep() {
        let msg = JanusMessage::parse(
            r#"{"janus":"event","transaction":"join_subscriber",
                "plugindata":{"plugin":"janus.plugin.videoroom","data":{"videoroom":"attached"}},
                "jsep":{"type":"offer","sdp":"v=0\r\n"}}"#,
        )
        .unwrap();
        assert_eq!(msg.jsep, Some(SessionDescription::offer("v=0\r\n")));
    }

    #[test]
    fn gateway_error_without_code_still_routes() {
        let msg = JanusMessage::parse(
            r#"{"janus":"error","transaction":"create_handle","error":{"reason":"No such session"}}"#,
        )
        .unwrap();
        assert_eq!(msg.transaction.as_deref(), Some("create_handle"));
        let error = msg.error.unwrap();
        assert_eq!(error.code, 0);
        assert_eq!(error.reason, "No such session");
    }

    #[test]
    fn non_object_frames_are_rejected() {
        assert!(JanusMessage::parse("[1,2,3]").is_err());
        assert!(JanusMessage::parse("not json").is_err());
    }
}
