use thiserror::Error;

/// Errors raised while signaling with the gateway, distinct from the
/// seam-level `ApiError` returned by peer and sink implementations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InternalError {
    /// The WebSocket transport failed or is not connected. Carries the
    /// rendered `TransportError` so this crate stays below the transport crate.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The gateway answered with an error payload.
    #[error("Protocol error: {message}")]
    Protocol {
        code: Option<i64>, // Janus or plugin error code, e.g. 428
        message: String,
    },

    /// A message arrived that the current session state does not accept.
    #[error("Unexpected message in state {state}: {detail}")]
    UnexpectedMessage { state: String, detail: String },

    /// An error occurred within the actor system (e.g., mailbox closed).
    #[error("Actor system error: {0}")]
    Actor(String),

    /// The peer connection rejected an operation (SDP, ICE).
    #[error("Peer connection error: {0}")]
    PeerConnection(String),

    /// Failed to serialize an outbound request.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Failed to deserialize an inbound message.
    #[error("Deserialization failed: {0}")]
    Deserialization(String),

    /// A required configuration value was missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Specific errors originating strictly from the core crate logic.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration loading failed: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("Logging setup failed: {0}")]
    LoggingSetup(String),
}

impl From<CoreError> for InternalError {
    fn from(err: CoreError) -> Self {
        InternalError::Configuration(err.to_string())
    }
}

impl From<serde_json::Error> for InternalError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            InternalError::Deserialization(err.to_string())
        } else {
            InternalError::Serialization(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_syntax_errors_map_to_deserialization() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(InternalError::from(err), InternalError::Deserialization(_)));
    }

    #[test]
    fn protocol_error_renders_gateway_text() {
        let err = InternalError::Protocol {
            code: Some(428),
            message: "No such feed (42)".into(),
        };
        assert_eq!(err.to_string(), "Protocol error: No such feed (42)");
    }
}
