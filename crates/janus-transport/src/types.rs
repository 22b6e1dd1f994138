use janus_core::Config;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Parameters required to establish a connection.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConnectParams {
    /// The full URL for the connection (e.g., "wss://localhost:8989").
    /// The scheme determines the transport type.
    pub url: String,

    /// Subprotocol requested in the handshake (`janus-protocol` for the gateway).
    #[serde(default)]
    pub subprotocol: Option<String>,

    /// Connection timeout. Applied during the initial connection attempt.
    #[serde(with = "serde_duration_ms", default = "default_connect_timeout")]
    pub connection_timeout: Duration,

    /// Capacity of the channel between the actor and the write loop.
    #[serde(default = "default_outgoing_buffer")]
    pub outgoing_buffer: usize,

    /// Options specific to WebSocket connections.
    #[cfg(feature = "websocket")]
    #[serde(default)]
    pub ws_options: WebSocketConnectOptions,
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(20)
}

fn default_outgoing_buffer() -> usize {
    100
}

impl ConnectParams {
    /// Connection parameters for the gateway described by `config`.
    pub fn from_config(config: &Config) -> Self {
        Self {
            url: config.gateway.url(),
            subprotocol: Some(config.gateway.subprotocol.clone()),
            connection_timeout: config.transport.connect_timeout,
            outgoing_buffer: config.transport.outgoing_buffer.max(1),
            #[cfg(feature = "websocket")]
            ws_options: WebSocketConnectOptions {
                max_message_size: config.transport.websocket.max_message_size,
                max_frame_size: config.transport.websocket.max_frame_size,
                accept_unmasked_frames: config.transport.websocket.accept_unmasked_frames,
            },
        }
    }
}

/// Options specific to WebSocket connections.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[cfg(feature = "websocket")]
#[serde(default)]
pub struct WebSocketConnectOptions {
    pub max_message_size: Option<usize>,
    pub max_frame_size: Option<usize>,
    pub accept_unmasked_frames: bool,
}

// Module for serializing/deserializing Duration to/from milliseconds
pub(crate) mod serde_duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_follow_gateway_config() {
        let mut config = Config::default();
        config.gateway.host = "gw.example".into();
        config.transport.outgoing_buffer = 0;

        let params = ConnectParams::from_config(&config);
        assert_eq!(params.url, "wss://gw.example:8989");
        assert_eq!(params.subprotocol.as_deref(), Some("janus-protocol"));
        assert_eq!(params.outgoing_buffer, 1);
    }

    #[test]
    fn timeout_round_trips_as_milliseconds() {
        let params: ConnectParams = serde_json::from_str(
            r#"{"url": "ws://127.0.0.1:8188", "connection_timeout": 1500}"#,
        )
        .unwrap();
        assert_eq!(params.connection_timeout, Duration::from_millis(1500));
        assert_eq!(params.outgoing_buffer, 100);
        assert!(params.subprotocol.is_none());
    }
}
