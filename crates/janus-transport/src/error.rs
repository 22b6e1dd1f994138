use janus_core::InternalError;
use thiserror::Error;

/// Errors specific to the transport layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Not connected: {0}")]
    NotConnected(String),

    #[error("Send operation failed: {0}")]
    SendFailed(String),

    #[error("Receive operation failed: {0}")]
    ReceiveFailed(String),

    #[error("Connection timed out")]
    Timeout,

    #[error("Invalid URL or connection parameters: {0}")]
    InvalidUrl(String),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Subprotocol negotiation failed: {0}")]
    Subprotocol(String),

    #[error("Underlying I/O error: {0}")]
    Io(String), // Wrap std::io::Error string representation

    #[cfg(feature = "websocket")]
    #[error("WebSocket protocol error: {0}")]
    WebSocketError(String),

    #[error("TLS error: {0}")]
    TlsError(String),

    #[error("Unknown transport error: {0}")]
    Other(String),
}

// Helper for converting std::io::Error
impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Io(err.to_string())
    }
}

impl From<TransportError> for InternalError {
    fn from(err: TransportError) -> Self {
        InternalError::Transport(err.to_string())
    }
}

#[cfg(feature = "websocket")]
impl From<tokio_tungstenite::tungstenite::Error> for TransportError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;

        match err {
            WsError::ConnectionClosed => TransportError::NotConnected("Connection closed".into()),
            WsError::AlreadyClosed => {
                TransportError::NotConnected("Connection already closed".into())
            }
            WsError::Io(io_err) => TransportError::Io(io_err.to_string()),
            WsError::Tls(tls_err) => TransportError::TlsError(tls_err.to_string()),
            WsError::Capacity(reason) => {
                TransportError::SendFailed(format!("Capacity error: {}", reason))
            }
            WsError::Protocol(reason) => {
                TransportError::WebSocketError(format!("Protocol violation: {}", reason))
            }
            WsError::WriteBufferFull(_) => TransportError::SendFailed("Write buffer full".into()),
            WsError::Utf8 => TransportError::ReceiveFailed("Invalid UTF-8 received".into()),
            WsError::Url(parse_err) => {
                TransportError::InvalidUrl(format!("URL parse error: {}", parse_err))
            }
            WsError::Http(resp) => TransportError::ConnectionFailed(format!(
                "HTTP error during handshake: Status {}",
                resp.status()
            )),
            WsError::HttpFormat(http_err) => {
                TransportError::ConnectionFailed(format!("HTTP format error: {}", http_err))
            }
            other => TransportError::Other(format!("Unknown tungstenite error: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_into_internal_error() {
        let internal: InternalError = TransportError::Timeout.into();
        assert_eq!(internal, InternalError::Transport("Connection timed out".into()));
    }

    #[cfg(feature = "websocket")]
    #[test]
    fn closed_socket_maps_to_not_connected() {
        let err: TransportError = tokio_tungstenite::tungstenite::Error::ConnectionClosed.into();
        assert!(matches!(err, TransportError::NotConnected(_)));
    }

    #[cfg(feature = "websocket")]
    #[test]
    fn protocol_violations_map_to_websocket_error() {
        use tokio_tungstenite::tungstenite::error::ProtocolError;

        let err: TransportError =
            tokio_tungstenite::tungstenite::Error::Protocol(ProtocolError::SendAfterClosing).into();
        assert!(matches!(err, TransportError::WebSocketError(_)));
    }
}
