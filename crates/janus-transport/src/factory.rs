//! Factory function for creating Transport implementations based on ConnectParams.

use crate::error::TransportError;
use crate::traits::Transport;
use crate::types::ConnectParams;

#[cfg(feature = "websocket")]
use crate::websocket::WebSocketTransport;

/// Creates a boxed `Transport` trait object based on the URL scheme in `ConnectParams`.
///
/// Supports `ws://` and `wss://` if the `websocket` feature is enabled.
pub fn create_transport(params: &ConnectParams) -> Result<Box<dyn Transport>, TransportError> {
    let url = &params.url;
    log::debug!("Attempting to create transport for URL: {}", url);

    if url.starts_with("ws://") || url.starts_with("wss://") {
        #[cfg(feature = "websocket")]
        {
            log::info!("Creating WebSocketTransport for {}", url);
            Ok(Box::new(WebSocketTransport::new(params.clone())))
        }
        #[cfg(not(feature = "websocket"))]
        {
            log::error!("WebSocket URL specified, but 'websocket' feature is not enabled.");
            Err(TransportError::UnsupportedScheme(
                "WebSocket (ws/wss) requires the 'websocket' feature.".to_string(),
            ))
        }
    } else {
        log::error!("Unsupported URL scheme found in: {}", url);
        Err(TransportError::UnsupportedScheme(format!(
            "Scheme not supported for URL: {}",
            url
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn params(url: &str) -> ConnectParams {
        ConnectParams {
            url: url.to_string(),
            subprotocol: None,
            connection_timeout: Duration::from_secs(1),
            outgoing_buffer: 10,
            #[cfg(feature = "websocket")]
            ws_options: Default::default(),
        }
    }

    #[test]
    fn rejects_http_urls() {
        let err = create_transport(&params("https://localhost:8989")).err().unwrap();
        assert!(matches!(err, TransportError::UnsupportedScheme(_)));
    }

    #[cfg(feature = "websocket")]
    #[test]
    fn accepts_secure_websocket_urls() {
        assert!(create_transport(&params("wss://localhost:8989")).is_ok());
    }
}
