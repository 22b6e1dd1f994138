//! Implementation of the `Transport` trait using WebSockets (`tokio-tungstenite`).

#![cfg(feature = "websocket")] // Only compile this module if websocket feature is enabled

use crate::error::TransportError;
use crate::traits::Transport;
use crate::types::{ConnectParams, WebSocketConnectOptions};
use async_trait::async_trait;
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use log::{debug, error, info, trace, warn};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async_with_config,
    tungstenite::{
        Error as TungsteniteError,
        client::IntoClientRequest,
        handshake::client::Request,
        http::{HeaderValue, header::SEC_WEBSOCKET_PROTOCOL},
        protocol::{Message as TungsteniteMessage, WebSocketConfig},
    },
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, TungsteniteMessage>;
type WsSource = SplitStream<WsStream>;

/// WebSocket transport implementation.
pub struct WebSocketTransport {
    params: ConnectParams,
    sink: Option<WsSink>,
    source: Option<WsSource>,
}

impl WebSocketTransport {
    pub fn new(params: ConnectParams) -> Self {
        Self {
            params,
            sink: None,
            source: None,
        }
    }

    /// Maps our `WebSocketConnectOptions` onto tungstenite's `WebSocketConfig`.
    fn apply_options(options: &WebSocketConnectOptions) -> WebSocketConfig {
        let mut config = WebSocketConfig::default();
        if let Some(size) = options.max_message_size {
            config.max_message_size = Some(size);
        }
        if let Some(size) = options.max_frame_size {
            config.max_frame_size = Some(size);
        }
        config.accept_unmasked_frames = options.accept_unmasked_frames;
        config
    }

    /// Builds the handshake request, adding `Sec-WebSocket-Protocol` when a
    /// subprotocol is configured.
    fn build_request(params: &ConnectParams) -> Result<Request, TransportError> {
        let mut request = params.url.as_str().into_client_request()?;
        if let Some(protocol) = &params.subprotocol {
            let value = HeaderValue::from_str(protocol).map_err(|e| {
                TransportError::Subprotocol(format!("invalid subprotocol '{}': {}", protocol, e))
            })?;
            request.headers_mut().insert(SEC_WEBSOCKET_PROTOCOL, value);
        }
        Ok(request)
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn connect(&mut self) -> Result<(), TransportError> {
        if self.sink.is_some() || self.source.is_some() {
            warn!("WebSocketTransport already connected or partially connected.");
            return Err(TransportError::ConnectionFailed("Already connected".into()));
        }

        info!("Connecting WebSocket to {}", self.params.url);
        let ws_config = Self::apply_options(&self.params.ws_options);
        let request = Self::build_request(&self.params)?;

        let (ws_stream, response) = connect_async_with_config(request, Some(ws_config), false).await?;

        let negotiated = response
            .headers()
            .get(SEC_WEBSOCKET_PROTOCOL)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        match (&self.params.subprotocol, &negotiated) {
            (Some(requested), Some(accepted)) if requested != accepted => {
                return Err(TransportError::Subprotocol(format!(
                    "requested '{}', server selected '{}'",
                    requested, accepted
                )));
            }
            (Some(requested), None) => {
                warn!("Server did not confirm subprotocol '{}'", requested);
            }
            _ => {}
        }
        debug!(
            "WebSocket handshake successful (status {}, subprotocol {:?})",
            response.status(),
            negotiated
        );

        let (sink, source) = ws_stream.split();
        self.sink = Some(sink);
        self.source = Some(source);

        info!("WebSocket connection established.");
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        info!("Disconnecting WebSocket.");
        if let Some(mut sink) = self.sink.take() {
            // Attempt to send a Close frame
            match sink.send(TungsteniteMessage::Close(None)).await {
                Ok(_) => debug!("WebSocket Close frame sent."),
                Err(TungsteniteError::ConnectionClosed | TungsteniteError::AlreadyClosed) => {
                    debug!("WebSocket already closed while sending Close frame.")
                }
                Err(e) => {
                    warn!("Error sending WebSocket Close frame: {}. Closing anyway.", e);
                }
            }
            if let Err(e) = sink.close().await {
                if !matches!(
                    e,
                    TungsteniteError::ConnectionClosed | TungsteniteError::AlreadyClosed
                ) {
                    warn!("Error closing WebSocket sink: {}", e);
                }
            }
        } else {
            debug!("WebSocket sink already taken or never existed during disconnect.");
        }

        self.source = None;

        info!("WebSocket disconnected.");
        Ok(())
    }

    async fn send(&mut self, message: &str) -> Result<(), TransportError> {
        let sink = self
            .sink
            .as_mut()
            .ok_or_else(|| TransportError::NotConnected("WebSocket sink unavailable".into()))?;

        trace!("Sending WebSocket message: {}", message);
        sink.send(TungsteniteMessage::Text(message.to_string())).await?;
        Ok(())
    }

    async fn receive(&mut self) -> Option<Result<String, TransportError>> {
        let source = self.source.as_mut()?; // Returns None if source is None

        // Control frames are answered by tungstenite itself; keep waiting for data.
        loop {
            match source.next().await {
                Some(Ok(TungsteniteMessage::Text(text))) => {
                    trace!("Received WebSocket Text: {}", text);
                    return Some(Ok(text));
                }
                Some(Ok(TungsteniteMessage::Binary(bin))) => {
                    warn!(
                        "Received unexpected WebSocket Binary message ({} bytes), ignoring.",
                        bin.len()
                    );
                }
                Some(Ok(TungsteniteMessage::Ping(_) | TungsteniteMessage::Pong(_))) => {
                    trace!("Received WebSocket control frame.");
                }
                Some(Ok(TungsteniteMessage::Close(close_frame))) => {
                    info!("Received WebSocket Close frame: {:?}", close_frame);
                    return None; // Signal graceful closure
                }
                Some(Ok(TungsteniteMessage::Frame(_))) => {
                    warn!("Received unexpected WebSocket raw frame, ignoring.");
                }
                Some(Err(TungsteniteError::ConnectionClosed | TungsteniteError::AlreadyClosed)) => {
                    info!("WebSocket connection closed while receiving.");
                    return None;
                }
                Some(Err(e)) => {
                    error!("WebSocket receive error: {}", e);
                    return Some(Err(e.into()));
                }
                None => {
                    info!("WebSocket stream ended (source returned None).");
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn params(subprotocol: Option<&str>) -> ConnectParams {
        ConnectParams {
            url: "wss://localhost:8989".into(),
            subprotocol: subprotocol.map(str::to_owned),
            connection_timeout: Duration::from_secs(1),
            outgoing_buffer: 10,
            ws_options: WebSocketConnectOptions {
                max_message_size: Some(1024),
                max_frame_size: None,
                accept_unmasked_frames: false,
            },
        }
    }

    #[test]
    fn handshake_request_carries_janus_subprotocol() {
        let request = WebSocketTransport::build_request(&params(Some("janus-protocol"))).unwrap();
        assert_eq!(
            request.headers().get(SEC_WEBSOCKET_PROTOCOL).unwrap(),
            "janus-protocol"
        );
        assert_eq!(request.uri().host(), Some("localhost"));
    }

    #[test]
    fn handshake_request_without_subprotocol_has_no_header() {
        let request = WebSocketTransport::build_request(&params(None)).unwrap();
        assert!(request.headers().get(SEC_WEBSOCKET_PROTOCOL).is_none());
    }

    #[test]
    fn options_are_applied_to_tungstenite_config() {
        let config = WebSocketTransport::apply_options(&params(None).ws_options);
        assert_eq!(config.max_message_size, Some(1024));
        assert!(!config.accept_unmasked_frames);
    }

    #[tokio::test]
    async fn send_before_connect_is_rejected() {
        let mut transport = WebSocketTransport::new(params(None));
        let err = transport.send("{}").await.unwrap_err();
        assert!(matches!(err, TransportError::NotConnected(_)));
        assert!(transport.receive().await.is_none());
    }
}
