// crates/janus-client/tests/gateway_session_tests.rs
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use janus_client::{
    ApiError, Config, LogStatusSink, MediaSink, PeerConnection, PeerConnectionFactory,
    SubscriberState, launch,
};
use janus_interfaces::{PeerEventCallback, RemoteTrack};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;

struct NoPeers;

#[async_trait]
impl PeerConnectionFactory for NoPeers {
    async fn create(
        &self,
        _stun_servers: &[String],
        _on_event: PeerEventCallback,
    ) -> Result<Arc<dyn PeerConnection>, ApiError> {
        Err(ApiError::NotSupported("no peers in this test".into()))
    }
}

struct NoMedia;

impl MediaSink for NoMedia {
    fn attach(&self, track: &RemoteTrack) -> Result<(), ApiError> {
        Err(ApiError::TrackNotFound(track.id.clone()))
    }

    fn play(&self, track_id: &str) -> Result<(), ApiError> {
        Err(ApiError::TrackNotFound(track_id.to_string()))
    }
}

/// What the local gateway saw during one session.
struct GatewayLog {
    subprotocol: Option<String>,
    frames: Vec<Value>,
    // Held open so the client does not see a close
    _socket: WebSocketStream<TcpStream>,
}

async fn next_json(socket: &mut WebSocketStream<TcpStream>) -> Value {
    loop {
        match socket.next().await {
            Some(Ok(Message::Text(text))) => return serde_json::from_str(&text).unwrap(),
            Some(Ok(_)) => continue,
            other => panic!("gateway socket ended: {:?}", other),
        }
    }
}

/// Accepts one client, answers `create` after `acks_first` unrelated acks
/// and returns once the client has sent `attach`.
async fn serve_until_attach(listener: TcpListener, acks_first: usize) -> GatewayLog {
    let (stream, _) = listener.accept().await.unwrap();
    let mut subprotocol = None;
    let mut socket = tokio_tungstenite::accept_hdr_async(stream, |req: &Request, mut resp: Response| {
        if let Some(value) = req.headers().get(SEC_WEBSOCKET_PROTOCOL) {
            subprotocol = value.to_str().ok().map(str::to_owned);
            resp.headers_mut()
                .insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static("janus-protocol"));
        }
        Ok(resp)
    })
    .await
    .unwrap();

    let mut frames = vec![next_json(&mut socket).await];
    for _ in 0..acks_first {
        socket
            .send(Message::Text(
                r#"{"janus":"ack","transaction":"candidate"}"#.to_string(),
            ))
            .await
            .unwrap();
    }
    socket
        .send(Message::Text(
            r#"{"janus":"success","transaction":"create_session","data":{"id":111}}"#.to_string(),
        ))
        .await
        .unwrap();
    frames.push(next_json(&mut socket).await);

    GatewayLog {
        subprotocol,
        frames,
        _socket: socket,
    }
}

async fn run_session(acks_first: usize) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let gateway = tokio::spawn(serve_until_attach(listener, acks_first));

    let mut config = Config::default();
    config.gateway.url_override = Some(format!("ws://127.0.0.1:{}", port));
    let subscription = launch(
        Some(config),
        Arc::new(NoPeers),
        Arc::new(NoMedia),
        Arc::new(LogStatusSink::new()),
    )
    .await
    .unwrap();

    let log = tokio::time::timeout(Duration::from_secs(5), gateway)
        .await
        .expect("gateway did not see attach")
        .unwrap();

    assert_eq!(log.subprotocol.as_deref(), Some("janus-protocol"));
    assert_eq!(log.frames[0]["janus"], "create");
    assert_eq!(log.frames[0]["transaction"], "create_session");
    assert_eq!(log.frames[1]["janus"], "attach");
    assert_eq!(log.frames[1]["transaction"], "create_handle");
    assert_eq!(log.frames[1]["plugin"], "janus.plugin.videoroom");
    assert_eq!(log.frames[1]["session_id"], 111);

    let info = subscription.session_info().await.unwrap();
    assert_eq!(info.state, SubscriberState::HandlePending);
    assert_eq!(info.session_id, Some(111));
    assert_eq!(info.handle_id, None);

    let stats = subscription.router_stats().await.unwrap();
    assert_eq!(stats.routed, acks_first as u64 + 1);

    subscription.shutdown().await.unwrap();
}

#[actix_rt::test]
async fn session_is_created_over_the_janus_subprotocol() {
    run_session(0).await;
}

#[actix_rt::test]
async fn create_response_survives_a_burst_of_acks() {
    run_session(40).await;
}
