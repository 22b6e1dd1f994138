// crates/janus-webrtc/tests/peer_tests.rs
use janus_interfaces::{
    ApiError, PeerConnectionFactory, PeerEvent, PeerEventCallback, SdpType, SessionDescription,
};
use janus_webrtc::peer_and_playback;
use std::sync::{Arc, Mutex};
use webrtc::api::APIBuilder;
use webrtc::api::media_engine::MediaEngine;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;

fn recording_callback() -> (PeerEventCallback, Arc<Mutex<Vec<PeerEvent>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let callback: PeerEventCallback = Arc::new(move |event| sink.lock().unwrap().push(event));
    (callback, events)
}

/// An SDP offer with one video m-line, produced by a plain webrtc-rs peer.
async fn remote_video_offer() -> String {
    let mut media_engine = MediaEngine::default();
    media_engine.register_default_codecs().unwrap();
    let api = APIBuilder::new().with_media_engine(media_engine).build();
    let offerer = api
        .new_peer_connection(RTCConfiguration::default())
        .await
        .unwrap();
    offerer
        .add_transceiver_from_kind(RTPCodecType::Video, None)
        .await
        .unwrap();
    let offer = offerer.create_offer(None).await.unwrap();
    offerer.close().await.unwrap();
    offer.sdp
}

#[tokio::test]
async fn answers_a_video_offer() {
    let (factory, _playback) = peer_and_playback();
    let (callback, _events) = recording_callback();
    let peer = factory.create(&[], callback).await.unwrap();

    peer.set_remote_description(SessionDescription::offer(remote_video_offer().await))
        .await
        .unwrap();
    let answer = peer.create_answer().await.unwrap();
    assert_eq!(answer.sdp_type, SdpType::Answer);
    assert!(answer.sdp.contains("m=video"));

    peer.set_local_description(answer).await.unwrap();
    peer.close().await.unwrap();
}

#[tokio::test]
async fn garbage_offer_is_rejected() {
    let (factory, _playback) = peer_and_playback();
    let (callback, _events) = recording_callback();
    let peer = factory.create(&[], callback).await.unwrap();

    let err = peer
        .set_remote_description(SessionDescription::offer("not an sdp"))
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            ApiError::InvalidDescription(_) | ApiError::NegotiationFailed(_)
        ),
        "unexpected error: {:?}",
        err
    );
    peer.close().await.unwrap();
}

#[tokio::test]
async fn local_description_must_be_an_answer() {
    let (factory, _playback) = peer_and_playback();
    let (callback, _events) = recording_callback();
    let peer = factory.create(&[], callback).await.unwrap();

    let err = peer
        .set_local_description(SessionDescription::offer("v=0"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidDescription(_)));
    peer.close().await.unwrap();
}
