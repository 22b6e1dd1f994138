//! Subscribes to the configured VideoRoom feed and reports playback until
//! Ctrl-C or the end of the session.
//!
//! Configuration comes from `janus.toml` and `JANUS__*` variables, e.g.
//! `JANUS__GATEWAY__HOST=demo.example cargo run --example videoroom_subscriber`.

use janus_core::load_config;
use janus_subscriber::{
    ClientError, LogStatusSink, SessionEnd, StatusSink, launch, peer_and_playback,
};
use std::sync::Arc;

#[actix_rt::main]
async fn main() -> Result<(), ClientError> {
    let config = load_config()?;
    println!(
        "Subscribing to feed {} in room {} at {}",
        config.videoroom.feed,
        config.videoroom.room,
        config.gateway.url()
    );

    let (peer_factory, playback) = peer_and_playback();
    let playback = Arc::new(playback);
    let status = Arc::new(LogStatusSink::new());

    let mut subscription = launch(
        Some(config),
        Arc::new(peer_factory),
        playback.clone(),
        status.clone(),
    )
    .await?;

    let end = tokio::select! {
        end = subscription.finished() => Some(end),
        _ = tokio::signal::ctrl_c() => None,
    };

    match &end {
        Some(SessionEnd::Halted) => println!("Gateway refused the join: {}", status.text()),
        Some(other) => println!("Session ended: {:?}", other),
        None => println!("Interrupted."),
    }

    if let Ok(info) = subscription.session_info().await {
        println!("Final state: {:?}", info);
    }
    for track in playback.stats() {
        println!(
            "{} {:?} ({}): {} packets, {} bytes",
            track.track_id, track.kind, track.codec, track.packets, track.bytes
        );
    }

    if end.is_none() {
        subscription.shutdown().await?;
    }
    Ok(())
}
