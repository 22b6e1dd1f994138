// crates/janus-protocol-handler/tests/router_actor_tests.rs
use actix::prelude::*;
use janus_protocol_handler::{GetRouterStats, Route, RoutedMessage, RouterActor, RouterStats};
use janus_transport::IncomingMessage;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct RouteRecorder {
    received: Arc<Mutex<Vec<RoutedMessage>>>,
}

impl Actor for RouteRecorder {
    type Context = Context<Self>;
}

impl Handler<RoutedMessage> for RouteRecorder {
    type Result = ();

    fn handle(&mut self, msg: RoutedMessage, _ctx: &mut Context<Self>) {
        self.received.lock().unwrap().push(msg);
    }
}

fn start_router() -> (Addr<RouterActor>, Arc<Mutex<Vec<RoutedMessage>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let recorder = RouteRecorder {
        received: received.clone(),
    }
    .start();
    (RouterActor::new(recorder.recipient()).start(), received)
}

async fn feed(router: &Addr<RouterActor>, frames: &[&str]) -> RouterStats {
    for frame in frames {
        router.send(IncomingMessage(frame.to_string())).await.unwrap();
    }
    let stats = router.send(GetRouterStats).await.unwrap();
    // Let the recorder drain its mailbox
    tokio::time::sleep(Duration::from_millis(20)).await;
    stats
}

#[actix_rt::test]
async fn each_matching_message_is_forwarded_once() {
    let (router, received) = start_router();

    let stats = feed(
        &router,
        &[
            r#"{"janus":"success","transaction":"create_session","data":{"id":111}}"#,
            r#"{"janus":"ack","transaction":"join_subscriber"}"#,
            r#"{"janus":"event","transaction":"join_subscriber","jsep":{"type":"offer","sdp":"v=0"}}"#,
        ],
    )
    .await;

    assert_eq!(stats.routed, 3);
    let received = received.lock().unwrap();
    let routes: Vec<Route> = received.iter().map(|m| m.route).collect();
    assert_eq!(
        routes,
        vec![Route::CreateSession, Route::Ack, Route::JoinSubscriber]
    );
    assert_eq!(received[0].message.created_id(), Some(111));
}

#[actix_rt::test]
async fn unmatched_and_malformed_frames_are_not_forwarded() {
    let (router, received) = start_router();

    let stats = feed(
        &router,
        &[
            r#"{"janus":"webrtcup","session_id":1,"sender":2}"#,
            r#"{"janus":"success","transaction":"blah"}"#,
            "{not json",
        ],
    )
    .await;

    assert_eq!(
        stats,
        RouterStats {
            routed: 0,
            unrouted: 2,
            malformed: 1
        }
    );
    assert!(received.lock().unwrap().is_empty());
}

#[actix_rt::test]
async fn bursts_beyond_the_mailbox_capacity_are_all_forwarded() {
    let (router, received) = start_router();

    for _ in 0..40 {
        router.do_send(IncomingMessage(
            r#"{"janus":"ack","transaction":"candidate"}"#.to_string(),
        ));
    }
    router.do_send(IncomingMessage(
        r#"{"janus":"event","transaction":"join_subscriber","jsep":{"type":"offer","sdp":"v=0"}}"#
            .to_string(),
    ));
    let stats = feed(&router, &[]).await;

    assert_eq!(stats.routed, 41);
    let received = received.lock().unwrap();
    assert_eq!(received.len(), 41);
    assert!(received[..40].iter().all(|m| m.route == Route::Ack));
    assert_eq!(received[40].route, Route::JoinSubscriber);
}
