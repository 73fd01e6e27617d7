use screenbridge_core::{PeerId, RelaySignal, Role, is_valid_code};

use crate::integration::init_tracing;
use crate::utils::{create_test_relay, wait_for_signal};

#[tokio::test]
async fn test_host_requests_code() {
    init_tracing();

    let (relay, _signaling, mut signal_rx) = create_test_relay();
    let host = PeerId::new();

    relay
        .handle_message(host, screenbridge_core::ClientSignal::RequestCode)
        .await;

    let code = match wait_for_signal(&mut signal_rx, &host).await.unwrap() {
        RelaySignal::CodeReply {
            success: true,
            code: Some(code),
        } => code,
        other => panic!("Expected code reply, got {:?}", other),
    };

    assert!(is_valid_code(code.as_str()));
    assert_eq!(relay.registry().room_count().await, 1);
    assert_eq!(relay.registry().lookup(&host).await.unwrap().role, Role::Host);
}

#[tokio::test]
async fn test_second_request_replaces_room() {
    init_tracing();

    let (relay, signaling, _signal_rx) = create_test_relay();
    let host = PeerId::new();

    let first = crate::utils::open_room(&relay, &signaling, host).await.unwrap();
    let second = crate::utils::open_room(&relay, &signaling, host).await.unwrap();

    assert_ne!(first, second);
    assert!(relay.registry().room(&first).await.is_none());
    assert_eq!(relay.registry().room_count().await, 1);
}
