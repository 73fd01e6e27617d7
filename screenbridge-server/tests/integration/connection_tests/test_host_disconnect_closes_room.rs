use screenbridge_core::{ClientSignal, PeerId, RelaySignal};

use crate::integration::init_tracing;
use crate::utils::{create_test_relay, pair};

#[tokio::test]
async fn test_host_disconnect_closes_room() {
    init_tracing();

    let (relay, signaling, _signal_rx) = create_test_relay();
    let host = PeerId::new();
    let viewer = PeerId::new();
    let code = pair(&relay, &signaling, host, viewer).await.unwrap();

    relay.handle_disconnect(host).await;

    assert_eq!(
        signaling.count_for(&viewer, |s| *s == RelaySignal::HostDisconnected),
        1
    );
    assert_eq!(relay.registry().room_count().await, 0);
    assert_eq!(relay.registry().peer_count().await, 0);

    // The code no longer resolves.
    let late = PeerId::new();
    relay
        .handle_message(
            late,
            ClientSignal::Join {
                code: code.to_string(),
            },
        )
        .await;
    assert_eq!(
        signaling.signals_for(&late),
        vec![RelaySignal::join_rejected("Invalid sharing code")]
    );
}

#[tokio::test]
async fn test_disconnect_is_idempotent() {
    init_tracing();

    let (relay, signaling, _signal_rx) = create_test_relay();
    let host = PeerId::new();
    let viewer = PeerId::new();
    pair(&relay, &signaling, host, viewer).await.unwrap();

    relay.handle_disconnect(host).await;
    relay.handle_disconnect(host).await;
    relay.handle_disconnect(viewer).await;

    assert_eq!(
        signaling.count_for(&viewer, |s| *s == RelaySignal::HostDisconnected),
        1
    );
    assert_eq!(
        signaling.count_for(&host, |s| *s == RelaySignal::ViewerDisconnected),
        0
    );
}
