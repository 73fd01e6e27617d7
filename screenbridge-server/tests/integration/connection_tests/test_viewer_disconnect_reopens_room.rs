use screenbridge_core::{ClientSignal, PeerId, RelaySignal};

use crate::integration::init_tracing;
use crate::utils::{create_test_relay, pair};

#[tokio::test]
async fn test_viewer_disconnect_reopens_room() {
    init_tracing();

    let (relay, signaling, _signal_rx) = create_test_relay();
    let host = PeerId::new();
    let viewer = PeerId::new();
    let code = pair(&relay, &signaling, host, viewer).await.unwrap();

    relay.handle_disconnect(viewer).await;
    relay.handle_disconnect(viewer).await;

    assert_eq!(
        signaling.count_for(&host, |s| *s == RelaySignal::ViewerDisconnected),
        1
    );
    assert_eq!(relay.registry().room(&code).await.unwrap().viewer, None);

    let next = PeerId::new();
    relay
        .handle_message(
            next,
            ClientSignal::Join {
                code: code.to_string(),
            },
        )
        .await;
    assert_eq!(
        signaling.signals_for(&next),
        vec![RelaySignal::join_accepted(host)]
    );
}

#[tokio::test]
async fn test_leave_behaves_like_disconnect() {
    init_tracing();

    let (relay, signaling, _signal_rx) = create_test_relay();
    let host = PeerId::new();
    let viewer = PeerId::new();
    pair(&relay, &signaling, host, viewer).await.unwrap();

    relay.handle_message(viewer, ClientSignal::Leave).await;

    assert_eq!(
        signaling.count_for(&host, |s| *s == RelaySignal::ViewerDisconnected),
        1
    );
    assert!(relay.registry().lookup(&viewer).await.is_none());
}
