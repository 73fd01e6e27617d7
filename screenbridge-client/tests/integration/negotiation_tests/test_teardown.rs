use screenbridge_client::{LinkEvent, LinkState, RelayEvent, SessionError, SessionId, SessionStatus};
use screenbridge_core::{ClientSignal, PeerId, RelaySignal};

use crate::integration::init_tracing;
use crate::utils::{Harness, MOCK_OFFER};

#[tokio::test]
async fn test_viewer_leaving_keeps_the_room() {
    init_tracing();

    let mut h = Harness::start();
    h.host_with_viewer(PeerId::new()).await.unwrap();
    let first = h.factory.link(0);

    h.signal(RelaySignal::ViewerDisconnected).await;
    assert_eq!(
        h.next_status().await.unwrap(),
        SessionStatus::Closed {
            reason: "Viewer disconnected".to_owned()
        }
    );
    assert!(first.was_closed());

    // The code is still ours, so the next viewer gets a fresh session.
    let second_viewer = PeerId::new();
    h.signal(RelaySignal::ViewerArrived {
        viewer_id: second_viewer,
    })
    .await;
    assert_eq!(
        h.next_status().await.unwrap(),
        SessionStatus::ViewerArrived {
            viewer: second_viewer
        }
    );
    assert!(matches!(
        h.next_outbound().await.unwrap(),
        ClientSignal::Offer { target, .. } if target == second_viewer
    ));

    let second = h.factory.link(1);
    assert_eq!(second.session_id, SessionId(2));

    // Late events of the replaced session are dropped.
    first
        .emit(LinkEvent::StateChanged(SessionId(1), LinkState::Connected))
        .await;
    first
        .emit(LinkEvent::CandidateGenerated(
            SessionId(1),
            "stale".to_owned(),
        ))
        .await;
    second
        .emit(LinkEvent::StateChanged(SessionId(2), LinkState::Connected))
        .await;

    assert_eq!(h.next_status().await.unwrap(), SessionStatus::Connected);
    h.assert_quiet().await;
}

#[tokio::test]
async fn test_failed_link_is_torn_down() {
    init_tracing();

    let mut h = Harness::start();
    h.host_with_viewer(PeerId::new()).await.unwrap();
    let link = h.factory.link(0);

    link.emit(LinkEvent::StateChanged(link.session_id, LinkState::Connected))
        .await;
    assert_eq!(h.next_status().await.unwrap(), SessionStatus::Connected);

    link.emit(LinkEvent::StateChanged(link.session_id, LinkState::Failed))
        .await;
    assert_eq!(
        h.next_status().await.unwrap(),
        SessionStatus::Error(SessionError::ConnectivityLost)
    );
    assert_eq!(
        h.next_status().await.unwrap(),
        SessionStatus::Closed {
            reason: "Connection lost".to_owned()
        }
    );
    assert!(link.was_closed());
    assert_eq!(h.next_outbound().await.unwrap(), ClientSignal::Leave);

    // Further events from the dead link change nothing.
    link.emit(LinkEvent::StateChanged(link.session_id, LinkState::Closed))
        .await;
    h.assert_quiet().await;
}

#[tokio::test]
async fn test_relay_loss_resets_participant() {
    init_tracing();

    let mut h = Harness::start();
    h.host_with_viewer(PeerId::new()).await.unwrap();

    h.relay_event(RelayEvent::Disconnected).await;
    assert_eq!(
        h.next_status().await.unwrap(),
        SessionStatus::Closed {
            reason: "Relay connection lost".to_owned()
        }
    );
    assert!(h.factory.link(0).was_closed());

    h.relay_event(RelayEvent::Connected).await;
    assert_eq!(h.next_status().await.unwrap(), SessionStatus::RelayConnected);

    // The old room is gone with the old connection.
    h.signal(RelaySignal::ViewerArrived {
        viewer_id: PeerId::new(),
    })
    .await;
    h.assert_quiet().await;
    assert_eq!(h.factory.link_count(), 1);
}

#[tokio::test]
async fn test_host_leaving_closes_viewer_session() {
    init_tracing();

    let mut h = Harness::start();
    let host = PeerId::new();
    h.join_host(host).await.unwrap();
    h.signal(RelaySignal::Offer {
        sender: host,
        sdp: MOCK_OFFER.to_owned(),
    })
    .await;
    h.next_outbound().await.unwrap();

    h.signal(RelaySignal::HostDisconnected).await;
    assert_eq!(
        h.next_status().await.unwrap(),
        SessionStatus::Closed {
            reason: "Host disconnected".to_owned()
        }
    );
    assert!(h.factory.link(0).was_closed());

    // Offers from the old host are no longer accepted.
    h.signal(RelaySignal::Offer {
        sender: host,
        sdp: MOCK_OFFER.to_owned(),
    })
    .await;
    h.assert_quiet().await;
}

#[tokio::test]
async fn test_user_disconnect_leaves_room() {
    init_tracing();

    let mut h = Harness::start();
    h.host_with_viewer(PeerId::new()).await.unwrap();

    h.handle.disconnect();
    assert_eq!(
        h.next_status().await.unwrap(),
        SessionStatus::Closed {
            reason: "Disconnected by user".to_owned()
        }
    );
    assert_eq!(h.next_outbound().await.unwrap(), ClientSignal::Leave);
    assert!(h.factory.link(0).was_closed());
}

#[tokio::test]
async fn test_room_expiry_is_reported() {
    init_tracing();

    let mut h = Harness::start();
    let code = h.become_host().await.unwrap();

    h.signal(RelaySignal::RoomExpired { code: code.clone() })
        .await;
    assert_eq!(
        h.next_status().await.unwrap(),
        SessionStatus::RoomExpired(code)
    );
}
