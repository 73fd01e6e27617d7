use screenbridge_client::{LinkEvent, LinkState, SessionError, SessionStatus};
use screenbridge_core::{ControlEvent, ControlMessage, PeerId, RelaySignal};

use crate::integration::init_tracing;
use crate::utils::{Harness, MOCK_OFFER, MockControlChannel, eventually};

async fn connected_viewer(h: &mut Harness, host: PeerId) {
    h.join_host(host).await.unwrap();
    h.signal(RelaySignal::Offer {
        sender: host,
        sdp: MOCK_OFFER.to_owned(),
    })
    .await;
    h.next_outbound().await.unwrap();
}

#[tokio::test]
async fn test_viewer_controls_after_channel_opens() {
    init_tracing();

    let mut h = Harness::start();
    let host = PeerId::new();
    connected_viewer(&mut h, host).await;
    let link = h.factory.link(0);

    // Not connected yet.
    h.handle.enable_control();
    assert_eq!(
        h.next_status().await.unwrap(),
        SessionStatus::Error(SessionError::TransportUnavailable)
    );

    let channel = MockControlChannel::new();
    link.emit(LinkEvent::ControlChannelReady(
        link.session_id,
        channel.clone(),
    ))
    .await;
    link.emit(LinkEvent::StateChanged(link.session_id, LinkState::Connected))
        .await;
    assert_eq!(h.next_status().await.unwrap(), SessionStatus::Connected);

    h.handle.enable_control();
    assert_eq!(h.next_status().await.unwrap(), SessionStatus::ControlEnabled);
    assert_eq!(h.cursor.toggles(), vec![true]);

    h.handle.capture(ControlEvent::ButtonDown {
        button: 0,
        x: 0.4,
        y: 0.6,
    });
    assert!(eventually(|| channel.sent().len() == 1).await);
    assert_eq!(
        channel.messages()[0].clone().into_events(),
        vec![ControlEvent::ButtonDown {
            button: 0,
            x: 0.4,
            y: 0.6,
        }]
    );

    h.handle.capture(ControlEvent::Move { x: 0.5, y: 0.5 });
    assert!(eventually(|| channel.sent().len() == 2).await);
    assert!(matches!(
        channel.messages()[1],
        ControlMessage::Batch { .. }
    ));

    h.handle.disable_control();
    assert_eq!(h.next_status().await.unwrap(), SessionStatus::ControlDisabled);
    assert_eq!(h.cursor.toggles(), vec![true, false]);

    // Captures while disabled go nowhere.
    h.handle.capture(ControlEvent::KeyUp {
        key: "x".to_owned(),
        code: "KeyX".to_owned(),
        modifiers: Default::default(),
    });
    h.assert_quiet().await;
    assert_eq!(channel.sent().len(), 2);
}

#[tokio::test]
async fn test_teardown_releases_control() {
    init_tracing();

    let mut h = Harness::start();
    let host = PeerId::new();
    connected_viewer(&mut h, host).await;
    let link = h.factory.link(0);

    let channel = MockControlChannel::new();
    link.emit(LinkEvent::ControlChannelReady(
        link.session_id,
        channel.clone(),
    ))
    .await;
    link.emit(LinkEvent::StateChanged(link.session_id, LinkState::Connected))
        .await;
    assert_eq!(h.next_status().await.unwrap(), SessionStatus::Connected);

    h.handle.enable_control();
    assert_eq!(h.next_status().await.unwrap(), SessionStatus::ControlEnabled);

    h.signal(RelaySignal::HostDisconnected).await;
    assert_eq!(h.next_status().await.unwrap(), SessionStatus::ControlDisabled);
    assert!(matches!(
        h.next_status().await.unwrap(),
        SessionStatus::Closed { .. }
    ));
    assert_eq!(h.cursor.toggles(), vec![true, false]);
}

#[tokio::test]
async fn test_host_cannot_enable_control() {
    init_tracing();

    let mut h = Harness::start();
    h.host_with_viewer(PeerId::new()).await.unwrap();
    let link = h.factory.link(0);
    link.emit(LinkEvent::StateChanged(link.session_id, LinkState::Connected))
        .await;
    assert_eq!(h.next_status().await.unwrap(), SessionStatus::Connected);

    h.handle.enable_control();
    assert_eq!(
        h.next_status().await.unwrap(),
        SessionStatus::Error(SessionError::TransportUnavailable)
    );
}
