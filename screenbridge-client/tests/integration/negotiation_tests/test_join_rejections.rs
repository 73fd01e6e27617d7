use screenbridge_client::{SessionError, SessionStatus};
use screenbridge_core::{ClientSignal, RelaySignal};

use crate::integration::init_tracing;
use crate::utils::Harness;

#[tokio::test]
async fn test_malformed_code_never_reaches_relay() {
    init_tracing();

    let mut h = Harness::start();
    h.handle.join("12-34");

    assert_eq!(
        h.next_status().await.unwrap(),
        SessionStatus::Error(SessionError::InvalidCode)
    );
    h.assert_quiet().await;
}

#[tokio::test]
async fn test_typed_code_is_normalized() {
    init_tracing();

    let mut h = Harness::start();
    h.handle.join(" 123 456789 ");

    assert_eq!(
        h.next_outbound().await.unwrap(),
        ClientSignal::Join {
            code: "123-456-789".to_owned()
        }
    );
}

#[tokio::test]
async fn test_relay_rejections_are_typed() {
    init_tracing();

    let mut h = Harness::start();

    h.handle.join("987-654-321");
    h.next_outbound().await.unwrap();
    h.signal(RelaySignal::join_rejected("Room is full")).await;
    assert_eq!(
        h.next_status().await.unwrap(),
        SessionStatus::Error(SessionError::RoomFull)
    );

    h.handle.join("111-222-333");
    h.next_outbound().await.unwrap();
    h.signal(RelaySignal::join_rejected("Invalid sharing code"))
        .await;
    assert_eq!(
        h.next_status().await.unwrap(),
        SessionStatus::Error(SessionError::InvalidCode)
    );

    h.assert_quiet().await;
    assert_eq!(h.factory.link_count(), 0);
}
