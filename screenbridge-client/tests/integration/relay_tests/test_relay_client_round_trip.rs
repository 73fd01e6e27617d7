use screenbridge_client::{RelayClient, RelayClientConfig, RelayEvent, RelaySink};
use screenbridge_core::{ClientSignal, RelaySignal, is_valid_code};
use std::time::Duration;

use crate::integration::init_tracing;
use crate::utils::{next_relay_event, spawn_relay};

#[tokio::test]
async fn test_relay_client_round_trip() {
    init_tracing();

    let (addr, _server) = spawn_relay().await.unwrap();
    let config = RelayClientConfig::new(format!("ws://{}/ws", addr))
        .backoff(Duration::from_millis(10), Duration::from_millis(50));
    let (handle, mut events, task) = RelayClient::spawn(config);

    assert_eq!(
        next_relay_event(&mut events).await.unwrap(),
        RelayEvent::Connected
    );
    assert!(matches!(
        next_relay_event(&mut events).await.unwrap(),
        RelayEvent::Signal(RelaySignal::Welcome { .. })
    ));
    assert!(matches!(
        next_relay_event(&mut events).await.unwrap(),
        RelayEvent::Signal(RelaySignal::IceConfig { ice_servers }) if !ice_servers.is_empty()
    ));

    assert!(handle.send(ClientSignal::RequestCode));
    match next_relay_event(&mut events).await.unwrap() {
        RelayEvent::Signal(RelaySignal::CodeReply {
            success: true,
            code: Some(code),
        }) => assert!(is_valid_code(code.as_str())),
        other => panic!("Expected a code, got {:?}", other),
    }

    // Dropping the last handle stops the client.
    drop(handle);
    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("relay client did not stop")
        .unwrap();
}
