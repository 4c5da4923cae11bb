//! Real-time broadcast integration tests
//!
//! Real listener, real WebSocket clients.

#[cfg(feature = "ssr")]
mod tests {
    use futures_util::{SinkExt, StreamExt};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio_tungstenite::tungstenite::Message;

    use crate::common::{assert_silent, connect, next_event, send, TestApp};

    #[tokio::test]
    async fn test_three_client_scenario() {
        let app = TestApp::with_defaults();
        let addr = app.spawn().await;

        let mut alice = connect(addr, "alice", "c1").await;
        let mut bob = connect(addr, "bob", "c1").await;
        let bob_joined = next_event(&mut alice).await;
        assert_eq!(bob_joined["type"], "user_joined");
        assert_eq!(bob_joined["sender"], "bob");
        assert_eq!(bob_joined["content"], "");

        let mut carol = connect(addr, "carol", "c2").await;
        assert_eq!(app.state.sessions.registry().len(), 3);

        send(&mut alice, json!({ "type": "chat_message", "content": "hi" })).await;

        for client in [&mut alice, &mut bob] {
            let event = next_event(client).await;
            assert_eq!(event["type"], "chat_message");
            assert_eq!(event["sender"], "alice");
            assert_eq!(event["couple_id"], "c1");
            assert_eq!(event["content"], "hi");
            assert!(event["timestamp"].as_i64().unwrap() > 0);
        }
        assert_silent(&mut carol).await;

        bob.close(None).await.unwrap();
        let left = next_event(&mut alice).await;
        assert_eq!(left["type"], "user_left");
        assert_eq!(left["sender"], "bob");
        assert_eq!(left["couple_id"], "c1");

        let remaining = app.state.sessions.registry().sessions_in_scope("c1");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].username(), "alice");
        assert_silent(&mut carol).await;
    }

    #[tokio::test]
    async fn test_client_cannot_spoof_sender_or_scope() {
        let app = TestApp::with_defaults();
        let addr = app.spawn().await;

        let mut alice = connect(addr, "alice", "c1").await;
        let mut carol = connect(addr, "carol", "c2").await;

        send(
            &mut alice,
            json!({
                "type": "chat_message",
                "content": "sneaky",
                "sender": "carol",
                "couple_id": "c2",
                "timestamp": 1
            }),
        )
        .await;

        let event = next_event(&mut alice).await;
        assert_eq!(event["sender"], "alice");
        assert_eq!(event["couple_id"], "c1");
        assert_ne!(event["timestamp"], 1);
        assert_silent(&mut carol).await;
    }

    #[tokio::test]
    async fn test_typing_events_carry_no_content() {
        let app = TestApp::with_defaults();
        let addr = app.spawn().await;

        let mut alice = connect(addr, "alice", "c1").await;
        let mut bob = connect(addr, "bob", "c1").await;
        next_event(&mut alice).await;

        send(&mut bob, json!({ "type": "typing_start", "content": "ignored" })).await;
        send(&mut bob, json!({ "type": "typing_stop" })).await;

        let start = next_event(&mut alice).await;
        assert_eq!(start["type"], "typing_start");
        assert_eq!(start["sender"], "bob");
        assert_eq!(start["content"], "");
        assert_eq!(next_event(&mut alice).await["type"], "typing_stop");
    }

    #[tokio::test]
    async fn test_events_arrive_in_publish_order() {
        let app = TestApp::with_defaults();
        let addr = app.spawn().await;

        let mut alice = connect(addr, "alice", "c1").await;
        let mut bob = connect(addr, "bob", "c1").await;
        next_event(&mut alice).await;

        for i in 0..25 {
            send(&mut alice, json!({ "type": "chat_message", "content": i.to_string() })).await;
        }
        for i in 0..25 {
            assert_eq!(next_event(&mut bob).await["content"], i.to_string());
        }
    }

    #[tokio::test]
    async fn test_burst_does_not_drop_reading_partner() {
        const BURST: usize = 1000;

        let app = TestApp::with_defaults();
        assert!(BURST > app.state.config.outbound_capacity);
        let addr = app.spawn().await;

        let mut alice = connect(addr, "alice", "c1").await;
        let bob = connect(addr, "bob", "c1").await;
        assert_eq!(next_event(&mut alice).await["type"], "user_joined");

        let reader = tokio::spawn(async move {
            let mut received = 0;
            while received < BURST {
                let event = next_event(&mut alice).await;
                assert_ne!(event["type"], "user_left", "partner dropped after {} events", received);
                assert_eq!(event["sender"], "bob");
                received += 1;
            }
            received
        });

        let (mut bob_tx, mut bob_rx) = bob.split();
        tokio::spawn(async move { while bob_rx.next().await.is_some() {} });
        let frame = json!({ "type": "typing_start" }).to_string();
        for _ in 0..BURST {
            bob_tx.send(Message::Text(frame.clone().into())).await.unwrap();
        }

        assert_eq!(reader.await.unwrap(), BURST);
        assert_eq!(app.state.sessions.registry().sessions_in_scope("c1").len(), 2);
    }
}
