//! Session lifecycle integration tests
//!
//! Handshake rejection, termination paths and token-gated connections.

#[cfg(feature = "ssr")]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::common::{assert_closed, assert_silent, connect, next_event, open, test_config, TestApp};

    #[tokio::test]
    async fn test_missing_identity_rejected_silently() {
        let app = TestApp::with_defaults();
        let addr = app.spawn().await;
        let mut alice = connect(addr, "alice", "c1").await;

        for query in ["couple_id=c1", "username=bob", "username=&couple_id=c1", ""] {
            let mut client = open(addr, query).await.unwrap();
            assert_closed(&mut client).await;
        }

        assert_silent(&mut alice).await;
        assert_eq!(app.state.sessions.registry().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_payload_closes_and_announces() {
        let app = TestApp::with_defaults();
        let addr = app.spawn().await;

        let mut alice = connect(addr, "alice", "c1").await;
        let mut bob = connect(addr, "bob", "c1").await;
        next_event(&mut alice).await;

        use futures_util::SinkExt;
        bob.send(tokio_tungstenite::tungstenite::Message::Text("{\"type\":\"chat_mess".into()))
            .await
            .unwrap();
        assert_closed(&mut bob).await;

        let left = next_event(&mut alice).await;
        assert_eq!(left["type"], "user_left");
        assert_eq!(left["sender"], "bob");
        assert_silent(&mut alice).await;
    }

    #[tokio::test]
    async fn test_unknown_event_type_is_malformed() {
        let app = TestApp::with_defaults();
        let addr = app.spawn().await;

        let mut alice = connect(addr, "alice", "c1").await;
        crate::common::send(&mut alice, json!({ "type": "user_joined", "content": "" })).await;
        assert_closed(&mut alice).await;

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(app.state.sessions.registry().is_empty());
    }

    #[tokio::test]
    async fn test_abrupt_drop_emits_single_left() {
        let app = TestApp::with_defaults();
        let addr = app.spawn().await;

        let mut alice = connect(addr, "alice", "c1").await;
        let bob = connect(addr, "bob", "c1").await;
        next_event(&mut alice).await;

        drop(bob);
        let left = next_event(&mut alice).await;
        assert_eq!(left["type"], "user_left");
        assert_eq!(left["sender"], "bob");
        assert_silent(&mut alice).await;
    }

    #[tokio::test]
    async fn test_required_token_gates_upgrade() {
        let app = TestApp::new(test_config().ws_require_token(true).build().unwrap());
        let addr = app.spawn().await;

        assert!(open(addr, "username=alice&couple_id=c1").await.is_err());
        assert!(open(addr, "couple_id=c1&token=garbage").await.is_err());

        let token = app.login("alice").await;
        let mut client = open(addr, &format!("username=mallory&couple_id=c1&token={}", token))
            .await
            .unwrap();
        let joined = next_event(&mut client).await;
        assert_eq!(joined["type"], "user_joined");
        assert_eq!(joined["sender"], "alice");
    }
}
