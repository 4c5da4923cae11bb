//! Chat API integration tests
//!
//! Send/receive through the router with encryption at rest.

#[cfg(feature = "ssr")]
mod tests {
    use axum::http::{Method, StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use heyboo::backend::chat::MessageStore;
    use heyboo::shared::{AppConfig, PersistedMessage};

    use crate::common::{TestApp, TEST_SECRET};

    async fn send(app: &TestApp, token: &str, receiver: &str, content: &str) -> (StatusCode, serde_json::Value) {
        app.request(
            Method::POST,
            "/auth/chat/send",
            Some(token),
            Some(json!({ "receiver": receiver, "content": content })),
        )
        .await
    }

    #[tokio::test]
    async fn test_send_then_receive_roundtrip() {
        let app = TestApp::with_defaults();
        let alice = app.login("alice").await;
        let bob = app.login("bob").await;

        let (status, body) = send(&app, &alice, "bob", "meet at 7").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Message sent successfully" }));

        for token in [&alice, &bob] {
            let (status, body) = app.request(Method::GET, "/auth/chat/receive", Some(token), None).await;
            assert_eq!(status, StatusCode::OK);
            let messages = body["messages"].as_array().unwrap();
            assert_eq!(messages.len(), 1);
            assert_eq!(messages[0]["sender"], "alice");
            assert_eq!(messages[0]["receiver"], "bob");
            assert_eq!(messages[0]["content"], "meet at 7");
        }
    }

    #[tokio::test]
    async fn test_only_ciphertext_is_stored() {
        let app = TestApp::with_defaults();
        let alice = app.login("alice").await;
        send(&app, &alice, "bob", "meet at 7").await;

        let stored = app.messages.snapshot();
        assert_eq!(stored.len(), 1);
        assert_ne!(stored[0].ciphertext, "meet at 7");
        assert!(!stored[0].ciphertext.contains(&hex::encode("meet at 7")));
        assert!(stored[0].timestamp > 0);
    }

    #[tokio::test]
    async fn test_history_is_scoped_and_ordered() {
        let app = TestApp::with_defaults();
        let alice = app.login("alice").await;
        let bob = app.login("bob").await;
        let carol = app.login("carol").await;

        send(&app, &alice, "bob", "first").await;
        send(&app, &bob, "alice", "second").await;
        send(&app, &carol, "bob", "not for alice").await;

        let (_, body) = app.request(Method::GET, "/auth/chat/receive", Some(&alice), None).await;
        let contents: Vec<&str> = body["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["content"].as_str().unwrap())
            .collect();
        assert_eq!(contents, vec!["first", "second"]);

        let (_, body) = app.request(Method::GET, "/auth/chat/receive", Some(&bob), None).await;
        assert_eq!(body["messages"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_client_sender_is_ignored() {
        let app = TestApp::with_defaults();
        let alice = app.login("alice").await;

        let (status, _) = app
            .request(
                Method::POST,
                "/auth/chat/send",
                Some(&alice),
                Some(json!({
                    "sender": "mallory",
                    "receiver": "bob",
                    "content": "hello",
                    "timestamp": 42
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let stored = app.messages.snapshot();
        assert_eq!(stored[0].sender, "alice");
        assert_ne!(stored[0].timestamp, 42);
    }

    #[tokio::test]
    async fn test_empty_fields_rejected() {
        let app = TestApp::with_defaults();
        let alice = app.login("alice").await;

        let (status, body) = send(&app, &alice, "bob", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["category"], "bad_request");

        let (status, _) = send(&app, &alice, "", "hi").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(app.messages.is_empty());
    }

    #[tokio::test]
    async fn test_corrupted_ciphertext_fails_receive() {
        let app = TestApp::with_defaults();
        let alice = app.login("alice").await;
        send(&app, &alice, "bob", "meet at 7").await;

        let mut blob = hex::decode(&app.messages.snapshot()[0].ciphertext).unwrap();
        // first byte after the 12-byte nonce
        blob[12] ^= 0x01;
        assert!(app.messages.replace_ciphertext(0, hex::encode(&blob)));

        let (status, body) = app.request(Method::GET, "/auth/chat/receive", Some(&alice), None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["category"], "cipher");
        assert!(body.get("messages").is_none());
    }

    #[tokio::test]
    async fn test_missing_key_fails_send() {
        let app = TestApp::new(config_without_key());
        let alice = app.login("alice").await;

        let (status, body) = send(&app, &alice, "bob", "hello").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["category"], "cipher");
        assert_eq!(body["error"], "encryption key is not configured");
        assert!(app.messages.is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_fails_receive() {
        let app = TestApp::new(config_without_key());
        let alice = app.login("alice").await;
        app.messages
            .save_message(PersistedMessage {
                sender: "alice".to_string(),
                receiver: "bob".to_string(),
                ciphertext: "00".repeat(40),
                timestamp: 1,
            })
            .await
            .unwrap();

        let (status, body) = app.request(Method::GET, "/auth/chat/receive", Some(&alice), None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["category"], "cipher");
    }

    #[tokio::test]
    async fn test_empty_history() {
        let app = TestApp::with_defaults();
        let carol = app.login("carol").await;
        let (status, body) = app.request(Method::GET, "/auth/chat/receive", Some(&carol), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "messages": [] }));
    }

    fn config_without_key() -> AppConfig {
        AppConfig::builder().jwt_secret(TEST_SECRET).build().unwrap()
    }
}
