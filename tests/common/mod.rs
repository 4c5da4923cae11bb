//! Common test utilities and helpers
//!
//! - App fixtures over in-memory stores
//! - `oneshot` request helpers for the REST surface
//! - A real listener plus WebSocket client helpers for the real-time channel

#![cfg(feature = "ssr")]
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{timeout, Duration};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;

use heyboo::backend::auth::MemoryCredentialStore;
use heyboo::backend::chat::MemoryMessageStore;
use heyboo::backend::routes::create_router;
use heyboo::backend::server::{build_state, AppState, Stores};
use heyboo::shared::{AppConfig, AppConfigBuilder};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TEST_KEY_HEX: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";
pub const TEST_PASSWORD: &str = "password123";

const EVENT_TIMEOUT: Duration = Duration::from_secs(2);

pub type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Configuration with both secrets set
pub fn test_config() -> AppConfigBuilder {
    AppConfig::builder()
        .jwt_secret(TEST_SECRET)
        .encryption_key(TEST_KEY_HEX)
}

/// App over in-memory stores; alice, bob and carol can log in
pub struct TestApp {
    pub state: AppState,
    pub messages: Arc<MemoryMessageStore>,
    pub router: Router,
}

impl TestApp {
    pub fn new(config: AppConfig) -> Self {
        let credentials = MemoryCredentialStore::with_cost(4);
        for user in ["alice", "bob", "carol"] {
            credentials.add_user(user, TEST_PASSWORD).unwrap();
        }
        let messages = Arc::new(MemoryMessageStore::new());
        let stores = Stores {
            messages: messages.clone(),
            credentials: Arc::new(credentials),
        };

        let state = build_state(config, stores).unwrap();
        let router = create_router(state.clone());
        Self {
            state,
            messages,
            router,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(test_config().build().unwrap())
    }

    /// Issue a request through the router and decode the JSON body
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    /// Log in and return the token
    pub async fn login(&self, username: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/login",
                None,
                Some(serde_json::json!({ "username": username, "password": TEST_PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["token"].as_str().unwrap().to_string()
    }

    /// Serve the app on an ephemeral port
    pub async fn spawn(&self) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }
}

/// Open a raw connection without waiting for anything
pub async fn open(addr: SocketAddr, query: &str) -> Result<Client, tokio_tungstenite::tungstenite::Error> {
    let url = format!("ws://{}/ws?{}", addr, query);
    tokio_tungstenite::connect_async(url).await.map(|(client, _)| client)
}

/// Connect and wait for our own `user_joined`, so the session is registered
pub async fn connect(addr: SocketAddr, username: &str, couple_id: &str) -> Client {
    let mut client = open(addr, &format!("username={}&couple_id={}", username, couple_id))
        .await
        .unwrap();
    let joined = next_event(&mut client).await;
    assert_eq!(joined["type"], "user_joined");
    assert_eq!(joined["sender"], username);
    client
}

/// Next JSON event, skipping control frames
pub async fn next_event(client: &mut Client) -> Value {
    loop {
        let frame = timeout(EVENT_TIMEOUT, client.next())
            .await
            .expect("timed out waiting for event")
            .expect("connection ended")
            .expect("read failed");
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// Assert nothing arrives within a short window
pub async fn assert_silent(client: &mut Client) {
    if let Ok(Some(Ok(Message::Text(text)))) = timeout(Duration::from_millis(200), client.next()).await {
        panic!("unexpected event: {}", text.as_str());
    }
}

/// Assert the server closes the connection
pub async fn assert_closed(client: &mut Client) {
    loop {
        match timeout(EVENT_TIMEOUT, client.next()).await.expect("connection stayed open") {
            None | Some(Err(_)) | Some(Ok(Message::Close(_))) => return,
            Some(Ok(Message::Text(text))) => panic!("unexpected event: {}", text.as_str()),
            Some(Ok(_)) => continue,
        }
    }
}

/// Send an inbound frame
pub async fn send(client: &mut Client, frame: Value) {
    client.send(Message::Text(frame.to_string().into())).await.unwrap();
}
