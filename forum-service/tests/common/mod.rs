use std::sync::Arc;

use auth::Authenticator;
use auth::HashingCost;
use auth::ManualClock;
use auth::PasswordHasher;
use auth::TokenCodec;
use chrono::Duration;
use chrono::TimeZone;
use chrono::Utc;
use forum_service::domain::security::AuthorizationPolicy;
use forum_service::inbound::http::router::create_router;
use forum_service::outbound::repositories::InMemoryUserRepository;
use serde_json::json;

pub const SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const TTL_MS: i64 = 7_200_000;
pub const PASSWORD: &str = "Passw0rd!";

/// Test application that spawns a real server over an in-memory store.
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub repository: Arc<InMemoryUserRepository>,
    pub clock: Arc<ManualClock>,
    /// Same secret, TTL and clock as the server's codec.
    pub token_codec: TokenCodec,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let clock = Arc::new(ManualClock::new(Utc.timestamp_opt(1_700_000_000, 0).unwrap()));
        let ttl = Duration::milliseconds(TTL_MS);

        // Cheap cost: tests hash many passwords.
        let password_hasher = PasswordHasher::with_cost(HashingCost {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .expect("Failed to create password hasher");

        let authenticator = Arc::new(Authenticator::new(
            password_hasher,
            TokenCodec::with_clock(SECRET, ttl, clock.clone()),
        ));
        let repository = Arc::new(InMemoryUserRepository::new());

        let router = create_router(
            Arc::clone(&repository),
            authenticator,
            AuthorizationPolicy::forum(),
        );

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::new(),
            repository,
            token_codec: TokenCodec::with_clock(SECRET, ttl, clock.clone()),
            clock,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(&format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(&format!("{}{}", self.address, path))
    }

    /// Helper to make PUT request
    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.put(&format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make PUT request with Bearer token
    pub fn put_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.put(path).bearer_auth(token)
    }

    /// Register through the API, panicking on anything but 201.
    pub async fn register(&self, username: &str, email: &str) {
        let response = self
            .post("/auth/register")
            .json(&json!({
                "username": username,
                "email": email,
                "password": PASSWORD
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    }

    /// Log in through the API and return the issued token.
    pub async fn login(&self, login: &str, password: &str) -> reqwest::Response {
        self.post("/auth/login")
            .json(&json!({
                "login": login,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Register `username` and return a token obtained through login.
    pub async fn register_and_login(&self, username: &str, email: &str) -> String {
        self.register(username, email).await;

        let response = self.login(username, PASSWORD).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"]["token"]
            .as_str()
            .expect("Missing token")
            .to_string()
    }
}
