//! Common test utilities for E2E tests

use peerlens::{config, AppState};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        // Create temporary directory for test database
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        // Create test configuration
        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
                cors_allowed_origin: None,
            },
            database: config::DatabaseConfig {
                path: db_path.clone(),
            },
            auth: config::AuthConfig {
                jwt_secret: "test-secret-key-32-bytes-long!!!".to_string(),
                issuer: "PeerLens".to_string(),
                audience: "PeerLensClient".to_string(),
                token_ttl_days: 7,
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        // Initialize app state
        let state = AppState::new(config).await.unwrap();

        // Create HTTP client
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        // Build router
        let app = peerlens::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Register an account through the API.
    ///
    /// Returns the bearer token and the new account's id.
    pub async fn register(&self, username: &str) -> (String, String) {
        let response = self
            .client
            .post(self.url("/auth/register"))
            .json(&serde_json::json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": "s3cret-password",
                "display_name": username,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200, "registration must succeed");

        let body: serde_json::Value = response.json().await.unwrap();
        let token = body["token"].as_str().unwrap().to_string();
        let user_id = body["user"]["id"].as_str().unwrap().to_string();
        (token, user_id)
    }

    /// Create a post through the API, returning its id.
    pub async fn create_post(&self, token: &str, image_url: &str, caption: &str) -> i64 {
        let response = self
            .client
            .post(self.url("/posts"))
            .bearer_auth(token)
            .json(&serde_json::json!({
                "image_url": image_url,
                "caption": caption,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201, "post creation must succeed");

        let body: serde_json::Value = response.json().await.unwrap();
        body["id"].as_i64().unwrap()
    }

    /// Establish a follow edge through the API.
    pub async fn follow(&self, token: &str, followee_id: &str) {
        let response = self
            .client
            .post(self.url(&format!("/users/follow/{followee_id}")))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200, "follow must succeed");
    }
}
