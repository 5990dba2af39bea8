//! Integration tests for the Aneka Citra storefront.
//!
//! The tests talk to a running server over HTTP and expect the seed data
//! from `ac-cli seed` to be present.
//!
//! # Running Tests
//!
//! ```bash
//! ac-cli migrate && ac-cli seed
//! AUTH_RATE_LIMIT_BURST=1000 cargo run -p aneka-citra-storefront &
//! cargo test -p aneka-citra-integration-tests -- --ignored
//! ```
//!
//! # Environment
//!
//! - `STOREFRONT_URL` - Base URL of the server (default `http://localhost:3000`)
//! - `PAYMENT_CALLBACK_TOKEN` - Must match the server's callback token
//!
//! The server must list the seeded admin in `SUPER_ADMIN_EMAILS`.
//!
//! Every test signs in from the same address, so the suite needs a far larger
//! login budget than the default of 5 per client. Start the server with
//! `AUTH_RATE_LIMIT_BURST` raised as above; otherwise logins fail with 429.

use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde_json::{Value, json};

/// Seeded customer used by the order scenarios.
pub const SEED_CUSTOMER_EMAIL: &str = "fiqih@gmail.com";
/// Password of [`SEED_CUSTOMER_EMAIL`].
pub const SEED_CUSTOMER_PASSWORD: &str = "customer123";
/// Seeded admin.
pub const SEED_ADMIN_EMAIL: &str = "admin@anekacitra.com";
/// Password of [`SEED_ADMIN_EMAIL`].
pub const SEED_ADMIN_PASSWORD: &str = "admin123";

/// Header the payment simulator sends with its callback.
pub const CALLBACK_TOKEN_HEADER: &str = "x-callback-token";

/// Base URL for the storefront (configurable via environment).
#[must_use]
pub fn storefront_url() -> String {
    std::env::var("STOREFRONT_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Callback token shared with the server.
#[must_use]
pub fn callback_token() -> String {
    std::env::var("PAYMENT_CALLBACK_TOKEN").unwrap_or_default()
}

/// An email nobody has registered yet.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", uuid::Uuid::new_v4().simple())
}

/// A client with its own cookie jar, pointed at the storefront.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Create a context with an empty cookie jar.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: storefront_url(),
        }
    }

    /// Full URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET `path`.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be reached.
    #[allow(clippy::expect_used)]
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request")
    }

    /// Send `body` as JSON with `method` to `path`.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be reached.
    #[allow(clippy::expect_used)]
    pub async fn send_json(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &impl Serialize,
    ) -> Response {
        self.client
            .request(method, self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send JSON request")
    }

    /// POST `body` as JSON to `path`.
    pub async fn post_json(&self, path: &str, body: &impl Serialize) -> Response {
        self.send_json(reqwest::Method::POST, path, body).await
    }

    /// Sign in and keep the session cookie in this context's jar.
    ///
    /// # Panics
    ///
    /// Panics if the login is rejected.
    pub async fn login(&self, email: &str, password: &str) -> Value {
        let resp = self
            .post_json(
                "/api/auth/login",
                &json!({ "email": email, "password": password }),
            )
            .await;
        assert_ne!(
            resp.status(),
            StatusCode::TOO_MANY_REQUESTS,
            "login for {email} was rate limited; run the server with AUTH_RATE_LIMIT_BURST=1000"
        );
        assert_eq!(resp.status(), StatusCode::OK, "login failed for {email}");
        read_json(resp).await
    }

    /// A context already signed in as `email`.
    pub async fn signed_in(email: &str, password: &str) -> Self {
        let ctx = Self::new();
        ctx.login(email, password).await;
        ctx
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a response body as JSON.
///
/// # Panics
///
/// Panics if the body is not JSON.
#[allow(clippy::expect_used)]
pub async fn read_json(resp: Response) -> Value {
    resp.json().await.expect("Failed to parse JSON response")
}
