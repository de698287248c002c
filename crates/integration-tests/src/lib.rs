//! End-to-end test harness for Heating Oil Tracker.
//!
//! Each test starts its own server on an ephemeral port with a private
//! in-memory database, then drives it over HTTP with `reqwest`.
//!
//! ```bash
//! cargo test -p heating-oil-tracker-integration-tests
//! ```

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::SocketAddr;

use heating_oil_tracker_web::config::{ADMIN_EMAIL_VAR, AppConfig, COOKIE_SECRET_VAR, DB_PATH_VAR};
use heating_oil_tracker_web::db::IN_MEMORY;
use heating_oil_tracker_web::server;
use reqwest::{Client, Response, redirect};

/// Email the test server treats as the admin.
pub const ADMIN_EMAIL: &str = "boss@heatingoil.test";

/// Password used for every account the helpers create.
pub const PASSWORD: &str = "correct horse battery staple";

/// A running server plus the address it listens on.
pub struct TestApp {
    pub addr: SocketAddr,
}

impl TestApp {
    /// Start a fresh server with an empty database.
    pub async fn spawn() -> Self {
        let vars = HashMap::from([
            (DB_PATH_VAR, IN_MEMORY.to_string()),
            (COOKIE_SECRET_VAR, "Qw8#Lz2!Vn6&Tr4*Hy1@Mk9^Pb3%Xc7$".to_string()),
            (ADMIN_EMAIL_VAR, ADMIN_EMAIL.to_string()),
            (
                "HEATING_OIL_TRACKER_STATIC_DIR",
                concat!(env!("CARGO_MANIFEST_DIR"), "/../web/static").to_string(),
            ),
        ]);
        let config =
            AppConfig::from_lookup(|key| vars.get(key).cloned()).expect("test config is valid");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");

        tokio::spawn(async move {
            server::serve(listener, config, std::future::pending())
                .await
                .expect("server runs");
        });

        Self { addr }
    }

    /// Absolute URL for `path` on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// A browser-like client: keeps cookies, does not follow redirects.
    #[must_use]
    pub fn client() -> Client {
        Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()
            .expect("build client")
    }

    pub async fn get(&self, client: &Client, path: &str) -> Response {
        client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request")
    }

    pub async fn post_form(&self, client: &Client, path: &str, form: &[(&str, &str)]) -> Response {
        client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST request")
    }

    pub async fn join_waitlist(&self, client: &Client, email: &str) -> Response {
        self.post_form(client, "/join-waitlist", &[("email", email)])
            .await
    }

    pub async fn sign_up(&self, client: &Client, name: &str, email: &str) -> Response {
        self.post_form(
            client,
            "/auth/sign-up",
            &[("name", name), ("email", email), ("password", PASSWORD)],
        )
        .await
    }

    pub async fn sign_in(&self, client: &Client, email: &str, password: &str) -> Response {
        self.post_form(
            client,
            "/auth/sign-in",
            &[("email", email), ("password", password)],
        )
        .await
    }

    /// Register an account and sign it in on `client`.
    pub async fn signed_in(&self, client: &Client, name: &str, email: &str) {
        let response = self.sign_up(client, name, email).await;
        assert_eq!(response.status(), 200, "sign-up succeeds");
        let response = self.sign_in(client, email, PASSWORD).await;
        assert_eq!(response.status(), 200, "sign-in succeeds");
    }
}

/// Response body as text.
pub async fn body(response: Response) -> String {
    response.text().await.expect("read body")
}

/// `Location` header of a redirect.
#[must_use]
pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
}
