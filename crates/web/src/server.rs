//! Application assembly: database, session store, router and serve loop.

use std::future::Future;

use axum::{Router, body::Body, http::Request, middleware as axum_middleware};
use sqlx::migrate::MigrateError;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tower_sessions_sqlx_store::SqliteStore;
use tracing::Level;

use crate::config::AppConfig;
use crate::state::AppState;
use crate::{db, middleware, routes};

/// Errors that stop the server from starting or keep it from serving.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] MigrateError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A migrated database plus the state handlers share.
pub struct App {
    pub state: AppState,
    pub session_store: SqliteStore,
}

impl App {
    /// Open the database, apply migrations and prepare the session table.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the database cannot be opened or migrated.
    pub async fn prepare(config: AppConfig) -> Result<Self, ServerError> {
        let pool = db::create_pool(&config.database_path).await?;
        tracing::info!(path = %config.database_path, "Database pool created");

        db::run_migrations(&pool).await?;
        let session_store = middleware::create_session_store(&pool).await?;
        tracing::info!("Migrations applied");

        Ok(Self {
            state: AppState::new(config, pool),
            session_store,
        })
    }

    /// Build the router with the full middleware stack.
    #[must_use]
    pub fn router(&self) -> Router {
        let config = self.state.config();
        let session_layer =
            middleware::create_session_layer(self.session_store.clone(), config);

        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            })
            .on_response(DefaultOnResponse::new().level(Level::INFO));

        Router::new()
            .merge(routes::routes())
            .nest_service("/static", ServeDir::new(&config.static_dir))
            .fallback(routes::not_found)
            .layer(session_layer)
            .layer(axum_middleware::from_fn(
                middleware::security_headers_middleware,
            ))
            .layer(axum_middleware::from_fn(middleware::request_id_middleware))
            .layer(trace_layer)
            .with_state(self.state.clone())
            // Sentry layers (outermost for full request coverage)
            .layer(sentry_tower::NewSentryLayer::new_from_top())
            .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
    }
}

/// Serve the site on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns `ServerError` if startup fails or the server stops with an I/O error.
pub async fn serve(
    listener: TcpListener,
    config: AppConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    let app = App::prepare(config).await?;
    let cleanup = middleware::spawn_expired_session_cleanup(app.session_store.clone());
    let router = app.router();

    tracing::info!(addr = %listener.local_addr()?, "heating oil tracker listening");

    let result = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await;

    cleanup.abort();
    result.map_err(ServerError::from)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::{ADMIN_EMAIL_VAR, COOKIE_SECRET_VAR, DB_PATH_VAR};
    use crate::middleware::session::{SESSION_COOKIE_NAME, cookie_key};
    use crate::models::session_keys;
    use crate::routes::page::GENERIC_ERROR;
    use axum::http::{
        StatusCode,
        header::{CONTENT_TYPE, COOKIE, LOCATION},
    };
    use tower::ServiceExt;
    use tower_sessions::SessionStore;
    use tower_sessions::cookie::time::{Duration, OffsetDateTime};
    use tower_sessions::cookie::{Cookie, CookieJar};
    use tower_sessions::session::{Id, Record};

    async fn test_app() -> App {
        let config = AppConfig::from_lookup(|key: &str| match key {
            DB_PATH_VAR => Some(db::IN_MEMORY.to_string()),
            COOKIE_SECRET_VAR => Some("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%".to_string()),
            ADMIN_EMAIL_VAR => Some("admin@heatingoil.test".to_string()),
            _ => None,
        })
        .unwrap();
        App::prepare(config).await.unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_form(uri: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    /// Store `data` as a session record; returns its ID and a `Cookie` header selecting it.
    async fn seeded_session(app: &App, data: serde_json::Value) -> (Id, String) {
        let mut record = Record {
            id: Id::default(),
            data: [(session_keys::CURRENT_USER.to_string(), data)].into(),
            expiry_date: OffsetDateTime::now_utc() + Duration::hours(1),
        };
        app.session_store.create(&mut record).await.unwrap();

        let mut jar = CookieJar::new();
        jar.private_mut(&cookie_key(app.state.config()))
            .add(Cookie::new(SESSION_COOKIE_NAME, record.id.to_string()));
        let value = jar.get(SESSION_COOKIE_NAME).unwrap().value().to_owned();
        (record.id, format!("{SESSION_COOKIE_NAME}={value}"))
    }

    #[tokio::test]
    async fn test_health_and_readiness() {
        let app = test_app().await;

        let response = app.router().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.router().oneshot(get("/health/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_gated_pages_redirect_without_session() {
        let app = test_app().await;

        for path in ["/dashboard", "/admin"] {
            let response = app.router().oneshot(get(path)).await.unwrap();
            assert_eq!(response.status(), StatusCode::FOUND, "{path}");
            assert_eq!(response.headers()[LOCATION], "/");
        }
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = test_app().await;

        let response = app.router().oneshot(get("/missing")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_waitlist_success_keeps_form() {
        let app = test_app().await;

        let response = app
            .router()
            .oneshot(post_form("/join-waitlist", "email=new%40example.com"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("You are on the list"));
        assert!(html.contains("action=\"/join-waitlist\""));
        assert!(html.contains("value=\"\""));
    }

    #[tokio::test]
    async fn test_waitlist_database_failure_is_generic_500() {
        let app = test_app().await;
        sqlx::query("DROP TABLE leads")
            .execute(app.state.pool())
            .await
            .unwrap();

        let response = app
            .router()
            .oneshot(post_form("/join-waitlist", "email=new%40example.com"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(response).await.contains(GENERIC_ERROR));
    }

    #[tokio::test]
    async fn test_sign_up_database_failure_is_generic_500() {
        let app = test_app().await;
        sqlx::query("DROP TABLE users")
            .execute(app.state.pool())
            .await
            .unwrap();

        let response = app
            .router()
            .oneshot(post_form(
                "/auth/sign-up",
                "name=Ann&email=ann%40example.com&password=pw",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(response).await.contains(GENERIC_ERROR));
    }

    #[tokio::test]
    async fn test_sign_in_database_failure_is_generic_500() {
        let app = test_app().await;
        sqlx::query("DROP TABLE users")
            .execute(app.state.pool())
            .await
            .unwrap();

        let response = app
            .router()
            .oneshot(post_form(
                "/auth/sign-in",
                "email=ann%40example.com&password=pw",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(response).await.contains(GENERIC_ERROR));
    }

    #[tokio::test]
    async fn test_valid_session_reaches_dashboard() {
        let app = test_app().await;
        let (_, cookie) = seeded_session(
            &app,
            serde_json::json!({
                "id": 1,
                "name": "Ann",
                "email": "ann@example.com",
                "role": "user",
            }),
        )
        .await;

        let request = Request::builder()
            .uri("/dashboard")
            .header(COOKIE, cookie)
            .body(Body::empty())
            .unwrap();
        let response = app.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Welcome, Ann"));
    }

    #[tokio::test]
    async fn test_undecodable_session_is_500_and_discarded() {
        let app = test_app().await;
        let (id, cookie) = seeded_session(&app, serde_json::json!("not a user")).await;

        let request = Request::builder()
            .uri("/")
            .header(COOKIE, cookie)
            .body(Body::empty())
            .unwrap();
        let response = app.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "Internal server error");

        assert!(app.session_store.load(&id).await.unwrap().is_none());
    }
}
