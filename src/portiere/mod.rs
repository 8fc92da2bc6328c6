//! Gateway assembly: shared state, router and server entry point.

pub mod admin_check;
pub mod config;
pub mod guard;
pub mod handlers;
pub mod oauth;
mod openapi;
pub mod proxy;
pub mod session;

use crate::portiere::{config::Config, oauth::GoogleOAuth, session::SessionKeys};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::{any, get, post},
    Extension, Router,
};
use reqwest::Client;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

/// Shared per-process state: configuration, session keys, the outbound HTTP
/// client and the OAuth client.
pub struct Gate {
    config: Config,
    keys: SessionKeys,
    http: Client,
    oauth: GoogleOAuth,
}

impl Gate {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(config: Config) -> Result<Self> {
        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        let keys = SessionKeys::new(config.session_secret(), config.session_ttl_seconds());

        let oauth = GoogleOAuth::new(
            config.google_client_id().to_string(),
            config.google_client_secret().clone(),
            config.redirect_uri(),
        );

        Ok(Self {
            config,
            keys,
            http,
            oauth,
        })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn keys(&self) -> &SessionKeys {
        &self.keys
    }

    #[must_use]
    pub fn http(&self) -> &Client {
        &self.http
    }

    #[must_use]
    pub fn oauth(&self) -> &GoogleOAuth {
        &self.oauth
    }
}

/// Build the full router, including the route guard and request tracing.
#[must_use]
pub fn router(gate: Arc<Gate>) -> Router {
    Router::new()
        .route("/", get(handlers::pages::index))
        .route("/login", get(handlers::pages::login))
        .route("/admin/dashboard", get(handlers::pages::dashboard))
        .route("/health", get(handlers::health::health))
        .route("/auth/login", get(handlers::auth::login))
        .route("/auth/callback", get(handlers::auth::callback))
        .route("/auth/session", get(handlers::auth::session))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/api/*path", any(proxy::proxy))
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", openapi::ApiDoc::openapi()),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(gate))
                .layer(middleware::from_fn(guard::admin_gate)),
        )
}

/// Start the server
///
/// # Errors
///
/// Return error if failed to start the server
pub async fn new(port: u16, config: Config) -> Result<()> {
    let gate = Arc::new(Gate::new(config)?);
    let app = router(gate);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
