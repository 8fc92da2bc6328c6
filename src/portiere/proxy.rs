//! Reverse proxy for `/api/*` onto the backend origin.

use crate::portiere::{guard, Gate};
use axum::{
    body::Body,
    extract::{Extension, Request},
    http::{header::HOST, HeaderMap, HeaderName, StatusCode},
    response::{IntoResponse, Response},
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::error;
use url::Url;

const API_PREFIX: &str = "/api";

pub const SHARED_SECRET_HEADER: &str = "x-shared-secret";

// Connection-scoped headers that must not be forwarded either way.
const HOP_HEADERS: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

fn is_hop_header(name: &HeaderName) -> bool {
    HOP_HEADERS.contains(&name.as_str())
}

/// Rewrite `/api/<rest>` onto the backend origin, preserving the query and
/// stripping the `/api` prefix.
#[must_use]
pub fn upstream_url(backend_url: &Url, rest: &str, query: Option<&str>) -> Url {
    let mut url = backend_url.clone();
    url.set_path(if rest.is_empty() { "/" } else { rest });
    url.set_query(query);
    url
}

/// Forward a request under `/api` to the backend. Upstream transport errors
/// map to 502; the body is buffered in full before forwarding.
pub async fn proxy(Extension(gate): Extension<Arc<Gate>>, request: Request) -> Response {
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(ToString::to_string);

    let Some(rest) = path.strip_prefix(API_PREFIX) else {
        // Routing only sends /api/* here
        return StatusCode::NOT_FOUND.into_response();
    };

    let url = upstream_url(gate.config().backend_url(), rest, query.as_deref());

    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            error!("Failed to read request body: {err}");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let mut headers = HeaderMap::new();
    for (name, value) in &parts.headers {
        if !is_hop_header(name) && name != HOST {
            headers.append(name, value.clone());
        }
    }

    // Admin routes reaching the backend must present the shared secret.
    if guard::is_protected(&path, gate.config().protected_prefixes()) {
        if let Some(secret) = gate.config().shared_secret() {
            if let Ok(value) = secret.expose_secret().parse() {
                headers.insert(HeaderName::from_static(SHARED_SECRET_HEADER), value);
            }
        }
    }

    let upstream = gate
        .http()
        .request(parts.method, url)
        .headers(headers)
        .body(bytes)
        .send()
        .await;

    match upstream {
        Ok(response) => forward_response(response).await,
        Err(err) => {
            error!("Proxy request failed: {err}");
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

async fn forward_response(response: reqwest::Response) -> Response {
    let status = response.status();
    let headers = response.headers().clone();

    let body = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(err) => {
            error!("Failed to read upstream body: {err}");
            return StatusCode::BAD_GATEWAY.into_response();
        }
    };

    let mut builder = Response::builder().status(status);
    if let Some(map) = builder.headers_mut() {
        for (name, value) in &headers {
            if !is_hop_header(name) {
                map.append(name, value.clone());
            }
        }
    }

    builder
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::BAD_GATEWAY.into_response())
}
