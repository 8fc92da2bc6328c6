//! Sign-in flow and session endpoints.

use crate::portiere::{
    admin_check::{self, AdminCheck},
    guard::LOGIN_PATH,
    handlers::valid_email,
    session::{self, SessionView},
    Gate,
};
use axum::{
    extract::{Extension, Query},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use ulid::Ulid;

// Where the browser lands after a successful sign-in; non-admins are bounced
// back to the login page by the route guard.
const POST_LOGIN_PATH: &str = "/admin/dashboard";

/// Query parameters Google sends back to the redirect URI.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// Start the sign-in flow: set the state cookie and hand the browser to the
/// provider.
pub async fn login(Extension(gate): Extension<Arc<Gate>>) -> Response {
    let state = Ulid::new().to_string();
    let url = gate.oauth().authorization_url(&state);

    let mut headers = HeaderMap::new();
    match session::state_cookie(&state, gate.config().session_cookie_secure()) {
        Ok(cookie) => {
            headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => {
            error!("Failed to build state cookie: {err}");
            return Redirect::to(LOGIN_PATH).into_response();
        }
    }

    (headers, Redirect::to(&url)).into_response()
}

/// Finish the sign-in flow: verify the state, exchange the code, run the
/// admin check and mint the session token. Every failure degrades to a
/// redirect back to the login page; nothing is surfaced to the user.
pub async fn callback(
    Extension(gate): Extension<Arc<Gate>>,
    Query(params): Query<CallbackParams>,
    headers: HeaderMap,
) -> Response {
    let secure = gate.config().session_cookie_secure();

    if let Some(error) = params.error {
        warn!("Provider returned an error: {error}");
        return login_redirect(secure);
    }

    let (Some(code), Some(state)) = (params.code, params.state) else {
        warn!("Callback missing code or state");
        return login_redirect(secure);
    };

    let expected = session::extract_cookie(&headers, session::STATE_COOKIE_NAME);
    if expected.as_deref() != Some(state.as_str()) {
        warn!("OAuth state mismatch");
        return login_redirect(secure);
    }

    let user = match gate.oauth().exchange_code(gate.http(), &code).await {
        Ok(user) => user,
        Err(err) => {
            error!("Code exchange failed: {err:?}");
            return login_redirect(secure);
        }
    };

    if !valid_email(&user.email) {
        warn!("Provider returned an invalid email");
        return login_redirect(secure);
    }

    // Admin status is resolved once, here. The token keeps this value until
    // the user signs in again.
    let outcome = admin_check::check_admin(gate.http(), gate.config().backend_url(), &user.email).await;
    if outcome == AdminCheck::CheckFailed {
        debug!("Admin check failed, minting a non-admin session");
    }

    let token = match gate.keys().mint(&user.email, outcome.is_admin()) {
        Ok(token) => token,
        Err(err) => {
            error!("Failed to mint session token: {err}");
            return login_redirect(secure);
        }
    };

    info!("Signed in {} (admin: {})", user.email, outcome.is_admin());

    let mut response_headers = HeaderMap::new();
    match session::session_cookie(&token, gate.config().session_ttl_seconds(), secure) {
        Ok(cookie) => {
            response_headers.append(SET_COOKIE, cookie);
        }
        Err(err) => {
            error!("Failed to build session cookie: {err}");
            return login_redirect(secure);
        }
    }
    if let Ok(cookie) = session::clear_state_cookie(secure) {
        response_headers.append(SET_COOKIE, cookie);
    }

    (response_headers, Redirect::to(POST_LOGIN_PATH)).into_response()
}

#[utoipa::path(
    get,
    path = "/auth/session",
    responses(
        (status = 200, description = "Session is active", body = SessionView),
        (status = 204, description = "No active session")
    ),
    tag = "auth"
)]
pub async fn session(Extension(gate): Extension<Arc<Gate>>, headers: HeaderMap) -> Response {
    // Missing cookies are treated as "no session" to avoid leaking auth state.
    let Some(token) = session::extract_session_token(&headers) else {
        return StatusCode::NO_CONTENT.into_response();
    };

    match gate.keys().verify(&token) {
        Ok(claims) => (StatusCode::OK, Json(claims.project())).into_response(),
        Err(err) => {
            debug!("Rejected session token: {err}");
            StatusCode::NO_CONTENT.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 204, description = "Session cleared")
    ),
    tag = "auth"
)]
pub async fn logout(Extension(gate): Extension<Arc<Gate>>) -> Response {
    // Always clear the cookie, the token itself is stateless.
    let mut headers = HeaderMap::new();
    if let Ok(cookie) = session::clear_session_cookie(gate.config().session_cookie_secure()) {
        headers.insert(SET_COOKIE, cookie);
    }

    (StatusCode::NO_CONTENT, headers).into_response()
}

fn login_redirect(secure: bool) -> Response {
    let mut headers = HeaderMap::new();
    if let Ok(cookie) = session::clear_state_cookie(secure) {
        headers.insert(SET_COOKIE, cookie);
    }

    (headers, Redirect::to(LOGIN_PATH)).into_response()
}
