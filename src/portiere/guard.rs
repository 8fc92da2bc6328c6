//! Route guard for admin-only path prefixes.

use crate::portiere::{session, Gate};
use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::debug;

pub const LOGIN_PATH: &str = "/login";

/// Segment-aware prefix match: `/admin` matches `/admin` and `/admin/...`,
/// not `/administrator`.
#[must_use]
pub fn is_protected(path: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| {
        path.strip_prefix(prefix.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

/// Deny-by-default gate in front of the protected prefixes. The decision is
/// recomputed from the session token on every request; requests outside the
/// prefix list pass through untouched.
pub async fn admin_gate(
    Extension(gate): Extension<Arc<Gate>>,
    request: Request,
    next: Next,
) -> Response {
    if !is_protected(request.uri().path(), gate.config().protected_prefixes()) {
        return next.run(request).await;
    }

    let Some(token) = session::extract_session_token(request.headers()) else {
        return Redirect::to(LOGIN_PATH).into_response();
    };

    match gate.keys().verify(&token) {
        Ok(claims) if claims.is_admin => next.run(request).await,
        Ok(claims) => {
            debug!("Denied non-admin session for {}", claims.email);
            Redirect::to(LOGIN_PATH).into_response()
        }
        Err(err) => {
            debug!("Rejected session token: {err}");
            Redirect::to(LOGIN_PATH).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::is_protected;

    fn prefixes() -> Vec<String> {
        vec!["/admin".to_string(), "/api/admin".to_string()]
    }

    #[test]
    fn test_protected_paths() {
        let prefixes = prefixes();

        assert!(is_protected("/admin", &prefixes));
        assert!(is_protected("/admin/dashboard", &prefixes));
        assert!(is_protected("/api/admin", &prefixes));
        assert!(is_protected("/api/admin/users", &prefixes));
    }

    #[test]
    fn test_unprotected_paths() {
        let prefixes = prefixes();

        assert!(!is_protected("/", &prefixes));
        assert!(!is_protected("/login", &prefixes));
        assert!(!is_protected("/api/check-admin", &prefixes));
        // Prefix match must respect path segments
        assert!(!is_protected("/administrator", &prefixes));
        assert!(!is_protected("/api/administrators", &prefixes));
        assert!(!is_protected("/apiadmin", &prefixes));
    }

    #[test]
    fn test_empty_prefix_list_protects_nothing() {
        assert!(!is_protected("/admin", &[]));
    }
}
