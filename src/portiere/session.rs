//! Signed session tokens and the cookies that carry them.

use anyhow::{Context, Result};
use axum::http::{
    header::{InvalidHeaderValue, AUTHORIZATION, COOKIE},
    HeaderMap, HeaderValue,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const SESSION_COOKIE_NAME: &str = "portiere_session";
pub const STATE_COOKIE_NAME: &str = "portiere_oauth_state";

const STATE_COOKIE_TTL_SECONDS: i64 = 10 * 60;

/// Claims carried by the session token. Minted once at sign-in; `is_admin`
/// reflects the admin check at mint time and is not refreshed until the user
/// authenticates again.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    pub email: String,
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    /// Project the token onto the externally visible session view.
    #[must_use]
    pub fn project(&self) -> SessionView {
        SessionView {
            email: self.email.clone(),
            is_admin: self.is_admin,
        }
    }
}

/// What `/auth/session` exposes to the browser.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionView {
    pub email: String,
    pub is_admin: bool,
}

/// HS256 keys derived from the session secret.
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: i64,
}

impl SessionKeys {
    #[must_use]
    pub fn new(secret: &SecretString, ttl_seconds: i64) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_seconds,
        }
    }

    /// Mint a signed session token for an authenticated email.
    ///
    /// # Errors
    ///
    /// Returns an error if the claims cannot be encoded
    pub fn mint(&self, email: &str, is_admin: bool) -> Result<String> {
        let iat = Utc::now().timestamp();
        let claims = SessionClaims {
            email: email.to_string(),
            is_admin,
            iat,
            exp: iat + self.ttl_seconds,
        };

        encode(&Header::default(), &claims, &self.encoding).context("Failed to sign session token")
    }

    /// Verify a session token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns an error if the signature is invalid or the token expired
    pub fn verify(&self, token: &str) -> Result<SessionClaims> {
        let data = decode::<SessionClaims>(token, &self.decoding, &Validation::default())
            .context("Invalid session token")?;

        Ok(data.claims)
    }
}

/// Build a secure `HttpOnly` cookie for the session token.
///
/// # Errors
///
/// Returns an error if the token contains characters invalid in a header
pub fn session_cookie(
    token: &str,
    ttl_seconds: i64,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub fn clear_session_cookie(secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Short-lived cookie binding the OAuth callback to the browser that started
/// the sign-in flow.
pub fn state_cookie(state: &str, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{STATE_COOKIE_NAME}={state}; Path=/; HttpOnly; SameSite=Lax; Max-Age={STATE_COOKIE_TTL_SECONDS}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub fn clear_state_cookie(secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{STATE_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Session token from the `Authorization: Bearer` header or the session
/// cookie, in that order.
#[must_use]
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_bearer_token(headers) {
        return Some(token);
    }
    extract_cookie(headers, SESSION_COOKIE_NAME)
}

#[must_use]
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == name {
            return Some(val.to_string());
        }
    }
    None
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_keys() -> SessionKeys {
        SessionKeys::new(&SecretString::from("test-secret".to_string()), 3600)
    }

    #[test]
    fn test_mint_and_verify() {
        let keys = test_keys();
        let token = keys.mint("alice@x.com", true).unwrap();

        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.email, "alice@x.com");
        assert!(claims.is_admin);
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn test_verify_rejects_other_key() {
        let token = test_keys().mint("alice@x.com", true).unwrap();

        let other = SessionKeys::new(&SecretString::from("other-secret".to_string()), 3600);
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_expired() {
        // Past the default validation leeway of 60 seconds
        let keys = SessionKeys::new(&SecretString::from("test-secret".to_string()), -120);
        let token = keys.mint("alice@x.com", true).unwrap();

        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_garbage() {
        assert!(test_keys().verify("not-a-token").is_err());
    }

    #[test]
    fn test_projection_copies_token_fields() {
        let claims = SessionClaims {
            email: "bob@x.com".to_string(),
            is_admin: false,
            iat: 0,
            exp: 1,
        };

        let view = claims.project();
        assert_eq!(view.email, "bob@x.com");
        assert!(!view.is_admin);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("token", 3600, false).unwrap();
        let value = cookie.to_str().unwrap();
        assert!(value.starts_with("portiere_session=token"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("SameSite=Lax"));
        assert!(value.contains("Max-Age=3600"));
        assert!(!value.contains("Secure"));

        let secure = session_cookie("token", 3600, true).unwrap();
        assert!(secure.to_str().unwrap().ends_with("; Secure"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie(false).unwrap();
        assert!(cookie.to_str().unwrap().contains("Max-Age=0"));
    }

    #[test]
    fn test_extract_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("other=1; portiere_session=abc; theme=dark"),
        );

        assert_eq!(
            extract_session_token(&headers),
            Some("abc".to_string())
        );
        assert_eq!(
            extract_cookie(&headers, "theme"),
            Some("dark".to_string())
        );
        assert_eq!(extract_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_extract_bearer_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("portiere_session=abc"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));

        assert_eq!(extract_session_token(&headers), Some("xyz".to_string()));
    }

    #[test]
    fn test_extract_from_empty_headers() {
        assert_eq!(extract_session_token(&HeaderMap::new()), None);
    }
}
