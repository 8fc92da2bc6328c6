//! Google OAuth authorization-code flow.

use anyhow::{Context, Result};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::form_urlencoded;

const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

pub struct GoogleOAuth {
    client_id: String,
    client_secret: SecretString,
    redirect_uri: String,
}

/// The authenticated identity returned by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleUser {
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl GoogleOAuth {
    #[must_use]
    pub fn new(client_id: String, client_secret: SecretString, redirect_uri: String) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri,
        }
    }

    /// Authorization URL the browser is redirected to, carrying the CSRF
    /// state nonce.
    #[must_use]
    pub fn authorization_url(&self, state: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", "openid email profile")
            .append_pair("state", state)
            .finish();

        format!("{AUTHORIZATION_ENDPOINT}?{query}")
    }

    /// Exchange an authorization code for the signed-in user's identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the token exchange or the userinfo fetch fails
    pub async fn exchange_code(&self, client: &Client, code: &str) -> Result<GoogleUser> {
        let token: TokenResponse = client
            .post(TOKEN_ENDPOINT)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose_secret()),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .context("Failed to exchange authorization code")?
            .error_for_status()
            .context("Token endpoint rejected the authorization code")?
            .json()
            .await
            .context("Failed to parse token response")?;

        let user: GoogleUser = client
            .get(USERINFO_ENDPOINT)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .context("Failed to fetch user info")?
            .error_for_status()
            .context("Userinfo endpoint rejected the access token")?
            .json()
            .await
            .context("Failed to parse user info")?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_oauth() -> GoogleOAuth {
        GoogleOAuth::new(
            "client-id".to_string(),
            SecretString::from("client-secret".to_string()),
            "http://localhost:3000/auth/callback".to_string(),
        )
    }

    #[test]
    fn test_authorization_url() {
        let url = test_oauth().authorization_url("state-123");

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("state=state-123"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=openid+email+profile"));
        assert!(url.contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fcallback"
        ));
    }

    #[test]
    fn test_userinfo_deserializes_without_verified_flag() {
        let user: GoogleUser = serde_json::from_str(r#"{"email":"alice@x.com"}"#).unwrap();
        assert_eq!(user.email, "alice@x.com");
        assert!(!user.email_verified);
    }
}
