use secrecy::SecretString;
use url::Url;

const DEFAULT_SESSION_TTL_SECONDS: i64 = 12 * 60 * 60;

pub const DEFAULT_PROTECTED_PREFIXES: [&str; 2] = ["/admin", "/api/admin"];

/// Immutable runtime configuration, built once at startup and injected into
/// the server. Secrets are never read from the environment after this point.
#[derive(Debug, Clone)]
pub struct Config {
    base_url: Url,
    backend_url: Url,
    session_secret: SecretString,
    google_client_id: String,
    google_client_secret: SecretString,
    shared_secret: Option<SecretString>,
    protected_prefixes: Vec<String>,
    session_ttl_seconds: i64,
}

impl Config {
    #[must_use]
    pub fn new(
        base_url: Url,
        backend_url: Url,
        session_secret: SecretString,
        google_client_id: String,
        google_client_secret: SecretString,
    ) -> Self {
        Self {
            base_url,
            backend_url,
            session_secret,
            google_client_id,
            google_client_secret,
            shared_secret: None,
            protected_prefixes: DEFAULT_PROTECTED_PREFIXES
                .map(ToString::to_string)
                .to_vec(),
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_shared_secret(mut self, secret: SecretString) -> Self {
        self.shared_secret = Some(secret);
        self
    }

    #[must_use]
    pub fn with_protected_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.protected_prefixes = prefixes;
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn backend_url(&self) -> &Url {
        &self.backend_url
    }

    #[must_use]
    pub fn session_secret(&self) -> &SecretString {
        &self.session_secret
    }

    #[must_use]
    pub fn google_client_id(&self) -> &str {
        &self.google_client_id
    }

    #[must_use]
    pub fn google_client_secret(&self) -> &SecretString {
        &self.google_client_secret
    }

    #[must_use]
    pub fn shared_secret(&self) -> Option<&SecretString> {
        self.shared_secret.as_ref()
    }

    #[must_use]
    pub fn protected_prefixes(&self) -> &[String] {
        &self.protected_prefixes
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    /// The redirect URI registered with the OAuth provider.
    #[must_use]
    pub fn redirect_uri(&self) -> String {
        format!(
            "{}/auth/callback",
            self.base_url.as_str().trim_end_matches('/')
        )
    }

    // Only mark cookies secure when the gateway is served over HTTPS.
    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config::new(
            Url::parse("http://localhost:3000").unwrap(),
            Url::parse("http://localhost:8000").unwrap(),
            SecretString::from("sssht".to_string()),
            "client-id".to_string(),
            SecretString::from("client-secret".to_string()),
        )
    }

    #[test]
    fn test_config_defaults() {
        let config = test_config();

        assert_eq!(config.base_url().as_str(), "http://localhost:3000/");
        assert_eq!(config.backend_url().as_str(), "http://localhost:8000/");
        assert_eq!(config.google_client_id(), "client-id");
        assert_eq!(config.protected_prefixes(), ["/admin", "/api/admin"]);
        assert_eq!(config.session_ttl_seconds(), DEFAULT_SESSION_TTL_SECONDS);
        assert!(config.shared_secret().is_none());
        assert!(!config.session_cookie_secure());
    }

    #[test]
    fn test_config_overrides() {
        let config = test_config()
            .with_shared_secret(SecretString::from("between-us".to_string()))
            .with_protected_prefixes(vec!["/internal".to_string()])
            .with_session_ttl_seconds(60);

        assert!(config.shared_secret().is_some());
        assert_eq!(config.protected_prefixes(), ["/internal"]);
        assert_eq!(config.session_ttl_seconds(), 60);
    }

    #[test]
    fn test_redirect_uri_has_no_double_slash() {
        let config = test_config();
        assert_eq!(config.redirect_uri(), "http://localhost:3000/auth/callback");
    }

    #[test]
    fn test_secure_cookie_follows_scheme() {
        let config = Config::new(
            Url::parse("https://portiere.dev").unwrap(),
            Url::parse("http://localhost:8000").unwrap(),
            SecretString::from("sssht".to_string()),
            "client-id".to_string(),
            SecretString::from("client-secret".to_string()),
        );
        assert!(config.session_cookie_secure());
    }
}
