use crate::{cli::actions::Action, portiere::config::Config};
use anyhow::{Context, Result};
use secrecy::SecretString;
use url::Url;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let base_url = matches
        .get_one::<String>("base-url")
        .map(|s| Url::parse(s))
        .transpose()
        .context("Invalid base URL")?
        .ok_or_else(|| anyhow::anyhow!("missing required argument: --base-url"))?;

    let backend_url = matches
        .get_one::<String>("backend-url")
        .map(|s| Url::parse(s))
        .transpose()
        .context("Invalid backend URL")?
        .ok_or_else(|| anyhow::anyhow!("missing required argument: --backend-url"))?;

    let session_secret = matches
        .get_one::<String>("session-secret")
        .map(|s| SecretString::from(s.clone()))
        .ok_or_else(|| anyhow::anyhow!("missing required argument: --session-secret"))?;

    let google_client_id = matches
        .get_one::<String>("google-client-id")
        .map(String::to_string)
        .ok_or_else(|| anyhow::anyhow!("missing required argument: --google-client-id"))?;

    let google_client_secret = matches
        .get_one::<String>("google-client-secret")
        .map(|s| SecretString::from(s.clone()))
        .ok_or_else(|| anyhow::anyhow!("missing required argument: --google-client-secret"))?;

    let mut config = Config::new(
        base_url,
        backend_url,
        session_secret,
        google_client_id,
        google_client_secret,
    );

    if let Some(secret) = matches.get_one::<String>("shared-secret") {
        config = config.with_shared_secret(SecretString::from(secret.clone()));
    }

    if let Some(prefixes) = matches.get_many::<String>("protected-prefix") {
        config = config.with_protected_prefixes(prefixes.cloned().collect());
    }

    Ok(Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(3000),
        config,
    })
}
