//! Remote admin lookup against the backend.

use reqwest::Client;
use std::collections::HashMap;
use tracing::{error, instrument};
use url::Url;

/// Outcome of the remote admin lookup. `CheckFailed` is kept distinct from
/// `NotAdmin` so callers and tests can tell a backend denial from a transport
/// or service failure; both collapse to "not admin" at the token boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCheck {
    Admin,
    NotAdmin,
    CheckFailed,
}

impl AdminCheck {
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Ask the backend whether `email` belongs to an admin.
///
/// Any 2xx answer means admin. A clean denial (4xx) means not admin. Anything
/// else, including transport errors and 5xx, is a failed check. Never returns
/// an error: failures are logged and the caller falls back to denying access.
#[instrument(skip(client, backend_url))]
pub async fn check_admin(client: &Client, backend_url: &Url, email: &str) -> AdminCheck {
    let url = match backend_url.join("check-admin") {
        Ok(url) => url,
        Err(err) => {
            error!("Invalid admin check URL: {err}");
            return AdminCheck::CheckFailed;
        }
    };

    let mut map = HashMap::new();
    map.insert("email", email);

    match client.post(url).json(&map).send().await {
        Ok(response) => {
            let status = response.status();
            if status.is_success() {
                AdminCheck::Admin
            } else if status.is_client_error() {
                AdminCheck::NotAdmin
            } else {
                error!("Admin check returned {status}");
                AdminCheck::CheckFailed
            }
        }
        Err(err) => {
            error!("Error checking admin status: {err}");
            AdminCheck::CheckFailed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AdminCheck;

    #[test]
    fn test_only_admin_collapses_to_true() {
        assert!(AdminCheck::Admin.is_admin());
        assert!(!AdminCheck::NotAdmin.is_admin());
        assert!(!AdminCheck::CheckFailed.is_admin());
    }
}
