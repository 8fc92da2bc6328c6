use crate::{cli::actions::Action, portiere};
use anyhow::Result;

/// Handle the server action
///
/// # Errors
///
/// Returns an error if the server fails to start
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server { port, config } => portiere::new(port, config).await,
    }
}
