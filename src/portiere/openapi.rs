use crate::portiere::{
    handlers::{auth, health},
    session::SessionView,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(health::health, auth::session, auth::logout),
    components(schemas(health::Health, SessionView)),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Sign-in flow and session endpoints")
    )
)]
pub struct ApiDoc;
