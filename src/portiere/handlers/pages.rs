//! Static pages served by the gateway.

use axum::response::Html;

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <title>Welcome to My Web App</title>
  </head>
  <body>
    <h1>Welcome to My Web App</h1>
    <p>This is the homepage of your application.</p>
  </body>
</html>
"#;

const LOGIN_HTML: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <title>Login</title>
  </head>
  <body>
    <h1>Authenticate yourself stranger</h1>
    <a href="/auth/login">Login with Google</a>
  </body>
</html>
"#;

const DASHBOARD_HTML: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <title>Admin dashboard</title>
  </head>
  <body>
    <h1>Admin dashboard</h1>
    <p><a href="/auth/session">Session</a></p>
  </body>
</html>
"#;

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn login() -> Html<&'static str> {
    Html(LOGIN_HTML)
}

// The route guard has already run by the time this renders.
pub async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}
