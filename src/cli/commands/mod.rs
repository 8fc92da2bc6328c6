use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("portiere")
        .about("OAuth admin gate and backend proxy")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("3000")
                .env("PORTIERE_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .help("Public base URL of this gateway, used to build the OAuth redirect URI")
                .default_value("http://localhost:3000")
                .env("PORTIERE_BASE_URL"),
        )
        .arg(
            Arg::new("backend-url")
                .long("backend-url")
                .help("Backend origin requests under /api are proxied to")
                .default_value("http://localhost:8000")
                .env("FASTAPI_URL"),
        )
        .arg(
            Arg::new("session-secret")
                .long("session-secret")
                .help("Key used to sign session tokens")
                .env("PORTIERE_SESSION_SECRET")
                .required(true),
        )
        .arg(
            Arg::new("google-client-id")
                .long("google-client-id")
                .help("Google OAuth client id")
                .env("GOOGLE_CLIENT_ID")
                .required(true),
        )
        .arg(
            Arg::new("google-client-secret")
                .long("google-client-secret")
                .help("Google OAuth client secret")
                .env("GOOGLE_CLIENT_SECRET")
                .required(true),
        )
        .arg(
            Arg::new("shared-secret")
                .long("shared-secret")
                .help("Value of the X-Shared-Secret header attached to proxied admin requests")
                .env("SHARED_SECRET"),
        )
        .arg(
            Arg::new("protected-prefix")
                .long("protected-prefix")
                .help("Path prefix gated behind an admin session, repeatable")
                .action(clap::ArgAction::Append)
                .default_values(["/admin", "/api/admin"]),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("PORTIERE_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}
