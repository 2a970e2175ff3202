use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ColorChoice, Command,
};

use crate::pass::config::{DEFAULT_DOMAIN, DEFAULT_TOKEN_PREFIX};

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

    Command::new("lavaza")
        .about("Event registration and gate check-in")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("LAVAZA_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("dsn")
                .short('d')
                .long("dsn")
                .help("Database connection string")
                .env("LAVAZA_DSN")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new("domain")
                .long("domain")
                .help("Institutional email domain registrants must belong to")
                .default_value(DEFAULT_DOMAIN)
                .env("LAVAZA_DOMAIN"),
        )
        .arg(
            Arg::new("admin-domain")
                .long("admin-domain")
                .help("Email domain allowed to confirm admissions (default: --domain)")
                .env("LAVAZA_ADMIN_DOMAIN"),
        )
        .arg(
            Arg::new("token-prefix")
                .long("token-prefix")
                .help("Prefix of issued pass tokens")
                .default_value(DEFAULT_TOKEN_PREFIX)
                .env("LAVAZA_TOKEN_PREFIX"),
        )
        .arg(
            Arg::new("token-suffix-length")
                .long("token-suffix-length")
                .help("Number of random characters at the end of each token (min 4)")
                .default_value("8")
                .env("LAVAZA_TOKEN_SUFFIX_LENGTH")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("public-url")
                .long("public-url")
                .help("Public base URL encoded in pass QR codes, example: https://lavaza.veltech.edu.in")
                .env("LAVAZA_PUBLIC_URL")
                .required(true),
        )
        .arg(
            Arg::new("auth-header")
                .long("auth-header")
                .help("Request header carrying the email authenticated by the sign-in proxy")
                .default_value("x-forwarded-email")
                .env("LAVAZA_AUTH_HEADER"),
        )
        .arg(
            Arg::new("qr-width")
                .long("qr-width")
                .help("Minimum QR image width in pixels (300 to 2048)")
                .default_value("400")
                .env("LAVAZA_QR_WIDTH")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("qr-margin")
                .long("qr-margin")
                .help("Quiet zone around the QR code in modules (2 to 16)")
                .default_value("2")
                .env("LAVAZA_QR_MARGIN")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("qr-dark")
                .long("qr-dark")
                .help("QR module color")
                .default_value("#000000")
                .env("LAVAZA_QR_DARK"),
        )
        .arg(
            Arg::new("qr-light")
                .long("qr-light")
                .help("QR background color")
                .default_value("#ffffff")
                .env("LAVAZA_QR_LIGHT"),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("LAVAZA_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}
