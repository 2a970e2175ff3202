use crate::{
    api::AuthHeader,
    cli::actions::{server::Args, Action},
    pass::{
        config::{parse_public_url, DEFAULT_DOMAIN},
        qr::QrOptions,
        PassConfig,
    },
};
use anyhow::{Context, Result};
use axum::http::HeaderName;
use secrecy::SecretString;

/// # Errors
/// Returns an error if required arguments are missing or invalid.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .map(SecretString::from)
        .context("missing required argument: --dsn")?;

    let public_url = matches
        .get_one::<String>("public-url")
        .context("missing required argument: --public-url")?;
    let public_url = parse_public_url(public_url).context("invalid LAVAZA_PUBLIC_URL")?;

    let domain = matches
        .get_one::<String>("domain")
        .map_or(DEFAULT_DOMAIN, String::as_str);

    let mut config = PassConfig::new(domain, public_url).context("invalid LAVAZA_DOMAIN")?;

    if let Some(admin_domain) = matches.get_one::<String>("admin-domain") {
        config = config
            .with_admin_domain(admin_domain)
            .context("invalid LAVAZA_ADMIN_DOMAIN")?;
    }

    if let Some(prefix) = matches.get_one::<String>("token-prefix") {
        config = config
            .with_token_prefix(prefix)
            .context("invalid LAVAZA_TOKEN_PREFIX")?;
    }

    if let Some(length) = matches.get_one::<usize>("token-suffix-length") {
        config = config
            .with_token_suffix_length(*length)
            .context("invalid LAVAZA_TOKEN_SUFFIX_LENGTH")?;
    }

    let qr = QrOptions::new(
        matches.get_one::<u32>("qr-width").copied().unwrap_or(400),
        matches.get_one::<u32>("qr-margin").copied().unwrap_or(2),
        matches
            .get_one::<String>("qr-dark")
            .map_or("#000000", String::as_str),
        matches
            .get_one::<String>("qr-light")
            .map_or("#ffffff", String::as_str),
    )
    .context("invalid QR options")?;
    let config = config.with_qr(qr);

    let auth_header = match matches.get_one::<String>("auth-header") {
        Some(name) => AuthHeader(
            HeaderName::from_bytes(name.trim().to_ascii_lowercase().as_bytes())
                .with_context(|| format!("invalid LAVAZA_AUTH_HEADER: {name}"))?,
        ),
        None => AuthHeader::default(),
    };

    Ok(Action::Server(Args {
        port,
        dsn,
        config,
        auth_header,
    }))
}
