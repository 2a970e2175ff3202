//! Runtime settings for the pass service.

use url::Url;

use super::{error::ConfigError, qr::QrOptions};

pub const DEFAULT_DOMAIN: &str = "veltech.edu.in";
pub const DEFAULT_TOKEN_PREFIX: &str = "LAVAZA";
pub const DEFAULT_TOKEN_SUFFIX_LENGTH: usize = 8;
pub const MIN_TOKEN_SUFFIX_LENGTH: usize = 4;

#[derive(Debug, Clone)]
pub struct PassConfig {
    domain: String,
    admin_domain: String,
    token_prefix: String,
    token_suffix_length: usize,
    public_url: Url,
    qr: QrOptions,
}

impl PassConfig {
    /// Builds a config for `domain`, with the admin domain defaulting to it.
    ///
    /// # Errors
    /// Returns `ConfigError::Domain` if the domain is empty or malformed.
    pub fn new(domain: &str, public_url: Url) -> Result<Self, ConfigError> {
        let domain = normalize_domain(domain)?;
        Ok(Self {
            admin_domain: domain.clone(),
            domain,
            token_prefix: DEFAULT_TOKEN_PREFIX.to_string(),
            token_suffix_length: DEFAULT_TOKEN_SUFFIX_LENGTH,
            public_url,
            qr: QrOptions::default(),
        })
    }

    /// # Errors
    /// Returns `ConfigError::Domain` if the domain is empty or malformed.
    pub fn with_admin_domain(mut self, admin_domain: &str) -> Result<Self, ConfigError> {
        self.admin_domain = normalize_domain(admin_domain)?;
        Ok(self)
    }

    /// # Errors
    /// Returns `ConfigError::TokenPrefix` unless the prefix is non-empty ASCII alphanumerics.
    pub fn with_token_prefix(mut self, prefix: &str) -> Result<Self, ConfigError> {
        let prefix = prefix.trim();
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::TokenPrefix(prefix.to_string()));
        }
        self.token_prefix = prefix.to_ascii_uppercase();
        Ok(self)
    }

    /// # Errors
    /// Returns `ConfigError::TokenSuffix` below `MIN_TOKEN_SUFFIX_LENGTH`.
    pub fn with_token_suffix_length(mut self, length: usize) -> Result<Self, ConfigError> {
        if length < MIN_TOKEN_SUFFIX_LENGTH {
            return Err(ConfigError::TokenSuffix {
                min: MIN_TOKEN_SUFFIX_LENGTH,
                got: length,
            });
        }
        self.token_suffix_length = length;
        Ok(self)
    }

    #[must_use]
    pub fn with_qr(mut self, qr: QrOptions) -> Self {
        self.qr = qr;
        self
    }

    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    #[must_use]
    pub fn admin_domain(&self) -> &str {
        &self.admin_domain
    }

    #[must_use]
    pub fn token_prefix(&self) -> &str {
        &self.token_prefix
    }

    #[must_use]
    pub fn token_suffix_length(&self) -> usize {
        self.token_suffix_length
    }

    #[must_use]
    pub fn public_url(&self) -> &Url {
        &self.public_url
    }

    #[must_use]
    pub fn qr(&self) -> &QrOptions {
        &self.qr
    }
}

/// Parses the public base URL; only http(s) URLs with a host are accepted.
///
/// # Errors
/// Returns `ConfigError::PublicUrl` for anything else.
pub fn parse_public_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim()).map_err(|e| ConfigError::PublicUrl(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::PublicUrl(value.to_string()));
    }
    Ok(url)
}

fn normalize_domain(domain: &str) -> Result<String, ConfigError> {
    let domain = domain.trim().trim_start_matches('@').to_ascii_lowercase();
    let valid = !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    if valid {
        Ok(domain)
    } else {
        Err(ConfigError::Domain(domain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        parse_public_url("https://lavaza.example.org").unwrap()
    }

    #[test]
    fn admin_domain_defaults_to_domain() {
        let config = PassConfig::new("@VelTech.edu.in", url()).unwrap();
        assert_eq!(config.domain(), "veltech.edu.in");
        assert_eq!(config.admin_domain(), "veltech.edu.in");
        assert_eq!(config.token_prefix(), "LAVAZA");
        assert_eq!(config.token_suffix_length(), DEFAULT_TOKEN_SUFFIX_LENGTH);
    }

    #[test]
    fn rejects_bad_domains() {
        for domain in ["", "localhost", ".edu", "edu.", "vel tech.edu"] {
            assert!(PassConfig::new(domain, url()).is_err(), "{domain}");
        }
    }

    #[test]
    fn rejects_short_suffix() {
        let err = PassConfig::new(DEFAULT_DOMAIN, url())
            .unwrap()
            .with_token_suffix_length(3)
            .unwrap_err();
        assert_eq!(err, ConfigError::TokenSuffix { min: 4, got: 3 });
    }

    #[test]
    fn prefix_is_upper_cased() {
        let config = PassConfig::new(DEFAULT_DOMAIN, url())
            .unwrap()
            .with_token_prefix("fest26")
            .unwrap();
        assert_eq!(config.token_prefix(), "FEST26");
        assert!(PassConfig::new(DEFAULT_DOMAIN, url())
            .unwrap()
            .with_token_prefix("FEST_26")
            .is_err());
    }

    #[test]
    fn public_url_must_be_http() {
        assert!(parse_public_url("https://gate.veltech.edu.in/").is_ok());
        assert!(parse_public_url("ftp://gate.veltech.edu.in/").is_err());
        assert!(parse_public_url("not a url").is_err());
    }
}
