//! Pass lifecycle: issuance, display and gate verification.
//!
//! Flow Overview:
//! 1) A registrant signs in upstream; their email and form fields reach `register`.
//! 2) `IdentityVerifier` matches the claimed identifier against the email.
//! 3) An existing pass for the identifier is returned as-is; otherwise a token is
//!    generated and the pass persisted.
//! 4) The pass page renders a QR of `<public_url>/verify?token=...`.
//! 5) Gate staff scan it: `check_token` is read-only, `confirm_admission` is the
//!    single write path and consumes the pass.
//!
//! The service never caches passes between calls. Every decision re-reads the store.

pub mod config;
pub mod error;
pub mod identity;
pub mod model;
pub mod postgres;
pub mod qr;
pub mod registration;
pub mod store;
pub mod token;
pub mod verification;

use std::sync::Arc;
use tracing::instrument;
use url::Url;

pub use self::config::PassConfig;
pub use self::error::{AdmissionError, IdentityError, RegistrationError, StoreError};
pub use self::model::{Pass, PassStatus, RegistrantIdentity};
pub use self::registration::{Registration, RegistrationForm};
pub use self::store::{MemoryPassStore, PassStore};
pub use self::verification::VerificationState;

use self::{
    error::QrError,
    identity::IdentityVerifier,
    qr::QrImage,
    token::TokenGenerator,
};

pub struct PassService {
    store: Arc<dyn PassStore>,
    config: PassConfig,
    registrants: IdentityVerifier,
    staff: IdentityVerifier,
    tokens: TokenGenerator,
}

impl std::fmt::Debug for PassService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PassService {
    #[must_use]
    pub fn new(store: Arc<dyn PassStore>, config: PassConfig) -> Self {
        Self {
            registrants: IdentityVerifier::new(config.domain()),
            staff: IdentityVerifier::new(config.admin_domain()),
            tokens: TokenGenerator::new(config.token_prefix(), config.token_suffix_length()),
            store,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PassConfig {
        &self.config
    }

    /// Read-only lookup for the pass display page.
    ///
    /// # Errors
    /// Propagates store failures; a missing pass is `Ok(None)`.
    #[instrument(skip(self))]
    pub async fn get_pass_by_token(&self, token: &str) -> Result<Option<Pass>, StoreError> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(None);
        }
        self.store.find_by_token(token).await
    }

    /// Checks the pass store is reachable.
    ///
    /// # Errors
    /// Returns the store error when the backend cannot be reached.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }

    /// The URL staff land on when scanning this pass.
    #[must_use]
    pub fn verification_url(&self, pass: &Pass) -> Url {
        qr::verification_url(self.config.public_url(), pass.token())
    }

    /// Renders the pass's verification URL as a QR image.
    ///
    /// # Errors
    /// Returns `QrError` if encoding fails.
    pub fn render_qr(&self, pass: &Pass) -> Result<QrImage, QrError> {
        qr::encode(self.verification_url(pass).as_str(), self.config.qr())
    }
}
