//! Gate verification state machine.
//!
//! ```text
//!   scan ──► INVALID                      (no pass; terminal for this scan)
//!        ──► USED                         (already consumed; read-only)
//!        ──► ALLOWED ──confirm──► ADMITTED (status written USED)
//! ```
//!
//! Scanning never mutates anything. Consuming a pass requires an explicit
//! confirmation from authenticated staff, so link previews, prefetchers and page
//! reloads cannot burn a pass.

use serde::Serialize;
use tracing::{error, info, instrument, warn};

use super::{
    error::{AdmissionError, StoreError},
    model::{Pass, PassStatus},
    PassService,
};

/// Outcome of scanning a token at the gate.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", content = "pass", rename_all = "snake_case")]
pub enum VerificationState {
    Invalid,
    Allowed(Pass),
    Used(Pass),
    Admitted(Pass),
}

impl VerificationState {
    /// Only an `Allowed` pass may be offered for admission.
    #[must_use]
    pub fn can_admit(&self) -> bool {
        matches!(self, Self::Allowed(_))
    }

    #[must_use]
    pub fn pass(&self) -> Option<&Pass> {
        match self {
            Self::Invalid => None,
            Self::Allowed(pass) | Self::Used(pass) | Self::Admitted(pass) => Some(pass),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::Allowed(_) => "allowed",
            Self::Used(_) => "used",
            Self::Admitted(_) => "admitted",
        }
    }
}

impl PassService {
    /// Resolves the scan state of a token. Read-only.
    ///
    /// # Errors
    /// Only store outages; an unknown token is `Ok(VerificationState::Invalid)`.
    #[instrument(skip(self))]
    pub async fn check_token(&self, token: &str) -> Result<VerificationState, StoreError> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(VerificationState::Invalid);
        }

        let state = match self.store.find_by_token(token).await? {
            None => VerificationState::Invalid,
            Some(pass) => match pass.status() {
                PassStatus::Active => VerificationState::Allowed(pass),
                PassStatus::Used => VerificationState::Used(pass),
            },
        };

        info!(state = state.as_str(), "token checked");
        Ok(state)
    }

    /// Consumes an `ACTIVE` pass on behalf of `staff_email`.
    ///
    /// Authorization is checked before anything is read, and the pass state is
    /// re-read rather than trusted from an earlier scan. Of two concurrent
    /// confirmations for one token, exactly one succeeds; the other gets
    /// `AlreadyAdmitted`.
    ///
    /// # Errors
    /// `NotAuthorized` if the staff email is outside the admin domain, `NotFound`
    /// for unknown tokens, `AlreadyAdmitted` if the pass is already used, and
    /// `Unavailable` for store outages (the confirmation can be retried).
    #[instrument(skip(self))]
    pub async fn confirm_admission(
        &self,
        token: &str,
        staff_email: &str,
    ) -> Result<VerificationState, AdmissionError> {
        let staff_email = staff_email.trim().to_lowercase();
        if !self.staff.in_domain(&staff_email) {
            warn!(staff = %staff_email, "admission refused: staff not authorized");
            return Err(AdmissionError::NotAuthorized);
        }

        let token = token.trim();
        if token.is_empty() {
            return Err(AdmissionError::NotFound);
        }

        let pass = self
            .store
            .find_by_token(token)
            .await
            .map_err(|err| log_store_error(token, err))?
            .ok_or(AdmissionError::NotFound)?;

        if pass.status() == PassStatus::Used {
            warn!(token, staff = %staff_email, "duplicate admission");
            return Err(AdmissionError::AlreadyAdmitted);
        }

        match self
            .store
            .set_status(token, PassStatus::Used, &staff_email)
            .await
        {
            Ok(()) => {}
            Err(StoreError::Conflict) => {
                warn!(token, staff = %staff_email, "duplicate admission (concurrent)");
                return Err(AdmissionError::AlreadyAdmitted);
            }
            Err(err) => return Err(log_store_error(token, err)),
        }

        info!(token, staff = %staff_email, "admitted");

        // Report what the store now holds; fall back to the local transition if
        // the re-read fails, since the write itself already succeeded.
        let admitted = match self.store.find_by_token(token).await {
            Ok(Some(stored)) => stored,
            Ok(None) | Err(_) => {
                let mut local = pass;
                local.mark_used(&staff_email, chrono::Utc::now());
                local
            }
        };

        Ok(VerificationState::Admitted(admitted))
    }
}

fn log_store_error(token: &str, err: StoreError) -> AdmissionError {
    if err.is_retryable() {
        error!(token, "pass store failure during admission: {err}");
    }
    err.into()
}
