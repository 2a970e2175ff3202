//! Error taxonomy for the pass lifecycle.
//!
//! Every error here is scoped to a single request. None of them are fatal to the
//! process; the HTTP layer maps each variant to a stable status code.

use thiserror::Error;

/// Failures matching a claimed identifier against an authenticated email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("email does not belong to the institutional domain")]
    WrongDomain,
    #[error("identifier does not match the authenticated email")]
    IdMismatch,
}

/// Pass store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("pass already exists")]
    AlreadyExists,
    #[error("pass not found")]
    NotFound,
    /// A conditional write found the pass in a different status than expected.
    #[error("pass status changed concurrently")]
    Conflict,
    /// A persisted record failed validation at the store boundary.
    #[error("corrupt pass record: {0}")]
    Corrupt(String),
    #[error("pass store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Backend faults the caller may retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Corrupt(_))
    }
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("all registration fields are required")]
    IncompleteForm,
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RegistrationError {
    /// Identity failures leave a half-authenticated session behind; the caller
    /// must sign the user out when this returns `true`.
    #[must_use]
    pub fn revokes_session(&self) -> bool {
        matches!(self, Self::Identity(_))
    }
}

#[derive(Debug, Error)]
pub enum AdmissionError {
    #[error("staff member is not authorized to admit")]
    NotAuthorized,
    #[error("pass already admitted")]
    AlreadyAdmitted,
    #[error("pass not found")]
    NotFound,
    #[error("pass store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for AdmissionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound,
            StoreError::Conflict | StoreError::AlreadyExists => Self::AlreadyAdmitted,
            StoreError::Corrupt(detail) | StoreError::Unavailable(detail) => {
                Self::Unavailable(detail)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum QrError {
    #[error("payload does not fit in a QR code: {0}")]
    Encode(#[from] qrcode::types::QrError),
    #[error("failed to write PNG: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid domain: {0}")]
    Domain(String),
    #[error("invalid token prefix: {0}")]
    TokenPrefix(String),
    #[error("token suffix must be at least {min} characters, got {got}")]
    TokenSuffix { min: usize, got: usize },
    #[error("invalid color: {0}")]
    Color(String),
    #[error("QR width must be between {min} and {max}px, got {got}")]
    QrWidth { min: u32, max: u32, got: u32 },
    #[error("QR margin must be between {min} and {max} modules, got {got}")]
    QrMargin { min: u32, max: u32, got: u32 },
    #[error("invalid public URL: {0}")]
    PublicUrl(String),
}
