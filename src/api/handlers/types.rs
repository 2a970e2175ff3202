//! Request/response types for the pass APIs.
//!
//! These payloads are shared between handlers and `OpenAPI` generation.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::pass::{Pass, PassService, PassStatus, VerificationState};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PassResponse {
    pub token: String,
    pub identifier: String,
    pub full_name: String,
    pub department: String,
    pub year_level: String,
    pub email: String,
    pub status: PassStatus,
    pub issued_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admitted_at: Option<String>,
    pub verify_url: String,
}

impl PassResponse {
    pub(crate) fn new(service: &PassService, pass: &Pass) -> Self {
        let identity = pass.identity();
        Self {
            token: pass.token().to_string(),
            identifier: identity.identifier.clone(),
            full_name: identity.full_name.clone(),
            department: identity.department.clone(),
            year_level: identity.year_level.clone(),
            email: identity.email.clone(),
            status: pass.status(),
            issued_at: pass.issued_at().to_rfc3339(),
            admitted_at: pass.admitted_at().map(|at| at.to_rfc3339()),
            verify_url: service.verification_url(pass).to_string(),
        }
    }
}

/// Identity shown to gate staff. Omits the email and the audit trail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GatePassView {
    pub token: String,
    pub identifier: String,
    pub full_name: String,
    pub department: String,
    pub year_level: String,
    pub status: PassStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admitted_at: Option<String>,
}

impl From<&Pass> for GatePassView {
    fn from(pass: &Pass) -> Self {
        let identity = pass.identity();
        Self {
            token: pass.token().to_string(),
            identifier: identity.identifier.clone(),
            full_name: identity.full_name.clone(),
            department: identity.department.clone(),
            year_level: identity.year_level.clone(),
            status: pass.status(),
            admitted_at: pass.admitted_at().map(|at| at.to_rfc3339()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyResponse {
    /// One of `invalid`, `allowed`, `used`, `admitted`.
    pub state: String,
    /// `true` only for `allowed`; clients must not offer admission otherwise.
    pub can_admit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass: Option<GatePassView>,
}

impl From<&VerificationState> for VerifyResponse {
    fn from(state: &VerificationState) -> Self {
        Self {
            state: state.as_str().to_string(),
            can_admit: state.can_admit(),
            pass: state.pass().map(GatePassView::from),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VerifyQuery {
    /// Token scanned from the pass QR code.
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ConfirmRequest {
    pub token: String,
}
