pub mod health;
pub mod passes;
pub mod register;
pub mod types;
pub mod verify;

use axum::{
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use crate::pass::{identity::valid_email, AdmissionError, RegistrationError, StoreError};

/// Tells the browser to drop the session established by the sign-in proxy.
const CLEAR_SITE_DATA: &str = "\"cookies\", \"storage\"";

/// Header carrying the email of the user authenticated by the upstream sign-in
/// proxy (for example `x-forwarded-email` from oauth2-proxy).
#[derive(Clone, Debug)]
pub struct AuthHeader(pub HeaderName);

impl Default for AuthHeader {
    fn default() -> Self {
        Self(HeaderName::from_static("x-forwarded-email"))
    }
}

/// Authenticated caller, passed explicitly into core operations.
#[derive(Clone, Debug)]
pub struct Principal {
    pub email: String,
}

/// Reads the authenticated email from the trusted header, or returns 401.
pub fn require_principal(headers: &HeaderMap, auth: &AuthHeader) -> Result<Principal, StatusCode> {
    let email = headers
        .get(&auth.0)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_lowercase())
        .filter(|value| valid_email(value));

    match email {
        Some(email) => Ok(Principal { email }),
        None => {
            debug!(header = %auth.0, "missing or malformed authenticated email");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

impl IntoResponse for RegistrationError {
    fn into_response(self) -> Response {
        match self {
            Self::IncompleteForm => (StatusCode::BAD_REQUEST, self.to_string()).into_response(),
            Self::Identity(err) => {
                (StatusCode::FORBIDDEN, clear_session(), err.to_string()).into_response()
            }
            Self::Store(err) => store_unavailable(&err),
        }
    }
}

impl IntoResponse for AdmissionError {
    fn into_response(self) -> Response {
        match self {
            Self::NotAuthorized => {
                (StatusCode::FORBIDDEN, clear_session(), self.to_string()).into_response()
            }
            Self::AlreadyAdmitted => {
                (StatusCode::CONFLICT, "already admitted".to_string()).into_response()
            }
            Self::NotFound => (StatusCode::NOT_FOUND, self.to_string()).into_response(),
            Self::Unavailable(detail) => {
                store_unavailable(&StoreError::Unavailable(detail))
            }
        }
    }
}

/// Signed in, but refused: drop the proxy session so the user can sign in again
/// with another account.
fn clear_session() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("clear-site-data"),
        HeaderValue::from_static(CLEAR_SITE_DATA),
    );
    headers
}

/// 503 for store faults. The detail is logged, not returned.
pub(crate) fn store_unavailable(err: &StoreError) -> Response {
    error!("Pass store error: {err}");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        "Pass store unavailable, retry".to_string(),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn principal_from_default_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-email",
            HeaderValue::from_static(" VTU21761@VelTech.edu.in "),
        );
        let principal = require_principal(&headers, &AuthHeader::default()).unwrap();
        assert_eq!(principal.email, "vtu21761@veltech.edu.in");
    }

    #[test]
    fn missing_or_malformed_header_is_unauthorized() {
        let auth = AuthHeader::default();
        assert_eq!(
            require_principal(&HeaderMap::new(), &auth).unwrap_err(),
            StatusCode::UNAUTHORIZED
        );

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-email", HeaderValue::from_static("nobody"));
        assert_eq!(
            require_principal(&headers, &auth).unwrap_err(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn custom_header_name() {
        let auth = AuthHeader(HeaderName::from_static("x-auth-request-email"));
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-auth-request-email",
            HeaderValue::from_static("gate@veltech.edu.in"),
        );
        assert!(require_principal(&headers, &auth).is_ok());
        assert!(require_principal(&headers, &AuthHeader::default()).is_err());
    }

    #[test]
    fn identity_errors_clear_the_session() {
        let response =
            RegistrationError::Identity(crate::pass::IdentityError::IdMismatch).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            response.headers().get("clear-site-data").unwrap(),
            "\"cookies\", \"storage\""
        );

        let response = RegistrationError::IncompleteForm.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get("clear-site-data").is_none());
    }

    #[test]
    fn admission_error_statuses() {
        let response = AdmissionError::NotAuthorized.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            response.headers().get("clear-site-data").unwrap(),
            "\"cookies\", \"storage\""
        );

        let response = AdmissionError::AlreadyAdmitted.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(response.headers().get("clear-site-data").is_none());
        assert_eq!(
            AdmissionError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AdmissionError::Unavailable("timeout".to_string())
                .into_response()
                .status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
