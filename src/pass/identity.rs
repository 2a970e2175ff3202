//! Institutional identity checks.
//!
//! The authenticated email always arrives as an explicit argument; nothing here
//! reads ambient session state.

use regex::Regex;
use std::sync::LazyLock;

use super::error::IdentityError;

static EMAIL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

#[must_use]
pub fn valid_email(email: &str) -> bool {
    EMAIL.as_ref().is_some_and(|re| re.is_match(email))
}

/// Splits a well-formed email into lower-cased `(local, domain)`.
fn split_email(email: &str) -> Option<(String, String)> {
    let email = email.trim().to_lowercase();
    if !valid_email(&email) {
        return None;
    }
    let (local, domain) = email.rsplit_once('@')?;
    Some((local.to_string(), domain.to_string()))
}

#[derive(Debug, Clone)]
pub struct IdentityVerifier {
    domain: String,
}

impl IdentityVerifier {
    /// `domain` is expected lower-cased, as produced by `PassConfig`.
    #[must_use]
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }

    /// Confirms that `authenticated_email` belongs to the institution and that its
    /// local part equals `claimed_id`, both compared case-insensitively.
    ///
    /// # Errors
    /// `WrongDomain` when the email is malformed or outside the domain,
    /// `IdMismatch` when the local part differs from the claimed identifier.
    pub fn verify(&self, claimed_id: &str, authenticated_email: &str) -> Result<(), IdentityError> {
        let (local, domain) =
            split_email(authenticated_email).ok_or(IdentityError::WrongDomain)?;

        if domain != self.domain {
            return Err(IdentityError::WrongDomain);
        }

        if local != claimed_id.trim().to_lowercase() {
            return Err(IdentityError::IdMismatch);
        }

        Ok(())
    }

    /// Returns `true` when `email` is a well-formed address in this verifier's domain.
    #[must_use]
    pub fn in_domain(&self, email: &str) -> bool {
        split_email(email).is_some_and(|(_, domain)| domain == self.domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier() -> IdentityVerifier {
        IdentityVerifier::new("veltech.edu.in")
    }

    #[test]
    fn matching_identity_passes() {
        assert_eq!(verifier().verify("vtu21761", "vtu21761@veltech.edu.in"), Ok(()));
    }

    #[test]
    fn comparison_ignores_case() {
        assert_eq!(verifier().verify("VTU21761", "vtu21761@VelTech.EDU.in"), Ok(()));
        assert_eq!(verifier().verify("vtu21761", "VTU21761@veltech.edu.in"), Ok(()));
    }

    #[test]
    fn different_local_part_is_mismatch() {
        assert_eq!(
            verifier().verify("vtu21761", "vtu21762@veltech.edu.in"),
            Err(IdentityError::IdMismatch)
        );
    }

    #[test]
    fn foreign_domain_is_wrong_domain() {
        assert_eq!(
            verifier().verify("vtu21761", "vtu21761@gmail.com"),
            Err(IdentityError::WrongDomain)
        );
        // a subdomain is not the institution
        assert_eq!(
            verifier().verify("vtu21761", "vtu21761@mail.veltech.edu.in"),
            Err(IdentityError::WrongDomain)
        );
        // neither is a domain that merely ends with it
        assert_eq!(
            verifier().verify("vtu21761", "vtu21761@notveltech.edu.in"),
            Err(IdentityError::WrongDomain)
        );
    }

    #[test]
    fn domain_is_checked_before_identifier() {
        assert_eq!(
            verifier().verify("vtu21761", "someone@gmail.com"),
            Err(IdentityError::WrongDomain)
        );
    }

    #[test]
    fn malformed_email_is_wrong_domain() {
        for email in ["", "vtu21761", "vtu21761@", "@veltech.edu.in", "a b@veltech.edu.in"] {
            assert_eq!(
                verifier().verify("vtu21761", email),
                Err(IdentityError::WrongDomain),
                "{email}"
            );
        }
    }

    #[test]
    fn in_domain_checks_staff_email() {
        assert!(verifier().in_domain("gate.staff@veltech.edu.in"));
        assert!(!verifier().in_domain("gate.staff@gmail.com"));
        assert!(!verifier().in_domain("not-an-email"));
    }
}
