//! Idempotent registration.

use serde::Deserialize;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use super::{
    error::{RegistrationError, StoreError},
    model::{Pass, RegistrantIdentity},
    PassService,
};

/// Token collisions are astronomically rare; a few retries is plenty.
const MAX_ISSUE_ATTEMPTS: usize = 3;

/// Form fields submitted alongside the authenticated email.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct RegistrationForm {
    pub identifier: String,
    pub full_name: String,
    pub department: String,
    pub year_level: String,
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub pass: Pass,
    /// `false` when the registrant already held a pass.
    pub created: bool,
}

impl RegistrationForm {
    fn into_identity(self, email: &str) -> Result<RegistrantIdentity, RegistrationError> {
        let identity = RegistrantIdentity {
            identifier: self.identifier.trim().to_lowercase(),
            full_name: self.full_name.trim().to_string(),
            department: self.department.trim().to_string(),
            year_level: self.year_level.trim().to_string(),
            email: email.trim().to_lowercase(),
        };
        let complete = [
            &identity.identifier,
            &identity.full_name,
            &identity.department,
            &identity.year_level,
        ]
        .iter()
        .all(|value| !value.is_empty());

        if complete {
            Ok(identity)
        } else {
            Err(RegistrationError::IncompleteForm)
        }
    }
}

impl PassService {
    /// Registers the authenticated user, returning their existing pass if they
    /// already registered.
    ///
    /// # Errors
    /// `IncompleteForm` for empty fields, `Identity` when the email does not match
    /// the identifier (the caller must then end the user's session), `Store` for
    /// backend failures.
    #[instrument(skip(self, form), fields(identifier = %form.identifier))]
    pub async fn register(
        &self,
        form: RegistrationForm,
        authenticated_email: &str,
    ) -> Result<Registration, RegistrationError> {
        let identity = form.into_identity(authenticated_email)?;

        if let Err(err) = self.registrants.verify(&identity.identifier, &identity.email) {
            warn!(email = %identity.email, "identity rejected: {err}");
            return Err(err.into());
        }

        if let Some(pass) = self.store.find_by_identifier(&identity.identifier).await? {
            info!(token = pass.token(), "returning existing pass");
            return Ok(Registration {
                pass,
                created: false,
            });
        }

        for _ in 0..MAX_ISSUE_ATTEMPTS {
            let pass = Pass::issue(self.tokens.generate(&identity.identifier), identity.clone());

            match self.store.create(&pass).await {
                Ok(()) => {
                    info!(token = pass.token(), "pass issued");
                    return Ok(Registration {
                        pass,
                        created: true,
                    });
                }
                Err(StoreError::AlreadyExists) => {
                    // Lost a race with a concurrent registration, or hit a token collision.
                    if let Some(pass) = self.store.find_by_identifier(&identity.identifier).await? {
                        return Ok(Registration {
                            pass,
                            created: false,
                        });
                    }
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(StoreError::AlreadyExists.into())
    }
}
