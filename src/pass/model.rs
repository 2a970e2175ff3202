//! Typed pass records.
//!
//! `Pass` is the only shape the rest of the crate sees. Stores build it through
//! `Pass::from_parts`, which rejects malformed rows instead of letting empty
//! fields leak into responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use super::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PassStatus {
    /// Eligible for one admission.
    Active,
    /// Terminal.
    Used,
}

impl PassStatus {
    /// Returns the persisted representation; must match the `passes.status` check constraint.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Used => "USED",
        }
    }
}

impl fmt::Display for PassStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PassStatus {
    type Err = StoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ACTIVE" => Ok(Self::Active),
            "USED" => Ok(Self::Used),
            other => Err(StoreError::Corrupt(format!("invalid status value: {other}"))),
        }
    }
}

/// Registrant identity captured at registration; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RegistrantIdentity {
    pub identifier: String,
    pub full_name: String,
    pub department: String,
    pub year_level: String,
    pub email: String,
}

impl RegistrantIdentity {
    fn missing_field(&self) -> Option<&'static str> {
        [
            ("identifier", &self.identifier),
            ("full_name", &self.full_name),
            ("department", &self.department),
            ("year_level", &self.year_level),
            ("email", &self.email),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pass {
    token: String,
    identity: RegistrantIdentity,
    status: PassStatus,
    issued_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    admitted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    admitted_by: Option<String>,
}

impl Pass {
    /// Issues a fresh `ACTIVE` pass.
    #[must_use]
    pub fn issue(token: String, identity: RegistrantIdentity) -> Self {
        Self {
            token,
            identity,
            status: PassStatus::Active,
            issued_at: Utc::now(),
            admitted_at: None,
            admitted_by: None,
        }
    }

    /// Rebuilds a pass from persisted fields.
    ///
    /// # Errors
    /// Returns `StoreError::Corrupt` if the token or any identity field is empty,
    /// or if a `USED` pass lacks its admission timestamp.
    pub fn from_parts(
        token: String,
        identity: RegistrantIdentity,
        status: PassStatus,
        issued_at: DateTime<Utc>,
        admitted_at: Option<DateTime<Utc>>,
        admitted_by: Option<String>,
    ) -> Result<Self, StoreError> {
        if token.trim().is_empty() {
            return Err(StoreError::Corrupt("empty token".to_string()));
        }
        if let Some(field) = identity.missing_field() {
            return Err(StoreError::Corrupt(format!(
                "pass {token} has empty field {field}"
            )));
        }
        if status == PassStatus::Used && admitted_at.is_none() {
            return Err(StoreError::Corrupt(format!(
                "pass {token} is USED without admitted_at"
            )));
        }

        Ok(Self {
            token,
            identity,
            status,
            issued_at,
            admitted_at,
            admitted_by,
        })
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn identity(&self) -> &RegistrantIdentity {
        &self.identity
    }

    #[must_use]
    pub fn status(&self) -> PassStatus {
        self.status
    }

    #[must_use]
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    #[must_use]
    pub fn admitted_at(&self) -> Option<DateTime<Utc>> {
        self.admitted_at
    }

    #[must_use]
    pub fn admitted_by(&self) -> Option<&str> {
        self.admitted_by.as_deref()
    }

    /// Applies the `ACTIVE -> USED` transition to this copy.
    /// Stores call this after their conditional write succeeds.
    pub(crate) fn mark_used(&mut self, admitted_by: &str, at: DateTime<Utc>) {
        self.status = PassStatus::Used;
        self.admitted_at = Some(at);
        self.admitted_by = Some(admitted_by.to_string());
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn identity(identifier: &str) -> RegistrantIdentity {
        RegistrantIdentity {
            identifier: identifier.to_string(),
            full_name: "Mahesh Chanu".to_string(),
            department: "CSE".to_string(),
            year_level: "3rd Year".to_string(),
            email: format!("{identifier}@veltech.edu.in"),
        }
    }

    #[test]
    fn status_round_trips_through_db_text() {
        for status in [PassStatus::Active, PassStatus::Used] {
            assert_eq!(status.as_str().parse::<PassStatus>().ok(), Some(status));
        }
        assert!(matches!(
            "used".parse::<PassStatus>(),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn status_serializes_upper_case() {
        let json = serde_json::to_string(&PassStatus::Active).unwrap();
        assert_eq!(json, "\"ACTIVE\"");
    }

    #[test]
    fn issued_pass_is_active() {
        let pass = Pass::issue("LAVAZA_VTU21761_AB12CD34".to_string(), identity("vtu21761"));
        assert_eq!(pass.status(), PassStatus::Active);
        assert!(pass.admitted_at().is_none());
        assert!(pass.admitted_by().is_none());
    }

    #[test]
    fn from_parts_rejects_empty_fields() {
        let mut broken = identity("vtu21761");
        broken.department = "  ".to_string();

        let err = Pass::from_parts(
            "LAVAZA_VTU21761_AB12".to_string(),
            broken,
            PassStatus::Active,
            Utc::now(),
            None,
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("department"));

        assert!(Pass::from_parts(
            String::new(),
            identity("vtu21761"),
            PassStatus::Active,
            Utc::now(),
            None,
            None,
        )
        .is_err());
    }

    #[test]
    fn from_parts_rejects_used_without_admission_time() {
        let result = Pass::from_parts(
            "LAVAZA_VTU21761_AB12".to_string(),
            identity("vtu21761"),
            PassStatus::Used,
            Utc::now(),
            None,
            None,
        );
        assert!(matches!(result, Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn mark_used_records_audit_fields() {
        let mut pass = Pass::issue("LAVAZA_VTU21761_AB12".to_string(), identity("vtu21761"));
        let now = Utc::now();
        pass.mark_used("gate1@veltech.edu.in", now);
        assert_eq!(pass.status(), PassStatus::Used);
        assert_eq!(pass.admitted_at(), Some(now));
        assert_eq!(pass.admitted_by(), Some("gate1@veltech.edu.in"));
    }
}
