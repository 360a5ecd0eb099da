use crate::domain_model::{Principal, SubjectId};
use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;
use std::fmt;

/// A signed, serialized [`Claims`]. Opaque to everyone but the codec.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Token(pub String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The value a client puts in its `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(..)")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Claims carried by a token. Timestamps are kept at whole seconds because
/// that is all the wire format can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claims {
    subject_id: SubjectId,
    is_privileged: bool,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Claims {
    /// Returns `None` unless `expires_at` is strictly after `issued_at`.
    pub fn new(
        subject_id: SubjectId,
        is_privileged: bool,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Option<Self> {
        let issued_at = issued_at.trunc_subsecs(0);
        let expires_at = expires_at.trunc_subsecs(0);
        if expires_at <= issued_at {
            return None;
        }
        Some(Claims {
            subject_id,
            is_privileged,
            issued_at,
            expires_at,
        })
    }

    pub fn subject_id(&self) -> SubjectId {
        self.subject_id
    }

    pub fn is_privileged(&self) -> bool {
        self.is_privileged
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn principal(&self) -> Principal {
        Principal {
            subject_id: self.subject_id,
            is_privileged: self.is_privileged,
        }
    }
}

/// Result of checking a caller's credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated {
        subject_id: SubjectId,
        is_privileged: bool,
    },
    Missing,
    Expired,
    Invalid,
    Forbidden,
}

impl AuthOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthOutcome::Authenticated { .. })
    }
}

impl From<Principal> for AuthOutcome {
    fn from(principal: Principal) -> Self {
        AuthOutcome::Authenticated {
            subject_id: principal.subject_id,
            is_privileged: principal.is_privileged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn claims_require_expiry_after_issue() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(Claims::new(SubjectId(1), false, at, at).is_none());
        assert!(Claims::new(SubjectId(1), false, at, at - Duration::seconds(1)).is_none());
        assert!(Claims::new(SubjectId(1), false, at, at + Duration::seconds(1)).is_some());
    }

    #[test]
    fn claims_drop_subsecond_precision() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::milliseconds(750);
        let claims = Claims::new(SubjectId(7), true, at, at + Duration::hours(8)).unwrap();
        assert_eq!(claims.issued_at().timestamp_subsec_nanos(), 0);
        assert_eq!(claims.expires_at() - claims.issued_at(), Duration::hours(8));
    }

    #[test]
    fn expiry_boundary_counts_as_expired() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let claims = Claims::new(SubjectId(1), false, at, at + Duration::seconds(10)).unwrap();
        assert!(!claims.is_expired_at(at + Duration::seconds(9)));
        assert!(claims.is_expired_at(at + Duration::seconds(10)));
    }

    #[test]
    fn token_debug_hides_the_secret_material() {
        let token = Token("abc.def.ghi".to_string());
        assert_eq!(format!("{:?}", token), "Token(..)");
        assert_eq!(token.bearer(), "Bearer abc.def.ghi");
    }
}
