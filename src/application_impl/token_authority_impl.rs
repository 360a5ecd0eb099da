use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::Clock;
use crate::logger::debug;
use chrono::TimeDelta;
use std::sync::Arc;
use std::time::Duration;

pub struct JwtTokenAuthority {
    codec: Arc<dyn ClaimsCodec>,
    clock: Arc<dyn Clock>,
    default_ttl: Duration,
}

impl JwtTokenAuthority {
    pub fn new(codec: Arc<dyn ClaimsCodec>, clock: Arc<dyn Clock>, default_ttl: Duration) -> Self {
        JwtTokenAuthority {
            codec,
            clock,
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}

impl TokenAuthority for JwtTokenAuthority {
    fn issue(
        &self,
        subject_id: SubjectId,
        is_privileged: bool,
        ttl: Duration,
    ) -> Result<Token, TokenError> {
        let ttl = TimeDelta::from_std(ttl).map_err(|_| TokenError::InvalidTtl)?;
        if ttl < TimeDelta::seconds(1) {
            return Err(TokenError::InvalidTtl);
        }

        let issued_at = self.clock.now();
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or(TokenError::InvalidTtl)?;
        let claims = Claims::new(subject_id, is_privileged, issued_at, expires_at)
            .ok_or(TokenError::InvalidTtl)?;

        Ok(self.codec.encode(&claims)?)
    }

    fn issue_default(&self, subject_id: SubjectId, is_privileged: bool) -> Result<Token, TokenError> {
        self.issue(subject_id, is_privileged, self.default_ttl)
    }

    fn verify(&self, credential: Option<&str>) -> AuthOutcome {
        let Some(token) = credential
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .filter(|token| !token.is_empty())
        else {
            return AuthOutcome::Missing;
        };

        match self.codec.decode(token) {
            Err(e) => {
                debug!("token rejected: {}", e);
                AuthOutcome::Invalid
            }
            Ok(claims) if claims.is_expired_at(self.clock.now()) => AuthOutcome::Expired,
            Ok(claims) => claims.principal().into(),
        }
    }
}
