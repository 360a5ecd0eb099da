use crate::application_port::*;
use crate::domain_model::*;
use crate::logger::debug;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// Admits a call only when its bearer token checks out and, for admin gates,
/// carries the privileged flag.
#[derive(Clone)]
pub struct AuthGate {
    authority: Arc<dyn TokenAuthority>,
    require_admin: bool,
}

impl AuthGate {
    pub fn new(authority: Arc<dyn TokenAuthority>) -> Self {
        AuthGate {
            authority,
            require_admin: false,
        }
    }

    pub fn admin(authority: Arc<dyn TokenAuthority>) -> Self {
        Self::new(authority).require_admin(true)
    }

    pub fn require_admin(mut self, require_admin: bool) -> Self {
        self.require_admin = require_admin;
        self
    }

    pub fn requires_admin(&self) -> bool {
        self.require_admin
    }

    pub fn evaluate(&self, credential: Option<&str>) -> AuthOutcome {
        match self.authority.verify(credential) {
            AuthOutcome::Authenticated {
                is_privileged: false,
                ..
            } if self.require_admin => AuthOutcome::Forbidden,
            outcome => outcome,
        }
    }

    pub fn authorize(&self, credential: Option<&str>) -> Result<Principal, AuthRejection> {
        Principal::try_from(self.evaluate(credential)).inspect_err(|rejection| {
            debug!(
                "auth gate refused call: {} (admin gate: {})",
                rejection, self.require_admin
            )
        })
    }

    /// Runs `operation` with the caller's subject id, or fails with the
    /// rejection without running it.
    pub async fn wrap<T, E, F, Fut>(&self, credential: Option<&str>, operation: F) -> Result<T, E>
    where
        F: FnOnce(SubjectId) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<AuthRejection>,
    {
        let principal = self.authorize(credential)?;
        operation(principal.subject_id).await
    }
}

impl<T: Send + 'static> Guard<T> for AuthGate {
    fn invoke<'a>(
        &'a self,
        mut ctx: CallContext,
        next: Next<'a, T>,
    ) -> BoxFuture<'a, GuardResult<T>> {
        match self.authorize(ctx.authorization.as_deref()) {
            Ok(principal) => {
                ctx.principal = Some(principal);
                next(ctx)
            }
            Err(rejection) => async move { Err(GuardError::Rejected(rejection)) }.boxed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::{JwtHs256Codec, JwtTokenAuthority};
    use crate::infra_local::FakeClock;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn authority(clock: Arc<FakeClock>) -> Arc<dyn TokenAuthority> {
        Arc::new(JwtTokenAuthority::new(
            Arc::new(JwtHs256Codec::new(b"gate-secret")),
            clock,
            DEFAULT_TOKEN_TTL,
        ))
    }

    #[test]
    fn admin_gate_forbids_plain_tokens_only() {
        let authority = authority(Arc::new(FakeClock::starting_now()));
        let gate = AuthGate::admin(authority.clone());
        let plain = authority.issue_default(SubjectId(3), false).unwrap().bearer();
        let admin = authority.issue_default(SubjectId(4), true).unwrap().bearer();

        assert_eq!(gate.evaluate(Some(&plain)), AuthOutcome::Forbidden);
        assert_eq!(
            gate.evaluate(Some(&admin)),
            AuthOutcome::Authenticated {
                subject_id: SubjectId(4),
                is_privileged: true
            }
        );
        assert_eq!(gate.evaluate(None), AuthOutcome::Missing);
    }

    #[test]
    fn plain_gate_admits_any_valid_token() {
        let authority = authority(Arc::new(FakeClock::starting_now()));
        let gate = AuthGate::new(authority.clone());
        for admin in [false, true] {
            let header = authority.issue_default(SubjectId(8), admin).unwrap().bearer();
            assert_eq!(
                gate.authorize(Some(&header)),
                Ok(Principal {
                    subject_id: SubjectId(8),
                    is_privileged: admin
                })
            );
        }
    }

    #[test]
    fn expired_admin_token_is_expired_not_forbidden() {
        let clock = Arc::new(FakeClock::starting_now());
        let authority = authority(clock.clone());
        let gate = AuthGate::admin(authority.clone());
        let header = authority
            .issue(SubjectId(1), false, Duration::from_secs(10))
            .unwrap()
            .bearer();

        clock.advance(Duration::from_secs(11));
        assert_eq!(gate.authorize(Some(&header)), Err(AuthRejection::Expired));
    }

    #[tokio::test]
    async fn wrap_skips_the_operation_on_rejection() {
        let authority = authority(Arc::new(FakeClock::starting_now()));
        let gate = AuthGate::admin(authority.clone());
        let calls = AtomicUsize::new(0);
        let plain = authority.issue_default(SubjectId(3), false).unwrap().bearer();

        let result: Result<SubjectId, GuardError> = gate
            .wrap(Some(&plain), |id| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok(id) }
            })
            .await;
        assert!(matches!(
            result,
            Err(GuardError::Rejected(AuthRejection::Forbidden))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let admin = authority.issue_default(SubjectId(4), true).unwrap().bearer();
        let result: Result<SubjectId, GuardError> =
            gate.wrap(Some(&admin), |id| async move { Ok(id) }).await;
        assert_eq!(result.unwrap(), SubjectId(4));
    }

    #[tokio::test]
    async fn guard_hands_the_principal_downstream() {
        let authority = authority(Arc::new(FakeClock::starting_now()));
        let gate = AuthGate::new(authority.clone());
        let header = authority.issue_default(SubjectId(12), false).unwrap().bearer();

        let next: Next<'_, SubjectId> = Box::new(|ctx: CallContext| {
            async move {
                let principal = ctx.require_principal()?;
                Ok::<_, GuardError>(principal.subject_id)
            }
            .boxed()
        });
        let result = gate.invoke(CallContext::new(Some(header)), next).await;
        assert_eq!(result.unwrap(), SubjectId(12));

        let next: Next<'_, SubjectId> =
            Box::new(|_ctx: CallContext| async move { Ok::<_, GuardError>(SubjectId(0)) }.boxed());
        let result = gate.invoke(CallContext::anonymous(), next).await;
        assert!(matches!(
            result,
            Err(GuardError::Rejected(AuthRejection::Missing))
        ));
    }
}
