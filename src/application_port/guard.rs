use crate::application_port::ServiceError;
use crate::domain_model::*;
use crate::resilience::{BreakerFailure, FailureClass};
use futures_util::future::BoxFuture;
use uuid::Uuid;

/// Why a gate refused a call. The display strings are what clients see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthRejection {
    #[error("Token is missing")]
    Missing,
    #[error("Invalid token")]
    Invalid,
    #[error("Token has expired")]
    Expired,
    #[error("Admin required for this action")]
    Forbidden,
}

impl AuthRejection {
    /// Everything but `Forbidden` means the caller is not authenticated.
    pub fn is_unauthenticated(&self) -> bool {
        !matches!(self, AuthRejection::Forbidden)
    }
}

impl TryFrom<AuthOutcome> for Principal {
    type Error = AuthRejection;

    fn try_from(outcome: AuthOutcome) -> Result<Self, Self::Error> {
        match outcome {
            AuthOutcome::Authenticated {
                subject_id,
                is_privileged,
            } => Ok(Principal {
                subject_id,
                is_privileged,
            }),
            AuthOutcome::Missing => Err(AuthRejection::Missing),
            AuthOutcome::Invalid => Err(AuthRejection::Invalid),
            AuthOutcome::Expired => Err(AuthRejection::Expired),
            AuthOutcome::Forbidden => Err(AuthRejection::Forbidden),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    #[error(transparent)]
    Rejected(#[from] AuthRejection),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl BreakerFailure for ServiceError {
    fn failure_class(&self) -> FailureClass {
        match self {
            // A broken hasher or signer fails every call alike, same as a dead store.
            ServiceError::Upstream(_) | ServiceError::Internal(_) => FailureClass::Upstream,
            ServiceError::DuplicateIdentity | ServiceError::NotFound => FailureClass::Domain,
            ServiceError::InvalidInput(_) | ServiceError::InvalidCredentials => {
                FailureClass::Rejected
            }
        }
    }
}

impl BreakerFailure for GuardError {
    fn failure_class(&self) -> FailureClass {
        match self {
            GuardError::Rejected(_) => FailureClass::Rejected,
            GuardError::Service(e) => e.failure_class(),
        }
    }
}

/// Per-call state threaded through a guard chain.
#[derive(Debug, Clone)]
pub struct CallContext {
    pub request_id: Uuid,
    /// Raw `Authorization` header value, if any.
    pub authorization: Option<String>,
    /// Set by an auth gate once the credential checks out.
    pub principal: Option<Principal>,
}

impl CallContext {
    pub fn new(authorization: Option<String>) -> Self {
        CallContext {
            request_id: Uuid::new_v4(),
            authorization,
            principal: None,
        }
    }

    pub fn anonymous() -> Self {
        Self::new(None)
    }

    /// The authenticated principal. A handler reached without passing a gate
    /// is treated as having no credential.
    pub fn require_principal(&self) -> Result<Principal, AuthRejection> {
        self.principal.ok_or(AuthRejection::Missing)
    }
}

pub type GuardResult<T> = Result<T, GuardError>;

/// The rest of the chain, handed to a guard that decides whether to run it.
pub type Next<'a, T> = Box<dyn FnOnce(CallContext) -> BoxFuture<'a, GuardResult<T>> + Send + 'a>;

pub trait Guard<T>: Send + Sync {
    fn invoke<'a>(&'a self, ctx: CallContext, next: Next<'a, T>) -> BoxFuture<'a, GuardResult<T>>;
}
