use crate::domain_model::*;
use std::time::Duration;

/// Credentials are expected as `Authorization: Bearer <token>`.
pub const BEARER_PREFIX: &str = "Bearer ";

pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(8 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("token signature does not match its payload")]
    SignatureMismatch,
    #[error("token is malformed")]
    Malformed,
    #[error("token encoding failed: {0}")]
    Encoding(String),
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token ttl must be at least one second")]
    InvalidTtl,
    #[error(transparent)]
    Codec(#[from] CodecError),
}

pub trait ClaimsCodec: Send + Sync {
    fn encode(&self, claims: &Claims) -> Result<Token, CodecError>;
    fn decode(&self, token: &str) -> Result<Claims, CodecError>;
}

/// Issues and checks tokens. Holds no per-token state: a token verifies with
/// nothing but the signing secret and its own content.
pub trait TokenAuthority: Send + Sync {
    fn issue(
        &self,
        subject_id: SubjectId,
        is_privileged: bool,
        ttl: Duration,
    ) -> Result<Token, TokenError>;

    fn issue_default(&self, subject_id: SubjectId, is_privileged: bool) -> Result<Token, TokenError>;

    /// Takes the raw `Authorization` header value. Never reports `Forbidden`;
    /// privilege is the gate's concern.
    fn verify(&self, credential: Option<&str>) -> AuthOutcome;
}
