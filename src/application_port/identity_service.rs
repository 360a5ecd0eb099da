use crate::domain_model::*;
use crate::domain_port::{HashError, RepoError};
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("identity already exists")]
    DuplicateIdentity,
    #[error("not found")]
    NotFound,
    #[error("upstream failure: {0}")]
    Upstream(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RepoError> for ServiceError {
    fn from(error: RepoError) -> Self {
        match error {
            RepoError::DuplicateKey(_) => ServiceError::DuplicateIdentity,
            RepoError::NotFound => ServiceError::NotFound,
            RepoError::Store(e) => ServiceError::Upstream(e),
        }
    }
}

impl From<HashError> for ServiceError {
    fn from(error: HashError) -> Self {
        warn!("password hashing: {}", error);
        ServiceError::Internal(error.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterInput {
    pub name: Option<String>,
    pub gmail: Option<String>,
    pub password: Option<String>,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Default)]
pub struct LoginInput {
    pub gmail: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoginResult {
    pub subject_id: SubjectId,
    pub token: Token,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProfileInput {
    pub name: Option<String>,
    pub gmail: Option<String>,
    pub password: Option<String>,
}

#[async_trait::async_trait]
pub trait IdentityService: Send + Sync {
    async fn register(
        &self,
        created_by: SubjectId,
        input: RegisterInput,
    ) -> Result<SubjectId, ServiceError>;
    async fn login(&self, input: LoginInput) -> Result<LoginResult, ServiceError>;
    async fn profile(&self, subject_id: SubjectId) -> Result<ProfileView, ServiceError>;
    async fn update_profile(
        &self,
        subject_id: SubjectId,
        input: UpdateProfileInput,
    ) -> Result<(), ServiceError>;
    async fn list_all(&self) -> Result<Vec<IdentitySummary>, ServiceError>;
}
