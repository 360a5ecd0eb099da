use crate::domain_model::*;

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("duplicate key: {0}")]
    DuplicateKey(String),
    #[error("record not found")]
    NotFound,
    #[error("store error: {0}")]
    Store(String),
}

/// Changes applied by [`IdentityRepo::update`]. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct IdentityChanges {
    pub name: Option<String>,
    pub gmail: Option<String>,
    pub password_hash: Option<String>,
}

#[async_trait::async_trait]
pub trait IdentityRepo: Send + Sync {
    async fn find_by_id(&self, id: SubjectId) -> Result<Option<Identity>, RepoError>;

    async fn find_by_gmail(&self, gmail: &str) -> Result<Option<Identity>, RepoError>;

    /// Assigns an id and stores the identity. Fails with `DuplicateKey` if the
    /// gmail is taken.
    async fn save(&self, identity: NewIdentity) -> Result<Identity, RepoError>;

    async fn update(&self, id: SubjectId, changes: IdentityChanges) -> Result<Identity, RepoError>;

    async fn list_all(&self) -> Result<Vec<Identity>, RepoError>;
}
