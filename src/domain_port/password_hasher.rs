#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("stored hash is not a valid PHC string: {0}")]
    InvalidHash(String),
    #[error("hashing failed: {0}")]
    Internal(String),
}

#[async_trait::async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, plaintext: &str) -> Result<String, HashError>;
    async fn verify(&self, plaintext: &str, password_hash: &str) -> Result<bool, HashError>;
}
