use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::{info, warn};
use std::sync::Arc;

pub const REGISTER_FIELDS_REQUIRED: &str = "Name, Gmail and Password are required";
pub const LOGIN_FIELDS_REQUIRED: &str = "gmail and password are required";
pub const UPDATE_FAILED: &str = "Error occurred while updating";

pub struct RealIdentityService {
    repo: Arc<dyn IdentityRepo>,
    hasher: Arc<dyn PasswordHasher>,
    authority: Arc<dyn TokenAuthority>,
    notifier: Arc<dyn NotificationSink>,
}

impl RealIdentityService {
    pub fn new(
        repo: Arc<dyn IdentityRepo>,
        hasher: Arc<dyn PasswordHasher>,
        authority: Arc<dyn TokenAuthority>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        RealIdentityService {
            repo,
            hasher,
            authority,
            notifier,
        }
    }

    /// Creates an admin identity unless one with this gmail already exists.
    /// Used to bootstrap a fresh store, since registration itself needs an
    /// admin token.
    pub async fn ensure_admin(
        &self,
        name: &str,
        gmail: &str,
        password: &str,
    ) -> Result<SubjectId, ServiceError> {
        if let Some(existing) = self.repo.find_by_gmail(gmail).await? {
            return Ok(existing.id);
        }

        let password_hash = self.hasher.hash(password).await?;
        let identity = self
            .repo
            .save(NewIdentity {
                name: Some(name.to_string()),
                gmail: gmail.to_string(),
                password_hash,
                is_admin: true,
                created_by: None,
            })
            .await?;
        info!("seeded admin identity {} ({})", identity.id, identity.gmail);
        Ok(identity.id)
    }

    async fn send_welcome(&self, identity: &Identity) {
        let greeting = identity.name.as_deref().unwrap_or("there");
        let body = format!(
            "Hi {},\n\nAn account was created for you. Sign in with {}.",
            greeting, identity.gmail
        );
        if let Err(e) = self
            .notifier
            .send(&identity.gmail, "Welcome to WorkClock", &body)
            .await
        {
            warn!("welcome notification to {} failed: {:#}", identity.gmail, e);
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[async_trait::async_trait]
impl IdentityService for RealIdentityService {
    async fn register(
        &self,
        created_by: SubjectId,
        input: RegisterInput,
    ) -> Result<SubjectId, ServiceError> {
        let (Some(name), Some(gmail), Some(password)) = (
            non_empty(input.name),
            non_empty(input.gmail),
            non_empty(input.password),
        ) else {
            return Err(ServiceError::InvalidInput(
                REGISTER_FIELDS_REQUIRED.to_string(),
            ));
        };

        let password_hash = self.hasher.hash(&password).await?;
        let identity = self
            .repo
            .save(NewIdentity {
                name: Some(name),
                gmail,
                password_hash,
                is_admin: input.is_admin,
                created_by: Some(created_by),
            })
            .await?;
        info!(
            "identity {} registered by {} (admin: {})",
            identity.id, created_by, identity.is_admin
        );

        self.send_welcome(&identity).await;
        Ok(identity.id)
    }

    async fn login(&self, input: LoginInput) -> Result<LoginResult, ServiceError> {
        let (Some(gmail), Some(password)) = (non_empty(input.gmail), non_empty(input.password))
        else {
            return Err(ServiceError::InvalidInput(LOGIN_FIELDS_REQUIRED.to_string()));
        };

        let identity = self
            .repo
            .find_by_gmail(&gmail)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        if !self.hasher.verify(&password, &identity.password_hash).await? {
            return Err(ServiceError::InvalidCredentials);
        }

        let token = self
            .authority
            .issue_default(identity.id, identity.is_admin)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        Ok(LoginResult {
            subject_id: identity.id,
            token,
        })
    }

    async fn profile(&self, subject_id: SubjectId) -> Result<ProfileView, ServiceError> {
        let identity = self
            .repo
            .find_by_id(subject_id)
            .await?
            .ok_or(ServiceError::NotFound)?;
        Ok(ProfileView::from(&identity))
    }

    async fn update_profile(
        &self,
        subject_id: SubjectId,
        input: UpdateProfileInput,
    ) -> Result<(), ServiceError> {
        if self.repo.find_by_id(subject_id).await?.is_none() {
            return Err(ServiceError::NotFound);
        }

        let password_hash = match non_empty(input.password) {
            Some(password) => Some(self.hasher.hash(&password).await?),
            None => None,
        };
        let changes = IdentityChanges {
            name: non_empty(input.name),
            gmail: non_empty(input.gmail),
            password_hash,
        };

        match self.repo.update(subject_id, changes).await {
            Ok(_) => Ok(()),
            Err(RepoError::DuplicateKey(gmail)) => {
                warn!("profile update for {} hit taken gmail {}", subject_id, gmail);
                Err(ServiceError::InvalidInput(UPDATE_FAILED.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_all(&self) -> Result<Vec<IdentitySummary>, ServiceError> {
        let identities = self.repo.list_all().await?;
        Ok(identities.iter().map(IdentitySummary::from).collect())
    }
}
