use crate::domain_model::SubjectId;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct Identity {
    pub id: SubjectId,
    pub name: Option<String>,
    pub gmail: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_by: Option<SubjectId>,
}

/// An identity that has not been assigned an id by the repository yet.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub name: Option<String>,
    pub gmail: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_by: Option<SubjectId>,
}

impl NewIdentity {
    pub fn with_id(self, id: SubjectId) -> Identity {
        Identity {
            id,
            name: self.name,
            gmail: self.gmail,
            password_hash: self.password_hash,
            is_admin: self.is_admin,
            created_by: self.created_by,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub id: SubjectId,
    pub gmail: String,
    pub name: Option<String>,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct IdentitySummary {
    pub id: SubjectId,
    pub name: Option<String>,
    pub gmail: String,
    pub is_admin: bool,
    pub created_by: Option<SubjectId>,
}

impl From<&Identity> for ProfileView {
    fn from(identity: &Identity) -> Self {
        ProfileView {
            id: identity.id,
            gmail: identity.gmail.clone(),
            name: identity.name.clone(),
            is_admin: identity.is_admin,
        }
    }
}

impl From<&Identity> for IdentitySummary {
    fn from(identity: &Identity) -> Self {
        IdentitySummary {
            id: identity.id,
            name: identity.name.clone(),
            gmail: identity.gmail.clone(),
            is_admin: identity.is_admin,
            created_by: identity.created_by,
        }
    }
}
