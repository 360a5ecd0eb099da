use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicI64, Ordering};

/// Process-local identity store. Ids are handed out sequentially from 1.
pub struct InMemoryIdentityRepo {
    by_id: DashMap<SubjectId, Identity>,
    by_gmail: DashMap<String, SubjectId>,
    next_id: AtomicI64,
}

impl InMemoryIdentityRepo {
    pub fn new() -> Self {
        InMemoryIdentityRepo {
            by_id: DashMap::new(),
            by_gmail: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryIdentityRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IdentityRepo for InMemoryIdentityRepo {
    async fn find_by_id(&self, id: SubjectId) -> Result<Option<Identity>, RepoError> {
        Ok(self.by_id.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_gmail(&self, gmail: &str) -> Result<Option<Identity>, RepoError> {
        let id = match self.by_gmail.get(gmail) {
            Some(entry) => *entry.value(),
            None => return Ok(None),
        };
        self.find_by_id(id).await
    }

    async fn save(&self, identity: NewIdentity) -> Result<Identity, RepoError> {
        match self.by_gmail.entry(identity.gmail.clone()) {
            Entry::Occupied(_) => Err(RepoError::DuplicateKey(identity.gmail)),
            Entry::Vacant(slot) => {
                let id = SubjectId(self.next_id.fetch_add(1, Ordering::SeqCst));
                let identity = identity.with_id(id);
                self.by_id.insert(id, identity.clone());
                slot.insert(id);
                Ok(identity)
            }
        }
    }

    async fn update(&self, id: SubjectId, changes: IdentityChanges) -> Result<Identity, RepoError> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or(RepoError::NotFound)?;

        if let Some(gmail) = changes.gmail.as_ref().filter(|g| **g != current.gmail) {
            match self.by_gmail.entry(gmail.clone()) {
                Entry::Occupied(_) => return Err(RepoError::DuplicateKey(gmail.clone())),
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
            self.by_gmail.remove(&current.gmail);
        }

        let mut entry = self.by_id.get_mut(&id).ok_or(RepoError::NotFound)?;
        let identity = entry.value_mut();
        if let Some(name) = changes.name {
            identity.name = Some(name);
        }
        if let Some(gmail) = changes.gmail {
            identity.gmail = gmail;
        }
        if let Some(password_hash) = changes.password_hash {
            identity.password_hash = password_hash;
        }
        Ok(identity.clone())
    }

    async fn list_all(&self) -> Result<Vec<Identity>, RepoError> {
        let mut all: Vec<Identity> = self
            .by_id
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by_key(|identity| identity.id);
        Ok(all)
    }
}
