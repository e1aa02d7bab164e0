use std::sync::Arc;

use crate::application_port::ChirpError;
use crate::domain_model::{ChirpId, ChirpRecord, UserId};
use crate::domain_port::ChirpRepo;
use crate::infra_memory::MemoryDb;

pub struct MemoryChirpRepo {
    db: Arc<MemoryDb>,
}

impl MemoryChirpRepo {
    pub fn new(db: Arc<MemoryDb>) -> Self {
        MemoryChirpRepo { db }
    }
}

#[async_trait::async_trait]
impl ChirpRepo for MemoryChirpRepo {
    async fn insert(&self, record: &ChirpRecord) -> Result<(), ChirpError> {
        self.db.chirps.insert(record.chirp_id, record.clone());
        Ok(())
    }

    async fn get(&self, chirp_id: ChirpId) -> Result<Option<ChirpRecord>, ChirpError> {
        Ok(self.db.chirps.get(&chirp_id).map(|row| row.clone()))
    }

    async fn list(&self, author: Option<UserId>) -> Result<Vec<ChirpRecord>, ChirpError> {
        Ok(self
            .db
            .chirps
            .iter()
            .filter(|entry| author.is_none_or(|id| entry.value().user_id == id))
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn delete(&self, chirp_id: ChirpId) -> Result<bool, ChirpError> {
        Ok(self.db.chirps.remove(&chirp_id).is_some())
    }
}
