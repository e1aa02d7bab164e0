use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application_port::AuthError;
use crate::domain_model::RefreshTokenRecord;
use crate::domain_port::RefreshTokenRepo;
use crate::infra_memory::MemoryDb;

pub struct MemoryRefreshTokenRepo {
    db: Arc<MemoryDb>,
}

impl MemoryRefreshTokenRepo {
    pub fn new(db: Arc<MemoryDb>) -> Self {
        MemoryRefreshTokenRepo { db }
    }
}

#[async_trait::async_trait]
impl RefreshTokenRepo for MemoryRefreshTokenRepo {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), AuthError> {
        self.db
            .refresh_tokens
            .insert(record.token.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<RefreshTokenRecord>, AuthError> {
        Ok(self.db.refresh_tokens.get(token).map(|row| row.clone()))
    }

    async fn set_revoked(&self, token: &str, revoked_at: DateTime<Utc>) -> Result<(), AuthError> {
        if let Some(mut row) = self.db.refresh_tokens.get_mut(token) {
            if row.revoked_at.is_none() {
                row.revoked_at = Some(revoked_at);
                row.updated_at = revoked_at;
            }
        }
        Ok(())
    }
}
