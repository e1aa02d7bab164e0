use std::sync::Arc;

use chrono::Utc;

use crate::application_port::UserError;
use crate::domain_model::{UserId, UserRecord};
use crate::domain_port::UserRepo;
use crate::infra_memory::MemoryDb;

pub struct MemoryUserRepo {
    db: Arc<MemoryDb>,
}

impl MemoryUserRepo {
    pub fn new(db: Arc<MemoryDb>) -> Self {
        MemoryUserRepo { db }
    }

    fn email_taken(&self, email: &str, exclude: Option<UserId>) -> bool {
        self.db.users.iter().any(|entry| {
            let (record, _) = entry.value();
            record.email == email && Some(record.user_id) != exclude
        })
    }
}

#[async_trait::async_trait]
impl UserRepo for MemoryUserRepo {
    async fn insert(&self, record: &UserRecord, password_hash: &str) -> Result<(), UserError> {
        if self.email_taken(&record.email, None) {
            return Err(UserError::EmailTaken);
        }
        self.db
            .users
            .insert(record.user_id, (record.clone(), password_hash.to_string()));
        Ok(())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<(UserRecord, String)>, UserError> {
        Ok(self
            .db
            .users
            .iter()
            .find(|entry| entry.value().0.email == email)
            .map(|entry| entry.value().clone()))
    }

    async fn update(
        &self,
        user_id: UserId,
        email: &str,
        password_hash: &str,
    ) -> Result<UserRecord, UserError> {
        if self.email_taken(email, Some(user_id)) {
            return Err(UserError::EmailTaken);
        }
        let mut row = self.db.users.get_mut(&user_id).ok_or(UserError::UserNotFound)?;
        let (record, hash) = row.value_mut();
        record.email = email.to_string();
        record.updated_at = Utc::now();
        *hash = password_hash.to_string();
        Ok(record.clone())
    }

    async fn set_chirpy_red(&self, user_id: UserId) -> Result<bool, UserError> {
        match self.db.users.get_mut(&user_id) {
            Some(mut row) => {
                let (record, _) = row.value_mut();
                record.is_chirpy_red = true;
                record.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_all(&self) -> Result<(), UserError> {
        // mirror the Postgres cascade
        self.db.users.clear();
        self.db.chirps.clear();
        self.db.refresh_tokens.clear();
        Ok(())
    }
}
