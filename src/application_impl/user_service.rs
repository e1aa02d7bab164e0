use std::sync::Arc;

use chrono::Utc;

use crate::application_port::{
    CredentialHasher, NewUserInput, StoredCredentials, UserError, UserService,
};
use crate::domain_model::{UserId, UserRecord};
use crate::domain_port::UserRepo;

pub struct RealUserService {
    repo: Arc<dyn UserRepo>,
    hasher: Arc<dyn CredentialHasher>,
}

impl RealUserService {
    pub fn new(repo: Arc<dyn UserRepo>, hasher: Arc<dyn CredentialHasher>) -> Self {
        RealUserService { repo, hasher }
    }

    async fn hash(&self, password: &str) -> Result<String, UserError> {
        self.hasher
            .hash_password(password)
            .await
            .map_err(|e| UserError::InternalError(e.to_string()))
    }
}

#[async_trait::async_trait]
impl UserService for RealUserService {
    async fn create(&self, input: NewUserInput) -> Result<UserRecord, UserError> {
        let password_hash = self.hash(&input.password).await?;
        let now = Utc::now();
        let record = UserRecord {
            user_id: UserId(uuid::Uuid::new_v4()),
            email: input.email,
            is_chirpy_red: false,
            created_at: now,
            updated_at: now,
        };
        self.repo.insert(&record, &password_hash).await?;
        Ok(record)
    }

    async fn update(&self, user_id: UserId, input: NewUserInput) -> Result<UserRecord, UserError> {
        let password_hash = self.hash(&input.password).await?;
        self.repo.update(user_id, &input.email, &password_hash).await
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<(UserRecord, StoredCredentials)>, UserError> {
        Ok(self.repo.get_by_email(email).await?.map(|(record, hash)| {
            let credentials = StoredCredentials {
                user_id: record.user_id,
                password_hash: hash,
            };
            (record, credentials)
        }))
    }

    async fn upgrade_to_chirpy_red(&self, user_id: UserId) -> Result<(), UserError> {
        if self.repo.set_chirpy_red(user_id).await? {
            Ok(())
        } else {
            Err(UserError::UserNotFound)
        }
    }

    async fn reset(&self) -> Result<(), UserError> {
        self.repo.delete_all().await
    }
}
