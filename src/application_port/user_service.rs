use crate::application_port::StoredCredentials;
use crate::domain_model::{UserId, UserRecord};

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("email already registered")]
    EmailTaken,
    #[error("user not found")]
    UserNotFound,
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(Debug, Clone)]
pub struct NewUserInput {
    pub email: String,
    pub password: String,
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    async fn create(&self, input: NewUserInput) -> Result<UserRecord, UserError>;

    async fn update(&self, user_id: UserId, input: NewUserInput) -> Result<UserRecord, UserError>;

    /// Lookup used by the login handler; the stored hash is handed to the
    /// session service, never compared directly.
    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<(UserRecord, StoredCredentials)>, UserError>;

    /// Marks the account as Chirpy Red (the paid tier flipped by the Polka
    /// webhook).
    async fn upgrade_to_chirpy_red(&self, user_id: UserId) -> Result<(), UserError>;

    /// Deletes every user; chirps and refresh tokens go with them. Gated to
    /// the dev platform by the admin handler.
    async fn reset(&self) -> Result<(), UserError>;
}
