use crate::application_port::UserError;
use crate::domain_model::{UserId, UserRecord};

#[async_trait::async_trait]
pub trait UserRepo: Send + Sync {
    /// Insert a row. Fails with `EmailTaken` when the email is already
    /// registered.
    async fn insert(&self, record: &UserRecord, password_hash: &str) -> Result<(), UserError>;

    /// Fetch a user and their stored hash by email (for login).
    async fn get_by_email(&self, email: &str) -> Result<Option<(UserRecord, String)>, UserError>;

    /// Replace email and password hash; returns the updated row.
    async fn update(
        &self,
        user_id: UserId,
        email: &str,
        password_hash: &str,
    ) -> Result<UserRecord, UserError>;

    /// Returns `false` when no such user exists.
    async fn set_chirpy_red(&self, user_id: UserId) -> Result<bool, UserError>;

    /// Deletes all users; dependent rows cascade.
    async fn delete_all(&self) -> Result<(), UserError>;
}
