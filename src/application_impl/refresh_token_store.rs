use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::Rng;

use crate::application_port::{AuthError, RefreshTokenStore};
use crate::domain_model::{RefreshTokenRecord, UserId};
use crate::domain_port::RefreshTokenRepo;

/// How long a refresh token stays usable. Policy constant, not configuration.
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 60;

pub struct PersistedRefreshTokenStore {
    repo: Arc<dyn RefreshTokenRepo>,
    ttl: Duration,
}

impl PersistedRefreshTokenStore {
    pub fn new(repo: Arc<dyn RefreshTokenRepo>, ttl: Duration) -> Self {
        PersistedRefreshTokenStore { repo, ttl }
    }

    /// 256 bits of entropy, hex-encoded. At that size collisions are not a
    /// practical concern, so there is no uniqueness retry.
    fn generate_token() -> String {
        let bytes: [u8; 32] = rand::rng().random();
        hex::encode(bytes)
    }
}

#[async_trait::async_trait]
impl RefreshTokenStore for PersistedRefreshTokenStore {
    async fn issue(&self, user_id: UserId) -> Result<RefreshTokenRecord, AuthError> {
        let now = Utc::now();
        let record = RefreshTokenRecord {
            token: Self::generate_token(),
            user_id,
            created_at: now,
            updated_at: now,
            expires_at: now + self.ttl,
            revoked_at: None,
        };
        self.repo.insert(&record).await?;
        Ok(record)
    }

    async fn resolve(&self, token: &str) -> Result<RefreshTokenRecord, AuthError> {
        let record = self
            .repo
            .get(token)
            .await?
            .ok_or(AuthError::TokenNotFound)?;
        if Utc::now() > record.expires_at {
            return Err(AuthError::TokenExpired);
        }
        if record.revoked_at.is_some() {
            return Err(AuthError::TokenRevoked);
        }
        Ok(record)
    }

    async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        self.repo.set_revoked(token, Utc::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_memory::{MemoryDb, MemoryRefreshTokenRepo};

    fn store_with_repo() -> (PersistedRefreshTokenStore, Arc<MemoryRefreshTokenRepo>) {
        let repo = Arc::new(MemoryRefreshTokenRepo::new(Arc::new(MemoryDb::new())));
        let store = PersistedRefreshTokenStore::new(
            repo.clone(),
            Duration::days(REFRESH_TOKEN_TTL_DAYS),
        );
        (store, repo)
    }

    fn some_user() -> UserId {
        UserId(uuid::Uuid::new_v4())
    }

    #[tokio::test]
    async fn issued_token_is_64_lowercase_hex_chars_and_unrevoked() {
        let (store, _) = store_with_repo();
        let record = store.issue(some_user()).await.unwrap();
        assert_eq!(record.token.len(), 64);
        assert!(record.token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert!(record.revoked_at.is_none());
        assert_eq!(record.expires_at, record.created_at + Duration::days(60));
    }

    #[tokio::test]
    async fn issued_token_resolves_to_its_user() {
        let (store, _) = store_with_repo();
        let user_id = some_user();
        let record = store.issue(user_id).await.unwrap();
        let resolved = store.resolve(&record.token).await.unwrap();
        assert_eq!(resolved.user_id, user_id);
    }

    #[tokio::test]
    async fn unknown_token_is_not_found() {
        let (store, _) = store_with_repo();
        let err = store.resolve(&"ab".repeat(32)).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenNotFound));
    }

    #[tokio::test]
    async fn expired_token_is_rejected_even_if_unrevoked() {
        let (store, repo) = store_with_repo();
        let now = Utc::now();
        let record = RefreshTokenRecord {
            token: "cd".repeat(32),
            user_id: some_user(),
            created_at: now - Duration::days(61),
            updated_at: now - Duration::days(61),
            expires_at: now - Duration::seconds(1),
            revoked_at: None,
        };
        repo.insert(&record).await.unwrap();
        let err = store.resolve(&record.token).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn revoked_token_is_rejected_before_expiry() {
        let (store, _) = store_with_repo();
        let record = store.issue(some_user()).await.unwrap();
        store.revoke(&record.token).await.unwrap();
        let err = store.resolve(&record.token).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenRevoked));
    }

    #[tokio::test]
    async fn revoking_twice_keeps_the_first_timestamp() {
        let (store, repo) = store_with_repo();
        let record = store.issue(some_user()).await.unwrap();
        store.revoke(&record.token).await.unwrap();
        let first = repo.get(&record.token).await.unwrap().unwrap().revoked_at;
        store.revoke(&record.token).await.unwrap();
        let second = repo.get(&record.token).await.unwrap().unwrap().revoked_at;
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn revoking_a_never_issued_token_succeeds_without_creating_a_row() {
        let (store, repo) = store_with_repo();
        let token = "ef".repeat(32);
        store.revoke(&token).await.unwrap();
        assert!(repo.get(&token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn two_issues_for_one_user_coexist() {
        let (store, _) = store_with_repo();
        let user_id = some_user();
        let first = store.issue(user_id).await.unwrap();
        let second = store.issue(user_id).await.unwrap();
        assert_ne!(first.token, second.token);
        assert!(store.resolve(&first.token).await.is_ok());
        assert!(store.resolve(&second.token).await.is_ok());
    }
}
