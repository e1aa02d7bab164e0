use std::sync::Arc;

use chrono::Duration;

use crate::application_port::{
    AccessTokenService, AuthError, CredentialHasher, RefreshTokenStore, SessionService,
    SessionTokens, StoredCredentials,
};
use crate::domain_model::{AccessToken, UserId};

pub struct RealSessionService {
    hasher: Arc<dyn CredentialHasher>,
    access_tokens: Arc<dyn AccessTokenService>,
    refresh_store: Arc<dyn RefreshTokenStore>,
    access_ttl: Duration,
}

impl RealSessionService {
    pub fn new(
        hasher: Arc<dyn CredentialHasher>,
        access_tokens: Arc<dyn AccessTokenService>,
        refresh_store: Arc<dyn RefreshTokenStore>,
        access_ttl: Duration,
    ) -> Self {
        Self {
            hasher,
            access_tokens,
            refresh_store,
            access_ttl,
        }
    }
}

#[async_trait::async_trait]
impl SessionService for RealSessionService {
    async fn login(
        &self,
        credentials: &StoredCredentials,
        password: &str,
    ) -> Result<SessionTokens, AuthError> {
        let ok = self
            .hasher
            .verify_password(password, &credentials.password_hash)
            .await;
        if !ok {
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self
            .access_tokens
            .issue(credentials.user_id, self.access_ttl)?;

        // if the row cannot be written the login fails as a whole; the
        // access token above never reaches the caller
        let refresh = self.refresh_store.issue(credentials.user_id).await?;

        Ok(SessionTokens {
            access_token,
            refresh_token: refresh.token,
            refresh_expires_at: refresh.expires_at,
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AccessToken, AuthError> {
        let record = self.refresh_store.resolve(refresh_token).await?;
        self.access_tokens.issue(record.user_id, self.access_ttl)
    }

    async fn revoke(&self, refresh_token: &str) -> Result<(), AuthError> {
        self.refresh_store.revoke(refresh_token).await
    }

    async fn authenticate(&self, access_token: &str) -> Result<UserId, AuthError> {
        self.access_tokens.validate(access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::{
        Argon2PasswordHasher, JwtAccessTokens, PersistedRefreshTokenStore, REFRESH_TOKEN_TTL_DAYS,
    };
    use crate::domain_model::RefreshTokenRecord;
    use crate::domain_port::RefreshTokenRepo;
    use crate::infra_memory::{MemoryDb, MemoryRefreshTokenRepo};
    use chrono::{DateTime, Utc};

    struct Fixture {
        sessions: RealSessionService,
        repo: Arc<MemoryRefreshTokenRepo>,
        credentials: StoredCredentials,
    }

    async fn fixture() -> Fixture {
        let hasher = Arc::new(Argon2PasswordHasher);
        let password_hash = hasher.hash_password("Secr3t!").await.unwrap();
        let credentials = StoredCredentials {
            user_id: UserId(uuid::Uuid::new_v4()),
            password_hash,
        };

        let repo = Arc::new(MemoryRefreshTokenRepo::new(Arc::new(MemoryDb::new())));
        let refresh_store = Arc::new(PersistedRefreshTokenStore::new(
            repo.clone(),
            Duration::days(REFRESH_TOKEN_TTL_DAYS),
        ));
        let sessions = RealSessionService::new(
            hasher,
            Arc::new(JwtAccessTokens::new(b"test-secret")),
            refresh_store,
            Duration::seconds(3600),
        );
        Fixture {
            sessions,
            repo,
            credentials,
        }
    }

    #[tokio::test]
    async fn login_returns_access_token_bound_to_the_user_and_a_persisted_refresh_token() {
        let f = fixture().await;
        let tokens = f.sessions.login(&f.credentials, "Secr3t!").await.unwrap();

        let subject = f.sessions.authenticate(&tokens.access_token.0).await.unwrap();
        assert_eq!(subject, f.credentials.user_id);

        assert_eq!(tokens.refresh_token.len(), 64);
        let row = f.repo.get(&tokens.refresh_token).await.unwrap().unwrap();
        assert_eq!(row.user_id, f.credentials.user_id);
        assert!(row.revoked_at.is_none());
    }

    #[tokio::test]
    async fn login_with_wrong_password_fails_with_invalid_credentials() {
        let f = fixture().await;
        let err = f.sessions.login(&f.credentials, "hunter2").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn refresh_issues_a_new_access_token_without_rotating_the_refresh_token() {
        let f = fixture().await;
        let tokens = f.sessions.login(&f.credentials, "Secr3t!").await.unwrap();

        let access = f.sessions.refresh(&tokens.refresh_token).await.unwrap();
        assert_eq!(
            f.sessions.authenticate(&access.0).await.unwrap(),
            f.credentials.user_id
        );

        // still usable: refresh does not consume or rotate
        assert!(f.sessions.refresh(&tokens.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn refresh_with_an_expired_token_is_an_authentication_failure() {
        let f = fixture().await;
        let now = Utc::now();
        let record = RefreshTokenRecord {
            token: "ab".repeat(32),
            user_id: f.credentials.user_id,
            created_at: now - Duration::days(61),
            updated_at: now - Duration::days(61),
            expires_at: now - Duration::seconds(1),
            revoked_at: None,
        };
        f.repo.insert(&record).await.unwrap();

        let err = f.sessions.refresh(&record.token).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn refresh_after_revoke_is_rejected() {
        let f = fixture().await;
        let tokens = f.sessions.login(&f.credentials, "Secr3t!").await.unwrap();
        f.sessions.revoke(&tokens.refresh_token).await.unwrap();
        let err = f.sessions.refresh(&tokens.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenRevoked));
    }

    #[tokio::test]
    async fn revoke_is_idempotent_and_tolerates_unknown_tokens() {
        let f = fixture().await;
        let tokens = f.sessions.login(&f.credentials, "Secr3t!").await.unwrap();
        f.sessions.revoke(&tokens.refresh_token).await.unwrap();
        f.sessions.revoke(&tokens.refresh_token).await.unwrap();
        f.sessions.revoke(&"ff".repeat(32)).await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_logins_produce_independent_sessions() {
        let f = fixture().await;
        let laptop = f.sessions.login(&f.credentials, "Secr3t!").await.unwrap();
        let phone = f.sessions.login(&f.credentials, "Secr3t!").await.unwrap();
        assert_ne!(laptop.refresh_token, phone.refresh_token);

        f.sessions.revoke(&laptop.refresh_token).await.unwrap();
        assert!(f.sessions.refresh(&laptop.refresh_token).await.is_err());
        assert!(f.sessions.refresh(&phone.refresh_token).await.is_ok());
    }

    struct FailingRefreshRepo;

    #[async_trait::async_trait]
    impl RefreshTokenRepo for FailingRefreshRepo {
        async fn insert(&self, _record: &RefreshTokenRecord) -> Result<(), AuthError> {
            Err(AuthError::Store("connection reset".to_string()))
        }

        async fn get(&self, _token: &str) -> Result<Option<RefreshTokenRecord>, AuthError> {
            Err(AuthError::Store("connection reset".to_string()))
        }

        async fn set_revoked(
            &self,
            _token: &str,
            _revoked_at: DateTime<Utc>,
        ) -> Result<(), AuthError> {
            Err(AuthError::Store("connection reset".to_string()))
        }
    }

    #[tokio::test]
    async fn login_fails_whole_when_the_refresh_token_cannot_be_persisted() {
        let hasher = Arc::new(Argon2PasswordHasher);
        let password_hash = hasher.hash_password("Secr3t!").await.unwrap();
        let credentials = StoredCredentials {
            user_id: UserId(uuid::Uuid::new_v4()),
            password_hash,
        };
        let sessions = RealSessionService::new(
            hasher,
            Arc::new(JwtAccessTokens::new(b"test-secret")),
            Arc::new(PersistedRefreshTokenStore::new(
                Arc::new(FailingRefreshRepo),
                Duration::days(REFRESH_TOKEN_TTL_DAYS),
            )),
            Duration::seconds(3600),
        );

        let err = sessions.login(&credentials, "Secr3t!").await.unwrap_err();
        assert!(matches!(err, AuthError::Store(_)));
    }
}
