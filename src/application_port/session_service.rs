use chrono::{DateTime, Duration, Utc};

use crate::domain_model::{AccessToken, RefreshTokenRecord, UserId};

/// Everything that can go wrong while authenticating a caller.
///
/// The variants are kept distinct for logging and tests, but the API boundary
/// collapses all of them except `Store` and `Internal` into a single
/// not-authenticated response, so a caller cannot probe which gate rejected
/// them.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("malformed authorization header")]
    MalformedAuthHeader,
    #[error("token signature invalid")]
    SignatureInvalid,
    #[error("token expired")]
    TokenExpired,
    #[error("token issuer mismatch")]
    IssuerMismatch,
    #[error("token has no usable subject")]
    MissingSubject,
    #[error("refresh token not found")]
    TokenNotFound,
    #[error("refresh token revoked")]
    TokenRevoked,
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// The identity and stored hash that the user lookup preceding a login
/// resolved. The session service never looks users up itself.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    pub user_id: UserId,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access_token: AccessToken,
    pub refresh_token: String,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Orchestrates login, refresh and revoke over the hasher, the access-token
/// service and the refresh-token store.
#[async_trait::async_trait]
pub trait SessionService: Send + Sync {
    /// Verify the password against the stored hash, then issue an access
    /// token and a persisted refresh token. No partial success: if the
    /// refresh token cannot be persisted the access token is discarded.
    async fn login(
        &self,
        credentials: &StoredCredentials,
        password: &str,
    ) -> Result<SessionTokens, AuthError>;

    /// Resolve the refresh token and issue a fresh access token for its
    /// subject. The refresh token itself is not rotated.
    async fn refresh(&self, refresh_token: &str) -> Result<AccessToken, AuthError>;

    /// Best-effort logout. Revoking an unknown or already-revoked token is
    /// not an error.
    async fn revoke(&self, refresh_token: &str) -> Result<(), AuthError>;

    /// Validate a bearer access token and return the subject it binds.
    async fn authenticate(&self, access_token: &str) -> Result<UserId, AuthError>;
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError>;

    /// `false` for a wrong password, an empty password, or a stored hash that
    /// does not parse. The three cases are indistinguishable to the caller.
    async fn verify_password(&self, password: &str, password_hash: &str) -> bool;
}

/// Issues and validates stateless HS256-signed tokens. Pure: no I/O, no
/// shared state beyond the signing secret.
pub trait AccessTokenService: Send + Sync {
    fn issue(&self, subject: UserId, ttl: Duration) -> Result<AccessToken, AuthError>;
    fn validate(&self, token: &str) -> Result<UserId, AuthError>;
}

/// Lifecycle of opaque, server-tracked refresh tokens.
#[async_trait::async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Mint a 256-bit random token and persist its row.
    async fn issue(&self, user_id: UserId) -> Result<RefreshTokenRecord, AuthError>;

    /// Look the token up and re-check expiry and revocation. Nothing is
    /// cached; every call round-trips to the store.
    async fn resolve(&self, token: &str) -> Result<RefreshTokenRecord, AuthError>;

    /// Stamp `revoked_at` on the matching row if it exists and is not
    /// already revoked. Idempotent.
    async fn revoke(&self, token: &str) -> Result<(), AuthError>;
}
