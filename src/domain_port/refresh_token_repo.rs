use chrono::{DateTime, Utc};

use crate::application_port::AuthError;
use crate::domain_model::RefreshTokenRecord;

/// Narrow storage contract for refresh-token rows: insert, point lookup by
/// token, one-way revocation stamp. Per-row atomicity is the backend's
/// responsibility; a concurrent resolve and revoke must observe a consistent
/// pre- or post-revoke row.
#[async_trait::async_trait]
pub trait RefreshTokenRepo: Send + Sync {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), AuthError>;

    async fn get(&self, token: &str) -> Result<Option<RefreshTokenRecord>, AuthError>;

    /// Stamp `revoked_at` (and `updated_at`) on the matching row. A missing
    /// or already-revoked row is left untouched, which keeps `revoked_at`
    /// monotonic.
    async fn set_revoked(&self, token: &str, revoked_at: DateTime<Utc>) -> Result<(), AuthError>;
}
