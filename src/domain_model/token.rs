use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain_model::UserId;

/// Stateless signed credential. Carries its own validity window; nothing
/// about it is persisted server-side.
#[derive(Debug, Clone, Serialize)]
pub struct AccessToken(pub String);

/// A server-tracked refresh-token row. `token` is the primary key: 64
/// lowercase hex characters, opaque to the caller.
///
/// `expires_at` is fixed at creation and never extended; `revoked_at`, once
/// set, is never cleared.
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}
