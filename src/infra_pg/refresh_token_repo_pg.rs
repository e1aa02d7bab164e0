use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::application_port::AuthError;
use crate::domain_model::{RefreshTokenRecord, UserId};
use crate::domain_port::RefreshTokenRepo;

pub struct PgRefreshTokenRepo {
    pool: PgPool,
}

impl PgRefreshTokenRepo {
    pub fn new(pool: PgPool) -> Self {
        PgRefreshTokenRepo { pool }
    }

    fn row_to_record(row: PgRow) -> Result<RefreshTokenRecord, AuthError> {
        let user_id: uuid::Uuid = row
            .try_get("user_id")
            .map_err(|e| AuthError::Store(e.to_string()))?;

        Ok(RefreshTokenRecord {
            token: row
                .try_get("token")
                .map_err(|e| AuthError::Store(e.to_string()))?,
            user_id: UserId(user_id),
            created_at: row
                .try_get("created_at")
                .map_err(|e| AuthError::Store(e.to_string()))?,
            updated_at: row
                .try_get("updated_at")
                .map_err(|e| AuthError::Store(e.to_string()))?,
            expires_at: row
                .try_get("expires_at")
                .map_err(|e| AuthError::Store(e.to_string()))?,
            revoked_at: row
                .try_get("revoked_at")
                .map_err(|e| AuthError::Store(e.to_string()))?,
        })
    }
}

#[async_trait::async_trait]
impl RefreshTokenRepo for PgRefreshTokenRepo {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), AuthError> {
        sqlx::query(
            r#"
INSERT INTO refresh_tokens (token, user_id, created_at, updated_at, expires_at, revoked_at)
VALUES ($1, $2, $3, $4, $5, $6)
"#,
        )
        .bind(&record.token)
        .bind(record.user_id.0)
        .bind(record.created_at)
        .bind(record.updated_at)
        .bind(record.expires_at)
        .bind(record.revoked_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?;

        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<RefreshTokenRecord>, AuthError> {
        let row_opt: Option<PgRow> = sqlx::query(
            r#"
SELECT token, user_id, created_at, updated_at, expires_at, revoked_at
FROM refresh_tokens
WHERE token = $1
"#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?;

        row_opt.map(Self::row_to_record).transpose()
    }

    async fn set_revoked(&self, token: &str, revoked_at: DateTime<Utc>) -> Result<(), AuthError> {
        // the `revoked_at IS NULL` guard makes the stamp one-way
        sqlx::query(
            r#"
UPDATE refresh_tokens
SET revoked_at = $2, updated_at = $2
WHERE token = $1 AND revoked_at IS NULL
"#,
        )
        .bind(token)
        .bind(revoked_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?;

        Ok(())
    }
}
