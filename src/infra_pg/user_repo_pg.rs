use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::util::is_unique_violation;
use crate::application_port::UserError;
use crate::domain_model::{UserId, UserRecord};
use crate::domain_port::UserRepo;

pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        PgUserRepo { pool }
    }

    fn row_to_record(row: &PgRow) -> Result<UserRecord, UserError> {
        let user_id: uuid::Uuid = row
            .try_get("id")
            .map_err(|e| UserError::Store(e.to_string()))?;

        Ok(UserRecord {
            user_id: UserId(user_id),
            email: row
                .try_get("email")
                .map_err(|e| UserError::Store(e.to_string()))?,
            is_chirpy_red: row
                .try_get("is_chirpy_red")
                .map_err(|e| UserError::Store(e.to_string()))?,
            created_at: row
                .try_get("created_at")
                .map_err(|e| UserError::Store(e.to_string()))?,
            updated_at: row
                .try_get("updated_at")
                .map_err(|e| UserError::Store(e.to_string()))?,
        })
    }
}

#[async_trait::async_trait]
impl UserRepo for PgUserRepo {
    async fn insert(&self, record: &UserRecord, password_hash: &str) -> Result<(), UserError> {
        sqlx::query(
            r#"
INSERT INTO users (id, created_at, updated_at, email, hashed_password, is_chirpy_red)
VALUES ($1, $2, $3, $4, $5, $6)
"#,
        )
        .bind(record.user_id.0)
        .bind(record.created_at)
        .bind(record.updated_at)
        .bind(&record.email)
        .bind(password_hash)
        .bind(record.is_chirpy_red)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                UserError::EmailTaken
            } else {
                UserError::Store(e.to_string())
            }
        })?;

        Ok(())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<(UserRecord, String)>, UserError> {
        let row_opt: Option<PgRow> = sqlx::query(
            r#"
SELECT id, created_at, updated_at, email, hashed_password, is_chirpy_red
FROM users
WHERE email = $1
"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::Store(e.to_string()))?;

        row_opt
            .map(|row| {
                let record = Self::row_to_record(&row)?;
                let hash: String = row
                    .try_get("hashed_password")
                    .map_err(|e| UserError::Store(e.to_string()))?;
                Ok((record, hash))
            })
            .transpose()
    }

    async fn update(
        &self,
        user_id: UserId,
        email: &str,
        password_hash: &str,
    ) -> Result<UserRecord, UserError> {
        let row_opt: Option<PgRow> = sqlx::query(
            r#"
UPDATE users
SET email = $2, hashed_password = $3, updated_at = now()
WHERE id = $1
RETURNING id, created_at, updated_at, email, hashed_password, is_chirpy_red
"#,
        )
        .bind(user_id.0)
        .bind(email)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                UserError::EmailTaken
            } else {
                UserError::Store(e.to_string())
            }
        })?;

        let row = row_opt.ok_or(UserError::UserNotFound)?;
        Self::row_to_record(&row)
    }

    async fn set_chirpy_red(&self, user_id: UserId) -> Result<bool, UserError> {
        let result = sqlx::query(
            r#"
UPDATE users
SET is_chirpy_red = TRUE, updated_at = now()
WHERE id = $1
"#,
        )
        .bind(user_id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| UserError::Store(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> Result<(), UserError> {
        // chirps and refresh tokens cascade
        sqlx::query("DELETE FROM users")
            .execute(&self.pool)
            .await
            .map_err(|e| UserError::Store(e.to_string()))?;

        Ok(())
    }
}
