use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::application_port::ChirpError;
use crate::domain_model::{ChirpId, ChirpRecord, UserId};
use crate::domain_port::ChirpRepo;

pub struct PgChirpRepo {
    pool: PgPool,
}

impl PgChirpRepo {
    pub fn new(pool: PgPool) -> Self {
        PgChirpRepo { pool }
    }

    fn row_to_record(row: PgRow) -> Result<ChirpRecord, ChirpError> {
        let chirp_id: uuid::Uuid = row
            .try_get("id")
            .map_err(|e| ChirpError::Store(e.to_string()))?;
        let user_id: uuid::Uuid = row
            .try_get("user_id")
            .map_err(|e| ChirpError::Store(e.to_string()))?;

        Ok(ChirpRecord {
            chirp_id: ChirpId(chirp_id),
            user_id: UserId(user_id),
            body: row
                .try_get("body")
                .map_err(|e| ChirpError::Store(e.to_string()))?,
            created_at: row
                .try_get("created_at")
                .map_err(|e| ChirpError::Store(e.to_string()))?,
            updated_at: row
                .try_get("updated_at")
                .map_err(|e| ChirpError::Store(e.to_string()))?,
        })
    }
}

#[async_trait::async_trait]
impl ChirpRepo for PgChirpRepo {
    async fn insert(&self, record: &ChirpRecord) -> Result<(), ChirpError> {
        sqlx::query(
            r#"
INSERT INTO chirps (id, created_at, updated_at, body, user_id)
VALUES ($1, $2, $3, $4, $5)
"#,
        )
        .bind(record.chirp_id.0)
        .bind(record.created_at)
        .bind(record.updated_at)
        .bind(&record.body)
        .bind(record.user_id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| ChirpError::Store(e.to_string()))?;

        Ok(())
    }

    async fn get(&self, chirp_id: ChirpId) -> Result<Option<ChirpRecord>, ChirpError> {
        let row_opt: Option<PgRow> = sqlx::query(
            r#"
SELECT id, created_at, updated_at, body, user_id
FROM chirps
WHERE id = $1
"#,
        )
        .bind(chirp_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ChirpError::Store(e.to_string()))?;

        row_opt.map(Self::row_to_record).transpose()
    }

    async fn list(&self, author: Option<UserId>) -> Result<Vec<ChirpRecord>, ChirpError> {
        let query = match author {
            Some(author) => sqlx::query(
                r#"
SELECT id, created_at, updated_at, body, user_id
FROM chirps
WHERE user_id = $1
"#,
            )
            .bind(author.0),
            None => sqlx::query(
                r#"
SELECT id, created_at, updated_at, body, user_id
FROM chirps
"#,
            ),
        };

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ChirpError::Store(e.to_string()))?;

        rows.into_iter().map(Self::row_to_record).collect()
    }

    async fn delete(&self, chirp_id: ChirpId) -> Result<bool, ChirpError> {
        let result = sqlx::query("DELETE FROM chirps WHERE id = $1")
            .bind(chirp_id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| ChirpError::Store(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
