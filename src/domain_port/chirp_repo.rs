use crate::application_port::ChirpError;
use crate::domain_model::{ChirpId, ChirpRecord, UserId};

#[async_trait::async_trait]
pub trait ChirpRepo: Send + Sync {
    /// Insert a row. The author row must already exist (FK).
    async fn insert(&self, record: &ChirpRecord) -> Result<(), ChirpError>;

    async fn get(&self, chirp_id: ChirpId) -> Result<Option<ChirpRecord>, ChirpError>;

    async fn list(&self, author: Option<UserId>) -> Result<Vec<ChirpRecord>, ChirpError>;

    /// Returns `false` when no such chirp exists.
    async fn delete(&self, chirp_id: ChirpId) -> Result<bool, ChirpError>;
}
