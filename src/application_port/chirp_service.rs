use crate::domain_model::{ChirpId, ChirpRecord, UserId};

#[derive(Debug, thiserror::Error)]
pub enum ChirpError {
    #[error("chirp is too long, max length is {max}")]
    TooLong { max: usize },
    #[error("chirp not found")]
    ChirpNotFound,
    #[error("not the chirp author")]
    NotAuthor,
    #[error("store error: {0}")]
    Store(String),
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[async_trait::async_trait]
pub trait ChirpService: Send + Sync {
    /// Length-checks and profanity-cleans the body, then persists it.
    async fn create(&self, author: UserId, body: &str) -> Result<ChirpRecord, ChirpError>;

    /// All chirps, optionally restricted to one author, ordered by creation
    /// time.
    async fn list(
        &self,
        author: Option<UserId>,
        order: SortOrder,
    ) -> Result<Vec<ChirpRecord>, ChirpError>;

    async fn get(&self, chirp_id: ChirpId) -> Result<ChirpRecord, ChirpError>;

    /// Only the author may delete a chirp.
    async fn delete(&self, chirp_id: ChirpId, requester: UserId) -> Result<(), ChirpError>;
}
