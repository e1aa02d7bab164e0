use std::sync::Arc;

use chrono::Utc;

use crate::application_port::{ChirpError, ChirpService, SortOrder};
use crate::domain_model::{ChirpId, ChirpRecord, UserId};
use crate::domain_port::ChirpRepo;

const MAX_CHIRP_LENGTH: usize = 140;
const BANNED_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];

/// Replaces banned words with `****`. Matching is case-insensitive but
/// whole-word only: a banned word with punctuation glued on passes through.
fn clean_body(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            if BANNED_WORDS.contains(&word.to_lowercase().as_str()) {
                "****"
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct RealChirpService {
    repo: Arc<dyn ChirpRepo>,
}

impl RealChirpService {
    pub fn new(repo: Arc<dyn ChirpRepo>) -> Self {
        RealChirpService { repo }
    }
}

#[async_trait::async_trait]
impl ChirpService for RealChirpService {
    async fn create(&self, author: UserId, body: &str) -> Result<ChirpRecord, ChirpError> {
        if body.chars().count() > MAX_CHIRP_LENGTH {
            return Err(ChirpError::TooLong {
                max: MAX_CHIRP_LENGTH,
            });
        }

        let now = Utc::now();
        let record = ChirpRecord {
            chirp_id: ChirpId(uuid::Uuid::new_v4()),
            user_id: author,
            body: clean_body(body),
            created_at: now,
            updated_at: now,
        };
        self.repo.insert(&record).await?;
        Ok(record)
    }

    async fn list(
        &self,
        author: Option<UserId>,
        order: SortOrder,
    ) -> Result<Vec<ChirpRecord>, ChirpError> {
        let mut chirps = self.repo.list(author).await?;
        chirps.sort_by_key(|chirp| chirp.created_at);
        if order == SortOrder::Desc {
            chirps.reverse();
        }
        Ok(chirps)
    }

    async fn get(&self, chirp_id: ChirpId) -> Result<ChirpRecord, ChirpError> {
        self.repo
            .get(chirp_id)
            .await?
            .ok_or(ChirpError::ChirpNotFound)
    }

    async fn delete(&self, chirp_id: ChirpId, requester: UserId) -> Result<(), ChirpError> {
        let chirp = self.get(chirp_id).await?;
        if chirp.user_id != requester {
            return Err(ChirpError::NotAuthor);
        }
        self.repo.delete(chirp_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_memory::{MemoryChirpRepo, MemoryDb};

    fn service() -> RealChirpService {
        RealChirpService::new(Arc::new(MemoryChirpRepo::new(Arc::new(MemoryDb::new()))))
    }

    fn author() -> UserId {
        UserId(uuid::Uuid::new_v4())
    }

    #[test]
    fn banned_words_are_masked_case_insensitively() {
        assert_eq!(
            clean_body("This is a kerfuffle opinion I need to share"),
            "This is a **** opinion I need to share"
        );
        assert_eq!(clean_body("Sharbert and FORNAX"), "**** and ****");
    }

    #[test]
    fn banned_word_with_punctuation_is_left_alone() {
        assert_eq!(clean_body("kerfuffle!"), "kerfuffle!");
    }

    #[tokio::test]
    async fn overlong_chirp_is_rejected() {
        let chirps = service();
        let err = chirps.create(author(), &"x".repeat(141)).await.unwrap_err();
        assert!(matches!(err, ChirpError::TooLong { max: 140 }));
    }

    #[tokio::test]
    async fn chirp_at_the_limit_is_accepted() {
        let chirps = service();
        let record = chirps.create(author(), &"x".repeat(140)).await.unwrap();
        assert_eq!(record.body.chars().count(), 140);
    }

    #[tokio::test]
    async fn list_filters_by_author_and_orders_by_creation_time() {
        let chirps = service();
        let alice = author();
        let bob = author();
        let first = chirps.create(alice, "first").await.unwrap();
        let second = chirps.create(alice, "second").await.unwrap();
        chirps.create(bob, "unrelated").await.unwrap();

        let ascending = chirps.list(Some(alice), SortOrder::Asc).await.unwrap();
        let ids: Vec<_> = ascending.iter().map(|c| c.chirp_id).collect();
        assert_eq!(ids, vec![first.chirp_id, second.chirp_id]);

        let descending = chirps.list(Some(alice), SortOrder::Desc).await.unwrap();
        let ids: Vec<_> = descending.iter().map(|c| c.chirp_id).collect();
        assert_eq!(ids, vec![second.chirp_id, first.chirp_id]);

        assert_eq!(chirps.list(None, SortOrder::Asc).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn only_the_author_may_delete() {
        let chirps = service();
        let alice = author();
        let record = chirps.create(alice, "mine").await.unwrap();

        let err = chirps.delete(record.chirp_id, author()).await.unwrap_err();
        assert!(matches!(err, ChirpError::NotAuthor));

        chirps.delete(record.chirp_id, alice).await.unwrap();
        let err = chirps.get(record.chirp_id).await.unwrap_err();
        assert!(matches!(err, ChirpError::ChirpNotFound));
    }
}
