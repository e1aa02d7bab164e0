use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::application_port::{AuthError, CredentialHasher};

/// Argon2id with the crate defaults: memory-hard, salted, and slow enough to
/// make offline guessing expensive. The parameters are embedded in the PHC
/// string, so verification reads them back from the stored hash.
pub struct Argon2PasswordHasher;

#[async_trait::async_trait]
impl CredentialHasher for Argon2PasswordHasher {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    async fn verify_password(&self, password: &str, password_hash: &str) -> bool {
        // A stored hash that does not parse gets the same answer as a wrong
        // password, so the caller cannot tell the cases apart.
        let Ok(parsed) = PasswordHash::new(password_hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify_round_trips() {
        let hasher = Argon2PasswordHasher;
        let hash = hasher.hash_password("correctPassword123!").await.unwrap();
        assert!(hasher.verify_password("correctPassword123!", &hash).await);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let hasher = Argon2PasswordHasher;
        let hash = hasher.hash_password("correctPassword123!").await.unwrap();
        assert!(!hasher.verify_password("wrongPassword", &hash).await);
    }

    #[tokio::test]
    async fn password_does_not_match_another_users_hash() {
        let hasher = Argon2PasswordHasher;
        let hash_other = hasher.hash_password("anotherPassword456!").await.unwrap();
        assert!(!hasher.verify_password("correctPassword123!", &hash_other).await);
    }

    #[tokio::test]
    async fn empty_password_is_rejected() {
        let hasher = Argon2PasswordHasher;
        let hash = hasher.hash_password("correctPassword123!").await.unwrap();
        assert!(!hasher.verify_password("", &hash).await);
    }

    #[tokio::test]
    async fn malformed_stored_hash_verifies_false_instead_of_erroring() {
        let hasher = Argon2PasswordHasher;
        assert!(!hasher.verify_password("anything", "not-a-valid-hash").await);
    }

    #[tokio::test]
    async fn two_hashes_of_the_same_password_differ() {
        let hasher = Argon2PasswordHasher;
        let first = hasher.hash_password("samePassword").await.unwrap();
        let second = hasher.hash_password("samePassword").await.unwrap();
        assert_ne!(first, second);
        assert!(hasher.verify_password("samePassword", &second).await);
    }
}
