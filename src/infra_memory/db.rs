use dashmap::DashMap;

use crate::domain_model::{ChirpId, ChirpRecord, RefreshTokenRecord, UserId, UserRecord};

/// Shared backing maps for the in-memory repos. Sharing one `MemoryDb`
/// between the repos lets a user wipe cascade to chirps and refresh tokens
/// the way the Postgres foreign keys do.
#[derive(Default)]
pub struct MemoryDb {
    pub(crate) users: DashMap<UserId, (UserRecord, String)>,
    pub(crate) chirps: DashMap<ChirpId, ChirpRecord>,
    pub(crate) refresh_tokens: DashMap<String, RefreshTokenRecord>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }
}
