use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use chrono::Duration;
use sqlx::PgPool;

use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_pg::*;
use crate::logger::*;
use crate::settings::Settings;

pub struct Server {
    pub session_service: Arc<dyn SessionService>,
    pub user_service: Arc<dyn UserService>,
    pub chirp_service: Arc<dyn ChirpService>,
    /// `/app` request counter shown on the admin metrics page. Only the
    /// asset route writes it (and the admin reset zeroes it).
    pub hits: AtomicU64,
    pub platform: String,
    pub polka_key: Arc<str>,
    pub asset_dir: String,
    pool: Option<PgPool>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let (user_repo, chirp_repo, refresh_repo, pool): (
            Arc<dyn UserRepo>,
            Arc<dyn ChirpRepo>,
            Arc<dyn RefreshTokenRepo>,
            Option<PgPool>,
        ) = match settings.db.backend.as_str() {
            "memory" => {
                let db = Arc::new(MemoryDb::new());
                (
                    Arc::new(MemoryUserRepo::new(db.clone())),
                    Arc::new(MemoryChirpRepo::new(db.clone())),
                    Arc::new(MemoryRefreshTokenRepo::new(db)),
                    None,
                )
            }
            "postgres" => {
                let pool = PgPool::connect(&settings.db.url).await?;
                sqlx::migrate!("./migrations").run(&pool).await?;
                (
                    Arc::new(PgUserRepo::new(pool.clone())),
                    Arc::new(PgChirpRepo::new(pool.clone())),
                    Arc::new(PgRefreshTokenRepo::new(pool.clone())),
                    Some(pool),
                )
            }
            other => return Err(anyhow::anyhow!("Unknown db backend: {}", other)),
        };

        let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher);
        let access_tokens: Arc<dyn AccessTokenService> =
            Arc::new(JwtAccessTokens::new(settings.jwt.secret.as_bytes()));
        let refresh_store: Arc<dyn RefreshTokenStore> = Arc::new(PersistedRefreshTokenStore::new(
            refresh_repo,
            Duration::days(REFRESH_TOKEN_TTL_DAYS),
        ));

        let session_service: Arc<dyn SessionService> = Arc::new(RealSessionService::new(
            hasher.clone(),
            access_tokens,
            refresh_store,
            Duration::seconds(settings.jwt.access_ttl_secs),
        ));
        let user_service: Arc<dyn UserService> =
            Arc::new(RealUserService::new(user_repo, hasher));
        let chirp_service: Arc<dyn ChirpService> = Arc::new(RealChirpService::new(chirp_repo));

        info!(backend = %settings.db.backend, "server started");

        Ok(Self {
            session_service,
            user_service,
            chirp_service,
            hits: AtomicU64::new(0),
            platform: settings.api.platform.clone(),
            polka_key: settings.api.polka_key.as_str().into(),
            asset_dir: settings.http.asset_dir.clone(),
            pool,
        })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
