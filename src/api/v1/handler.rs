use std::sync::Arc;
use std::sync::atomic::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warp::http::StatusCode;
use warp::{self, reject};

use super::error::ApiErrorCode;
use crate::application_port::{
    AuthError, ChirpService, NewUserInput, SessionService, SortOrder, UserService,
};
use crate::domain_model::{ChirpId, ChirpRecord, UserId, UserRecord};
use crate::server::Server;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    pub id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub is_chirpy_red: bool,
}

impl From<UserRecord> for UserBody {
    fn from(record: UserRecord) -> Self {
        UserBody {
            id: record.user_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
            email: record.email,
            is_chirpy_red: record.is_chirpy_red,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    #[serde(flatten)]
    pub user: UserBody,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshBody {
    pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChirpBody {
    pub id: ChirpId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: UserId,
}

impl From<ChirpRecord> for ChirpBody {
    fn from(record: ChirpRecord) -> Self {
        ChirpBody {
            id: record.chirp_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
            body: record.body,
            user_id: record.user_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl CredentialsRequest {
    fn require_fields(&self) -> Result<(), warp::Rejection> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(reject::custom(ApiErrorCode::BadRequest(
                "Missing required fields".to_string(),
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ChirpRequest {
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListChirpsQuery {
    pub author_id: Option<UserId>,
    pub sort: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    #[serde(default)]
    pub event: String,
    pub data: WebhookData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookData {
    pub user_id: UserId,
}

pub async fn readiness() -> Result<impl warp::Reply, warp::Rejection> {
    Ok(warp::reply::with_header(
        "OK",
        "content-type",
        "text/plain; charset=utf-8",
    ))
}

pub async fn create_user(
    request: CredentialsRequest,
    users: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    request.require_fields()?;

    let record = users
        .create(NewUserInput {
            email: request.email,
            password: request.password,
        })
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::with_status(
        warp::reply::json(&UserBody::from(record)),
        StatusCode::CREATED,
    ))
}

pub async fn update_user(
    user_id: UserId,
    request: CredentialsRequest,
    users: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    request.require_fields()?;

    let record = users
        .update(
            user_id,
            NewUserInput {
                email: request.email,
                password: request.password,
            },
        )
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&UserBody::from(record)))
}

pub async fn login(
    request: CredentialsRequest,
    users: Arc<dyn UserService>,
    sessions: Arc<dyn SessionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    request.require_fields()?;

    // an unknown email gets the same answer as a wrong password
    let (user, credentials) = users
        .find_credentials_by_email(&request.email)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?
        .ok_or_else(|| reject::custom(ApiErrorCode::from(AuthError::InvalidCredentials)))?;

    let tokens = sessions
        .login(&credentials, &request.password)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&LoginBody {
        user: UserBody::from(user),
        token: tokens.access_token.0,
        refresh_token: tokens.refresh_token,
    }))
}

pub async fn refresh(
    refresh_token: String,
    sessions: Arc<dyn SessionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let access = sessions
        .refresh(&refresh_token)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&RefreshBody { token: access.0 }))
}

pub async fn revoke(
    refresh_token: String,
    sessions: Arc<dyn SessionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    sessions
        .revoke(&refresh_token)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::with_status(
        warp::reply(),
        StatusCode::NO_CONTENT,
    ))
}

pub async fn create_chirp(
    user_id: UserId,
    request: ChirpRequest,
    chirps: Arc<dyn ChirpService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    if request.body.is_empty() {
        return Err(reject::custom(ApiErrorCode::BadRequest(
            "Missing required fields".to_string(),
        )));
    }

    let record = chirps
        .create(user_id, &request.body)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::with_status(
        warp::reply::json(&ChirpBody::from(record)),
        StatusCode::CREATED,
    ))
}

pub async fn list_chirps(
    query: ListChirpsQuery,
    chirps: Arc<dyn ChirpService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let order = match query.sort.as_deref() {
        Some("desc") => SortOrder::Desc,
        _ => SortOrder::Asc,
    };

    let records = chirps
        .list(query.author_id, order)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let bodies: Vec<ChirpBody> = records.into_iter().map(ChirpBody::from).collect();
    Ok(warp::reply::json(&bodies))
}

pub async fn get_chirp(
    chirp_id: ChirpId,
    chirps: Arc<dyn ChirpService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let record = chirps
        .get(chirp_id)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ChirpBody::from(record)))
}

pub async fn delete_chirp(
    chirp_id: ChirpId,
    user_id: UserId,
    chirps: Arc<dyn ChirpService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    chirps
        .delete(chirp_id, user_id)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::with_status(
        warp::reply(),
        StatusCode::NO_CONTENT,
    ))
}

pub async fn polka_webhook(
    api_key: String,
    request: WebhookRequest,
    users: Arc<dyn UserService>,
    expected_key: Arc<str>,
) -> Result<impl warp::Reply, warp::Rejection> {
    // authenticate the caller before touching any account
    if api_key != *expected_key {
        return Err(reject::custom(ApiErrorCode::Unauthenticated));
    }

    if request.event != "user.upgraded" {
        return Ok(warp::reply::with_status(
            warp::reply(),
            StatusCode::NO_CONTENT,
        ));
    }

    users
        .upgrade_to_chirpy_red(request.data.user_id)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::with_status(
        warp::reply(),
        StatusCode::NO_CONTENT,
    ))
}

pub async fn metrics(server: Arc<Server>) -> Result<impl warp::Reply, warp::Rejection> {
    let html = format!(
        r#"
<html>
  <body>
    <h1>Welcome, Chirpy Admin</h1>
    <p>Chirpy has been visited {} times!</p>
  </body>
</html>
"#,
        server.hits.load(Ordering::Relaxed)
    );
    Ok(warp::reply::html(html))
}

pub async fn reset(server: Arc<Server>) -> Result<impl warp::Reply, warp::Rejection> {
    if server.platform != "dev" {
        return Err(reject::custom(ApiErrorCode::Forbidden(
            "Reset is only allowed in dev environment.".to_string(),
        )));
    }

    server
        .user_service
        .reset()
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    server.hits.store(0, Ordering::Relaxed);

    Ok(warp::reply::with_header(
        "Hits reset to 0",
        "content-type",
        "text/plain; charset=utf-8",
    ))
}
