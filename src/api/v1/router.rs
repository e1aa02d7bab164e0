use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use warp::{Filter, reject};

use super::error::ApiErrorCode;
use super::extract;
use super::handler;
use super::handler::ListChirpsQuery;
use crate::application_port::SessionService;
use crate::domain_model::{ChirpId, UserId};
use crate::server::Server;

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    // the original registers the readiness probe for every verb
    let healthz = warp::path!("api" / "healthz").and_then(handler::readiness);

    let create_user = warp::post()
        .and(warp::path!("api" / "users"))
        .and(warp::body::json())
        .and(with(server.user_service.clone()))
        .and_then(handler::create_user);

    let update_user = warp::put()
        .and(warp::path!("api" / "users"))
        .and(with_authentication(server.session_service.clone()))
        .and(warp::body::json())
        .and(with(server.user_service.clone()))
        .and_then(handler::update_user);

    let login = warp::post()
        .and(warp::path!("api" / "login"))
        .and(warp::body::json())
        .and(with(server.user_service.clone()))
        .and(with(server.session_service.clone()))
        .and_then(handler::login);

    let refresh = warp::post()
        .and(warp::path!("api" / "refresh"))
        .and(with_bearer())
        .and(with(server.session_service.clone()))
        .and_then(handler::refresh);

    let revoke = warp::post()
        .and(warp::path!("api" / "revoke"))
        .and(with_bearer())
        .and(with(server.session_service.clone()))
        .and_then(handler::revoke);

    let create_chirp = warp::post()
        .and(warp::path!("api" / "chirps"))
        .and(with_authentication(server.session_service.clone()))
        .and(warp::body::json())
        .and(with(server.chirp_service.clone()))
        .and_then(handler::create_chirp);

    let list_chirps = warp::get()
        .and(warp::path!("api" / "chirps"))
        .and(warp::query::<ListChirpsQuery>())
        .and(with(server.chirp_service.clone()))
        .and_then(handler::list_chirps);

    let get_chirp = warp::get()
        .and(warp::path!("api" / "chirps" / ChirpId))
        .and(with(server.chirp_service.clone()))
        .and_then(handler::get_chirp);

    let delete_chirp = warp::delete()
        .and(warp::path!("api" / "chirps" / ChirpId))
        .and(with_authentication(server.session_service.clone()))
        .and(with(server.chirp_service.clone()))
        .and_then(handler::delete_chirp);

    let polka_webhook = warp::post()
        .and(warp::path!("api" / "polka" / "webhooks"))
        .and(with_api_key())
        .and(warp::body::json())
        .and(with(server.user_service.clone()))
        .and(with_value(server.polka_key.clone()))
        .and_then(handler::polka_webhook);

    let metrics = warp::get()
        .and(warp::path!("admin" / "metrics"))
        .and(with_value(server.clone()))
        .and_then(handler::metrics);

    let reset = warp::post()
        .and(warp::path!("admin" / "reset"))
        .and(with_value(server.clone()))
        .and_then(handler::reset);

    let assets = {
        let asset_dir = server.asset_dir.clone();
        let counter = server.clone();
        warp::path("app")
            .and(
                warp::any()
                    .map(move || {
                        counter.hits.fetch_add(1, Ordering::Relaxed);
                    })
                    .untuple_one(),
            )
            .and(warp::fs::dir(asset_dir))
    };

    healthz
        .or(create_user)
        .or(update_user)
        .or(login)
        .or(refresh)
        .or(revoke)
        .or(create_chirp)
        .or(list_chirps)
        .or(get_chirp)
        .or(delete_chirp)
        .or(polka_webhook)
        .or(metrics)
        .or(reset)
        .or(assets)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn with_value<T: Clone + Send>(value: T) -> impl Filter<Extract = (T,), Error = Infallible> + Clone {
    warp::any().map(move || value.clone())
}

/// Raw bearer credential, unvalidated. Used where the header carries a
/// refresh token rather than a JWT.
fn with_bearer() -> impl Filter<Extract = (String,), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>("authorization").and_then(|header: Option<String>| async move {
        extract::bearer_token(header.as_deref())
            .map_err(ApiErrorCode::from)
            .map_err(reject::custom)
    })
}

fn with_api_key() -> impl Filter<Extract = (String,), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>("authorization").and_then(|header: Option<String>| async move {
        extract::api_key(header.as_deref())
            .map_err(ApiErrorCode::from)
            .map_err(reject::custom)
    })
}

/// Extract the bearer token and validate it, yielding the authenticated
/// caller for protected routes.
fn with_authentication(
    sessions: Arc<dyn SessionService>,
) -> impl Filter<Extract = (UserId,), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>("authorization").and_then(move |header: Option<String>| {
        let sessions = sessions.clone();
        async move {
            let token = extract::bearer_token(header.as_deref())
                .map_err(ApiErrorCode::from)
                .map_err(reject::custom)?;
            sessions
                .authenticate(&token)
                .await
                .map_err(ApiErrorCode::from)
                .map_err(reject::custom)
        }
    })
}
