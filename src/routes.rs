//! HTTP routes
//!
//! Wires the handlers into warp filters. The access guard is exposed as the
//! [`with_auth`] filter so any route can require an authenticated identity.

use serde::Serialize;
use std::convert::Infallible;
use warp::http::header::{HeaderMap, HeaderValue, AUTHORIZATION, WWW_AUTHENTICATE};
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::auth::{AccessGuard, AuthContext};
use crate::error::RoleGateError;
use crate::handlers::auth::{LoginRequest, MessageResponse, RegisterRequest};
use crate::handlers::users::{CreateIdentityRequest, UpdateIdentityRequest};
use crate::handlers::{self, AppState};

const MAX_BODY_BYTES: u64 = 16 * 1024;

type RouteResult<T> = std::result::Result<T, Rejection>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

// Helper function to include shared state in request
fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn json_body<T>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
where
    T: serde::de::DeserializeOwned + Send,
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

/// Resolve the request's identity through the access guard
///
/// Rejects with the guard's error, which [`handle_rejection`] turns into
/// 401 or 404.
pub fn with_auth(
    guard: AccessGuard,
) -> impl Filter<Extract = (AuthContext,), Error = Rejection> + Clone {
    warp::header::headers_cloned().and_then(move |headers: HeaderMap| {
        let guard = guard.clone();
        async move {
            // A header that is not valid text is treated like a garbled one
            let header = headers
                .get(AUTHORIZATION)
                .map(|value| value.to_str().unwrap_or_default().to_string());

            guard
                .resolve(header.as_deref())
                .await
                .map_err(warp::reject::custom)
        }
    })
}

async fn register(state: AppState, request: RegisterRequest) -> RouteResult<impl Reply> {
    let response = handlers::auth::register(&state, request)
        .await
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::with_status(
        warp::reply::json(&response),
        StatusCode::CREATED,
    ))
}

async fn login(state: AppState, request: LoginRequest) -> RouteResult<impl Reply> {
    let response = handlers::auth::login(&state, request)
        .await
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::json(&response))
}

async fn admin_area(context: AuthContext) -> RouteResult<impl Reply> {
    let response = handlers::auth::admin_area(&context).map_err(warp::reject::custom)?;
    Ok(warp::reply::json(&response))
}

async fn create_identity(
    state: AppState,
    context: AuthContext,
    request: CreateIdentityRequest,
) -> RouteResult<impl Reply> {
    let view = handlers::users::create_identity(&state, &context, request)
        .await
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::with_status(
        warp::reply::json(&view),
        StatusCode::CREATED,
    ))
}

async fn list_identities(state: AppState, context: AuthContext) -> RouteResult<impl Reply> {
    let views = handlers::users::list_identities(&state, &context)
        .await
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::json(&views))
}

async fn get_identity(id: i64, state: AppState, context: AuthContext) -> RouteResult<impl Reply> {
    let view = handlers::users::get_identity(&state, &context, id)
        .await
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::json(&view))
}

async fn update_identity(
    id: i64,
    state: AppState,
    context: AuthContext,
    request: UpdateIdentityRequest,
) -> RouteResult<impl Reply> {
    let view = handlers::users::update_identity(&state, &context, id, request)
        .await
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::json(&view))
}

async fn delete_identity(id: i64, state: AppState, context: AuthContext) -> RouteResult<impl Reply> {
    handlers::users::delete_identity(&state, &context, id)
        .await
        .map_err(warp::reject::custom)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Every route of the service, with rejection handling, CORS and request logging
pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let auth = with_auth(state.guard.clone());

    let root_route = warp::path::end().and(warp::get()).map(|| {
        warp::reply::json(&MessageResponse {
            message: "Role-based auth service is running!".to_string(),
        })
    });

    let health_route = warp::path!("health").and(warp::get()).map(|| "OK");

    let register_route = warp::path!("api" / "v1" / "auth" / "register")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(json_body())
        .and_then(register);

    let login_route = warp::path!("api" / "v1" / "auth" / "token")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(json_body())
        .and_then(login);

    let me_route = warp::path!("api" / "v1" / "auth" / "me")
        .and(warp::get())
        .and(auth.clone())
        .map(|context: AuthContext| warp::reply::json(&handlers::auth::me(&context)));

    let profile_route = warp::path!("profile")
        .and(warp::get())
        .and(auth.clone())
        .map(|context: AuthContext| warp::reply::json(&handlers::auth::profile(&context)));

    let admin_route = warp::path!("admin")
        .and(warp::get())
        .and(auth.clone())
        .and_then(admin_area);

    let create_user_route = warp::path!("api" / "v1" / "users")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(auth.clone())
        .and(json_body())
        .and_then(create_identity);

    let list_users_route = warp::path!("api" / "v1" / "users")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and(auth.clone())
        .and_then(list_identities);

    let get_user_route = warp::path!("api" / "v1" / "users" / i64)
        .and(warp::get())
        .and(with_state(state.clone()))
        .and(auth.clone())
        .and_then(get_identity);

    let update_user_route = warp::path!("api" / "v1" / "users" / i64)
        .and(warp::patch())
        .and(with_state(state.clone()))
        .and(auth.clone())
        .and(json_body())
        .and_then(update_identity);

    let delete_user_route = warp::path!("api" / "v1" / "users" / i64)
        .and(warp::delete())
        .and(with_state(state))
        .and(auth)
        .and_then(delete_identity);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["authorization", "content-type"])
        .allow_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"]);

    root_route
        .or(health_route)
        .or(register_route)
        .or(login_route)
        .or(me_route)
        .or(profile_route)
        .or(admin_route)
        .or(create_user_route)
        .or(list_users_route)
        .or(get_user_route)
        .or(update_user_route)
        .or(delete_user_route)
        .with(cors)
        .recover(handle_rejection)
        .with(warp::log("rolegate::api"))
}

/// Turn rejections into `{"detail": ...}` JSON responses
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, detail) = if let Some(e) = err.find::<RoleGateError>() {
        let status = e.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {}", e);
            (status, "Internal Server Error".to_string())
        } else {
            (status, e.to_string())
        }
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not Found".to_string())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, format!("Invalid request body: {}", e))
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed".to_string())
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large".to_string())
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Unsupported Media Type".to_string(),
        )
    } else if err.find::<warp::cors::CorsForbidden>().is_some() {
        (StatusCode::FORBIDDEN, "CORS request forbidden".to_string())
    } else {
        log::error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error".to_string(),
        )
    };

    let mut response =
        warp::reply::with_status(warp::reply::json(&ErrorBody { detail }), status).into_response();
    if status == StatusCode::UNAUTHORIZED {
        response
            .headers_mut()
            .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    }

    Ok(response)
}
