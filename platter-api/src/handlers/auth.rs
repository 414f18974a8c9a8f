use axum::http::{HeaderMap, StatusCode};
use axum::{
    Form, Router,
    extract::{Path, State},
    response::Json,
    routing::{get, post, put},
};
use tracing::instrument;

use platter_core::users::{self, ProfileUpdate, RegisterUser};

use crate::error::ApiError;
use crate::models::*;

use super::{AppState, authenticate};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", post(register_user))
        .route("/auth/token", post(issue_token))
        .route("/users/me", get(current_user))
        .route("/users/{id}", put(update_user).delete(delete_user))
}

#[utoipa::path(
    post,
    path = "/users",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = UserResponse),
        (status = 409, description = "Email or phone already registered", body = ApiErrorResponse),
    ),
    tag = "users"
)]
#[instrument(skip(state, payload))]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let conn = &mut state.conn()?;

    let user = users::create(
        conn,
        RegisterUser {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            phone_number: payload.phone_number,
            address: payload.address,
        },
    )?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    post,
    path = "/auth/token",
    request_body(content = IssueTokenRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token issued successfully", body = IssueTokenResponse),
        (status = 401, description = "Invalid credentials", body = ApiErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(state, payload))]
pub async fn issue_token(
    State(state): State<AppState>,
    Form(payload): Form<IssueTokenRequest>,
) -> Result<Json<IssueTokenResponse>, ApiError> {
    if payload.grant_type != "password" {
        return Err(ApiError::Unauthorized);
    }

    let conn = &mut state.conn()?;
    let user = users::verify_credentials(conn, &payload.username, &payload.password)?;

    let access_token = state.tokens.issue(user.id, user.role)?;

    Ok(Json(IssueTokenResponse {
        token_type: "bearer".to_string(),
        access_token,
        expires_in: state.tokens.ttl().num_seconds(),
    }))
}

#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "The authenticated user's profile", body = UserResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
#[instrument(skip(state, headers))]
pub async fn current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, ApiError> {
    let principal = authenticate(&state, &headers)?;

    let conn = &mut state.conn()?;
    let user = users::find_by_id(conn, principal.id)?;

    Ok(Json(user.into()))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 403, description = "Not the profile owner", body = ApiErrorResponse),
        (status = 404, description = "User not found", body = ApiErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
#[instrument(skip(state, headers, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<i32>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let principal = authenticate(&state, &headers)?;

    let conn = &mut state.conn()?;
    let user = users::update_profile(
        conn,
        principal,
        user_id,
        ProfileUpdate {
            name: payload.name,
            phone_number: payload.phone_number,
            address: payload.address,
            password: payload.password,
        },
    )?;

    Ok(Json(user.into()))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Not the profile owner", body = ApiErrorResponse),
        (status = 404, description = "User not found", body = ApiErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
#[instrument(skip(state, headers))]
pub async fn delete_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let principal = authenticate(&state, &headers)?;

    let conn = &mut state.conn()?;
    users::delete(conn, principal, user_id)?;

    Ok(StatusCode::NO_CONTENT)
}
