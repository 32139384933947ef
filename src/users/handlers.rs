use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};

use crate::{
    auth::{extractors::AuthUser, password::hash_password},
    error::ApiError,
    state::AppState,
};

use super::dto::{NewUser, SearchQuery, UserUpdate};
use super::repo::{self, User};

/// POST /users
#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let Json(mut payload) = payload.map_err(|e| ApiError::Malformed(e.body_text()))?;
    payload.normalize_and_validate()?;

    let hash = hash_password(&payload.password)?;
    let user = repo::create(&state.db, &payload.name, &payload.nick, &payload.email, &hash).await?;

    info!(user_id = user.id, nick = %user.nick, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /users?user=<substr>
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    let name_or_nick = query.user.to_lowercase();
    let users = repo::search(&state.db, &name_or_nick).await?;
    Ok(Json(users))
}

/// GET /users/:id — callers may only read their own record.
#[instrument(skip(state))]
pub async fn get(
    State(state): State<AppState>,
    AuthUser(caller_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    if caller_id != id {
        return Err(ApiError::Forbidden("user unauthorized".into()));
    }
    let user = repo::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(Json(user))
}

/// PUT /users/:id
#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<AppState>,
    AuthUser(caller_id): AuthUser,
    Path(id): Path<i64>,
    payload: Result<Json<UserUpdate>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    if caller_id != id {
        return Err(ApiError::Forbidden("user unauthorized".into()));
    }
    let Json(mut payload) = payload.map_err(|e| ApiError::Malformed(e.body_text()))?;
    payload.normalize_and_validate()?;

    repo::update(&state.db, id, &payload.name, &payload.nick, &payload.email).await?;
    info!(user_id = id, "user updated");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /users/:id
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(caller_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if caller_id != id {
        return Err(ApiError::Forbidden("user unauthorized".into()));
    }
    repo::delete(&state.db, id).await?;
    info!(user_id = id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
