use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};

use crate::{auth::extractors::AuthUser, error::ApiError, state::AppState, users::repo::User};

use super::repo;

/// POST /users/:id/follow — the caller starts following `:id`. The
/// self-follow check happens here; the store would silently accept the edge.
#[instrument(skip(state))]
pub async fn follow(
    State(state): State<AppState>,
    AuthUser(follower_id): AuthUser,
    Path(target_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if follower_id == target_id {
        return Err(ApiError::Forbidden("not possible to follow yourself".into()));
    }
    repo::follow(&state.db, follower_id, target_id).await?;
    info!(follower_id, target_id, "follow edge added");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /users/:id/unfollow
#[instrument(skip(state))]
pub async fn unfollow(
    State(state): State<AppState>,
    AuthUser(follower_id): AuthUser,
    Path(target_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if follower_id == target_id {
        return Err(ApiError::Forbidden(
            "not possible to unfollow yourself".into(),
        ));
    }
    repo::unfollow(&state.db, follower_id, target_id).await?;
    info!(follower_id, target_id, "follow edge removed");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/:id/followers
#[instrument(skip(state))]
pub async fn followers(
    State(state): State<AppState>,
    Path(target_id): Path<i64>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = repo::followers(&state.db, target_id).await?;
    Ok(Json(users))
}

/// GET /users/:id/following
#[instrument(skip(state))]
pub async fn following(
    State(state): State<AppState>,
    Path(follower_id): Path<i64>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = repo::following(&state.db, follower_id).await?;
    Ok(Json(users))
}
