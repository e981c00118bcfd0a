//! Blog post endpoints. Strictly author-scoped.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use inkpot_core::{models::BlogPost, AppError};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::models::AuthContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub content: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedJson(request): ValidatedJson<CreatePostRequest>,
) -> Result<(StatusCode, Json<BlogPost>), HttpAppError> {
    let post = state
        .posts
        .create(auth.user.id, &request.title, &request.content)
        .await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Vec<BlogPost>>, HttpAppError> {
    let posts = state.posts.list_for_user(auth.user.id).await?;
    Ok(Json(posts))
}

/// Load a post and check it belongs to the caller: missing is 404, someone
/// else's is 403.
async fn owned_post(
    state: &AppState,
    user_id: Uuid,
    post_id: Uuid,
) -> Result<BlogPost, AppError> {
    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
    if post.user_id != user_id {
        return Err(AppError::PermissionDenied(
            "You do not have access to this post".to_string(),
        ));
    }
    Ok(post)
}

pub async fn get(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(post_id): Path<Uuid>,
) -> Result<Json<BlogPost>, HttpAppError> {
    let post = owned_post(&state, auth.user.id, post_id).await?;
    Ok(Json(post))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(post_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdatePostRequest>,
) -> Result<Json<BlogPost>, HttpAppError> {
    owned_post(&state, auth.user.id, post_id).await?;
    let post = state
        .posts
        .update(
            auth.user.id,
            post_id,
            request.title.as_deref(),
            request.content.as_deref(),
        )
        .await?;
    Ok(Json(post))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(post_id): Path<Uuid>,
) -> Result<StatusCode, HttpAppError> {
    owned_post(&state, auth.user.id, post_id).await?;
    state.posts.delete(auth.user.id, post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
