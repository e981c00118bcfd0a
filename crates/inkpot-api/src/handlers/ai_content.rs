//! AI content generation endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use inkpot_core::{
    models::{ContentGeneration, ContentType},
    AppError,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::models::AuthContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::handlers::member_role;
use crate::services::content::GenerationInput;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GenerateRequest {
    pub organization_id: Uuid,
    pub content_type: ContentType,
    #[validate(length(min = 1, max = 2000, message = "must be 1-2000 characters"))]
    pub topic: String,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub tone: Option<String>,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub length: Option<String>,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub language: Option<String>,
    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    pub extra_instructions: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

pub async fn generate(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedJson(request): ValidatedJson<GenerateRequest>,
) -> Result<(StatusCode, Json<ContentGeneration>), HttpAppError> {
    member_role(&state, request.organization_id, auth.user.id).await?;

    let Some(generator) = &state.generator else {
        return Err(HttpAppError(AppError::BadRequest(
            "No AI provider is configured; set ANTHROPIC_API_KEY".to_string(),
        )));
    };

    let input = GenerationInput {
        content_type: request.content_type,
        topic: request.topic.clone(),
        tone: request.tone.clone(),
        length: request.length.clone(),
        language: request.language.clone(),
        extra_instructions: request.extra_instructions.clone(),
    };
    let generated = generator.generate(&input).await?;

    let stored_input = serde_json::json!({
        "topic": request.topic,
        "tone": request.tone,
        "length": request.length,
        "language": request.language,
        "extra_instructions": request.extra_instructions,
    });

    let generation = state
        .generations
        .record(
            auth.user.id,
            request.organization_id,
            request.content_type.as_str(),
            stored_input,
            &generated.content,
            generated.tokens_used,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(generation)))
}

pub async fn history(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<ContentGeneration>>, HttpAppError> {
    let generations = state
        .generations
        .list_for_user(auth.user.id, query.limit.unwrap_or(50))
        .await?;
    Ok(Json(generations))
}
