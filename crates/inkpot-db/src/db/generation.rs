use inkpot_core::{models::ContentGeneration, AppError};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const GENERATION_COLUMNS: &str =
    "id, user_id, organization_id, content_type, input, output_content, tokens_used, created_at";

/// Repository for the AI content generation history. Append and list only.
#[derive(Clone)]
pub struct GenerationRepository {
    pool: PgPool,
}

impl GenerationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, input, output_content), fields(db.table = "content_generations", db.operation = "insert", user.id = %user_id))]
    pub async fn record(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        content_type: &str,
        input: serde_json::Value,
        output_content: &str,
        tokens_used: i32,
    ) -> Result<ContentGeneration, AppError> {
        let generation = sqlx::query_as::<Postgres, ContentGeneration>(&format!(
            r#"
            INSERT INTO content_generations
                (user_id, organization_id, content_type, input, output_content, tokens_used)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {GENERATION_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(organization_id)
        .bind(content_type)
        .bind(input)
        .bind(output_content)
        .bind(tokens_used)
        .fetch_one(&self.pool)
        .await?;

        Ok(generation)
    }

    #[tracing::instrument(skip(self), fields(db.table = "content_generations", db.operation = "select", user.id = %user_id))]
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ContentGeneration>, AppError> {
        let generations = sqlx::query_as::<Postgres, ContentGeneration>(&format!(
            "SELECT {GENERATION_COLUMNS} FROM content_generations \
             WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
        ))
        .bind(user_id)
        .bind(limit.clamp(1, 100))
        .fetch_all(&self.pool)
        .await?;

        Ok(generations)
    }
}
