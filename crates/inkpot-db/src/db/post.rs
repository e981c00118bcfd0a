use inkpot_core::{models::BlogPost, AppError};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const POST_COLUMNS: &str = "id, user_id, title, content, created_at, updated_at";

/// Repository for blog posts. Author-scoped: every query binds the author.
#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, title, content), fields(db.table = "blog_posts", db.operation = "insert", user.id = %user_id))]
    pub async fn create(
        &self,
        user_id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<BlogPost, AppError> {
        let post = sqlx::query_as::<Postgres, BlogPost>(&format!(
            r#"
            INSERT INTO blog_posts (user_id, title, content)
            VALUES ($1, $2, $3)
            RETURNING {POST_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(title)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    #[tracing::instrument(skip(self), fields(db.table = "blog_posts", db.operation = "select", db.record_id = %id))]
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<BlogPost>, AppError> {
        let post = sqlx::query_as::<Postgres, BlogPost>(&format!(
            "SELECT {POST_COLUMNS} FROM blog_posts WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    #[tracing::instrument(skip(self), fields(db.table = "blog_posts", db.operation = "select", user.id = %user_id))]
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<BlogPost>, AppError> {
        let posts = sqlx::query_as::<Postgres, BlogPost>(&format!(
            "SELECT {POST_COLUMNS} FROM blog_posts WHERE user_id = $1 ORDER BY created_at DESC",
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    #[tracing::instrument(skip(self, title, content), fields(db.table = "blog_posts", db.operation = "update", db.record_id = %id))]
    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<BlogPost, AppError> {
        let post = sqlx::query_as::<Postgres, BlogPost>(&format!(
            r#"
            UPDATE blog_posts
            SET title = COALESCE($3, title),
                content = COALESCE($4, content),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {POST_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(user_id)
        .bind(title)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        Ok(post)
    }

    #[tracing::instrument(skip(self), fields(db.table = "blog_posts", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let rows_affected = sqlx::query("DELETE FROM blog_posts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound("Post not found".to_string()));
        }

        Ok(())
    }
}
