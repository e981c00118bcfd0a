use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Kind of content the AI provider is asked to produce.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    BlogPost,
    Email,
    SocialMedia,
    ProductDescription,
    MarketingCopy,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::BlogPost => "blog_post",
            ContentType::Email => "email",
            ContentType::SocialMedia => "social_media",
            ContentType::ProductDescription => "product_description",
            ContentType::MarketingCopy => "marketing_copy",
        }
    }
}

/// One stored AI generation: the request that produced it and the output.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct ContentGeneration {
    pub id: Uuid,
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub content_type: String,
    pub input: serde_json::Value,
    pub output_content: String,
    pub tokens_used: i32,
    pub created_at: DateTime<Utc>,
}
