//! AI text generation
//!
//! A provider-agnostic [`TextGenerator`] trait with an Anthropic Messages API
//! implementation behind it. The trait boundary keeps handlers and tests free
//! of HTTP details; tests substitute a canned generator.

use async_trait::async_trait;
use inkpot_core::models::ContentType;
use inkpot_core::AppError;
use serde::{Deserialize, Serialize};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 2048;

/// Provider-independent generation request.
#[derive(Debug, Clone)]
pub struct GenerationInput {
    pub content_type: ContentType,
    pub topic: String,
    pub tone: Option<String>,
    /// Rough target, e.g. "short", "medium", "about 800 words"
    pub length: Option<String>,
    pub language: Option<String>,
    pub extra_instructions: Option<String>,
}

pub struct GeneratedText {
    pub content: String,
    pub tokens_used: i32,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, input: &GenerationInput) -> Result<GeneratedText, AppError>;
}

/// Builds the provider prompt. Kept free of provider specifics so every
/// [`TextGenerator`] shares identical instructions.
pub fn build_prompt(input: &GenerationInput) -> String {
    let instruction = match input.content_type {
        ContentType::BlogPost => {
            "Write a well-structured blog post with a title, introduction, body sections, and conclusion"
        }
        ContentType::Email => "Write a professional email with a subject line and body",
        ContentType::SocialMedia => {
            "Write a short, engaging social media post suitable for a professional audience"
        }
        ContentType::ProductDescription => {
            "Write a persuasive product description highlighting key benefits"
        }
        ContentType::MarketingCopy => {
            "Write compelling marketing copy with a clear call to action"
        }
    };

    let mut prompt = format!("{instruction} about the following topic: {}", input.topic);
    if let Some(tone) = &input.tone {
        prompt.push_str(&format!("\n\nUse a {tone} tone."));
    }
    if let Some(length) = &input.length {
        prompt.push_str(&format!("\nTarget length: {length}."));
    }
    if let Some(language) = &input.language {
        prompt.push_str(&format!("\nWrite in {language}."));
    }
    if let Some(extra) = &input.extra_instructions {
        prompt.push_str(&format!("\n\nAdditional instructions: {extra}"));
    }
    prompt
}

pub struct AnthropicGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
    #[serde(default)]
    usage: AnthropicUsage,
}

#[derive(Deserialize)]
struct AnthropicContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize, Default)]
struct AnthropicUsage {
    #[serde(default)]
    input_tokens: i32,
    #[serde(default)]
    output_tokens: i32,
}

impl AnthropicGenerator {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl TextGenerator for AnthropicGenerator {
    #[tracing::instrument(skip(self, input), fields(ai.model = %self.model, ai.content_type = input.content_type.as_str()))]
    async fn generate(&self, input: &GenerationInput) -> Result<GeneratedText, AppError> {
        let prompt = build_prompt(input);
        let request = AnthropicRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: vec![AnthropicMessage {
                role: "user",
                content: &prompt,
            }],
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("AI provider request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "AI provider returned an error");
            return Err(AppError::Internal(format!(
                "AI provider returned status {status}"
            )));
        }

        let parsed: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to parse AI provider response: {e}")))?;

        let content = parsed
            .content
            .into_iter()
            .map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");
        if content.is_empty() {
            return Err(AppError::Internal(
                "AI provider returned an empty response".to_string(),
            ));
        }

        Ok(GeneratedText {
            content,
            tokens_used: parsed.usage.input_tokens + parsed.usage.output_tokens,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(content_type: ContentType, topic: &str) -> GenerationInput {
        GenerationInput {
            content_type,
            topic: topic.to_string(),
            tone: None,
            length: None,
            language: None,
            extra_instructions: None,
        }
    }

    #[test]
    fn test_prompt_includes_topic() {
        let prompt = build_prompt(&input(ContentType::BlogPost, "rust web services"));
        assert!(prompt.contains("rust web services"));
        assert!(prompt.contains("blog post"));
    }

    #[test]
    fn test_prompt_includes_optional_fields() {
        let mut request = input(ContentType::Email, "quarterly update");
        request.tone = Some("friendly".to_string());
        request.length = Some("short".to_string());
        request.language = Some("Spanish".to_string());
        request.extra_instructions = Some("mention the new dashboard".to_string());
        let prompt = build_prompt(&request);
        assert!(prompt.contains("friendly tone"));
        assert!(prompt.contains("Target length: short"));
        assert!(prompt.contains("Write in Spanish"));
        assert!(prompt.contains("mention the new dashboard"));
    }

    #[test]
    fn test_prompt_varies_by_content_type() {
        let a = build_prompt(&input(ContentType::SocialMedia, "launch"));
        let b = build_prompt(&input(ContentType::MarketingCopy, "launch"));
        assert_ne!(a, b);
    }
}
