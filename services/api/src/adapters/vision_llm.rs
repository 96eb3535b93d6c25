//! services/api/src/adapters/vision_llm.rs
//!
//! This module contains the adapter for the image-analysis (vision) LLM.
//! It implements the `ImageAnalysisService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ImageDetail,
        ImageUrlArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, error};
use tutor_core::{
    analysis::parse_analysis,
    domain::AnalysisResult,
    ports::{ImageAnalysisService, PortError, PortResult},
};

const SYSTEM_INSTRUCTIONS: &str = r#"You are an expert educational tutor. Analyze the uploaded image and provide a comprehensive educational explanation.

Focus on:
1. Clear, accurate description of what's shown
2. Educational explanation suitable for learning
3. Key learning points
4. Appropriate difficulty level
5. Subject classification

Be engaging, accurate, and educational."#;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ImageAnalysisService` using an OpenAI vision model.
#[derive(Clone)]
pub struct OpenAiVisionAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiVisionAdapter {
    /// Creates a new `OpenAiVisionAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

/// The text part of the user message, focused on the user's question when there is one.
fn user_prompt(query: Option<&str>) -> String {
    match query.map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => format!("Please analyze this image and explain: \"{}\"", q),
        None => "Please analyze this image and provide an educational explanation.".to_string(),
    }
}

//=========================================================================================
// `ImageAnalysisService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ImageAnalysisService for OpenAiVisionAdapter {
    async fn analyze_image(
        &self,
        image_url: &str,
        query: Option<&str>,
    ) -> PortResult<AnalysisResult> {
        let to_port = |e: OpenAIError| PortError::Unexpected(e.to_string());

        let text_part = ChatCompletionRequestMessageContentPartTextArgs::default()
            .text(user_prompt(query))
            .build()
            .map_err(to_port)?;
        let image_part = ChatCompletionRequestMessageContentPartImageArgs::default()
            .image_url(
                ImageUrlArgs::default()
                    .url(image_url)
                    .detail(ImageDetail::High)
                    .build()
                    .map_err(to_port)?,
            )
            .build()
            .map_err(to_port)?;

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(to_port)?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(vec![text_part.into(), image_part.into()])
                .build()
                .map_err(to_port)?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(1000u32)
            .temperature(0.7)
            .build()
            .map_err(to_port)?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            error!("Vision model request failed: {}", e);
            PortError::Upstream(format!("Failed to analyze image: {}", e))
        })?;

        // An empty answer still parses into the default-filled analysis.
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        debug!("Vision model returned {} characters.", content.len());

        Ok(parse_analysis(&content))
    }
}
