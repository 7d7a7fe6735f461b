use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

use crate::config::LlmConfig;
use crate::pipeline::ContentGenerator;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Chat-completion client for the OpenRouter API.
///
/// One single-turn request per blog post; any network error, non-2xx status
/// or missing completion surfaces as a generation failure with no retry.
#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
    request_timeout: Duration,
}

impl OpenRouterClient {
    pub fn with_shared_client(client: Client, config: &LlmConfig) -> Self {
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_seconds),
        }
    }

    /// The fixed instructional prompt, parameterized by topic and target URL.
    #[must_use]
    pub fn build_prompt(topic: &str, main_page_url: &str) -> String {
        format!(
            "You are an expert content writer specializing in technical blogs. \
             Write a 700-word blog post about {topic}.\n\
             The blog should include:\n\
             - A catchy title\n\
             - A 100-word description summarizing the article\n\
             - A meta title (up to 60 characters)\n\
             - A meta description (up to 160 characters)\n\
             - A list of 5-7 relevant keywords\n\
             - A Python code snippet related to API testing\n\
             - A call-to-action at the end linking to {main_page_url} for more API testing resources.\n\
             Format the output as a JSON object with fields: title, description, meta_title, \
             meta_description, keywords, content.\n\
             Ensure the content is engaging, informative, exactly 700 words (excluding metadata), \
             and optimized for SEO.\n\
             Return ONLY the JSON object, without any additional text, Markdown, code fences, or explanations."
        )
    }

    async fn chat(&self, prompt: String) -> Result<String> {
        let url = format!("{}/chat/completions", self.api_base);
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "You are a helpful assistant.".to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        info!("Sending chat completion request to {url}");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(self.request_timeout)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("OpenRouter API error: {status} - {body}"));
        }

        let response: ChatResponse = response.json().await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow::anyhow!("OpenRouter response contained no completion"))
    }
}

#[async_trait]
impl ContentGenerator for OpenRouterClient {
    async fn generate(&self, topic: &str, main_page_url: &str) -> Result<String> {
        self.chat(Self::build_prompt(topic, main_page_url)).await
    }
}
