//! [`ExtractionProvider`] backed by any OpenAI-compatible chat-completions
//! endpoint. The model's reply is parsed as JSON and handed to the
//! interpreter untouched; all normalization and completeness logic lives
//! in the `command` crate.

mod error;
mod prompt;

pub use error::Error;

use tally_command::{BoxFuture, ExtractionError, ExtractionProvider};
use tally_command_interface::{ContextEntry, RecentCommand};

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

pub struct OpenAiProvider {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

#[derive(Default)]
pub struct OpenAiProviderBuilder {
    api_base: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
}

impl OpenAiProviderBuilder {
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn build(self) -> OpenAiProvider {
        let api_base = self
            .api_base
            .unwrap_or_else(|| OPENAI_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        OpenAiProvider {
            client: reqwest::Client::new(),
            api_base,
            api_key: self.api_key.unwrap_or_default(),
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }
}

impl OpenAiProvider {
    pub fn builder() -> OpenAiProviderBuilder {
        OpenAiProviderBuilder::default()
    }

    pub async fn extract_value(
        &self,
        fragment: &str,
        history: &[ContextEntry],
        recents: &[RecentCommand],
    ) -> Result<serde_json::Value, Error> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt::SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt::build_user_message(fragment, history, recents),
                },
            ],
            temperature: 0.0,
        };

        tracing::debug!(model = %self.model, fragment, "extraction_request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(Error::MissingContent)?;

        let value = serde_json::from_str(prompt::strip_code_fence(&content))?;
        Ok(value)
    }
}

impl ExtractionProvider for OpenAiProvider {
    fn extract<'a>(
        &'a self,
        fragment: &'a str,
        history: &'a [ContextEntry],
        recents: &'a [RecentCommand],
    ) -> BoxFuture<'a, Result<serde_json::Value, ExtractionError>> {
        Box::pin(async move {
            self.extract_value(fragment, history, recents)
                .await
                .map_err(ExtractionError::from)
        })
    }
}

#[derive(serde::Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(serde::Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(serde::Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(serde::Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(serde::Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}
