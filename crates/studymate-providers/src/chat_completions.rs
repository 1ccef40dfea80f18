use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use studymate_core::{Error, GenerationConfig, Result, TextGenerator};
use tracing::debug;

/// Generator backed by an `OpenAI`-compatible `/chat/completions` API.
pub struct ChatCompletionsGenerator {
    /// HTTP client for API requests.
    client: Client,
    /// API root, without a trailing slash.
    base_url: String,
    /// Bearer token.
    api_key: String,
    /// Model name to use.
    model: String,
    /// Maximum number of tokens allowed in the completion.
    max_tokens: usize,
    /// Sampling temperature.
    temperature: f32,
    /// Sequences that end generation.
    stop: Vec<String>,
}

impl ChatCompletionsGenerator {
    /// Creates a generator, reading the API key from `config.api_key_env`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingApiKey`] if the variable is unset or empty.
    pub fn from_config(config: &GenerationConfig) -> Result<Self> {
        let api_key = env::var(&config.api_key_env).unwrap_or_default();
        Self::with_api_key(config, api_key)
    }

    /// Creates a generator with an explicit API key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingApiKey`] if the provided key is empty, or
    /// [`Error::Config`] if no base URL is configured.
    pub fn with_api_key(config: &GenerationConfig, api_key: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::MissingApiKey(config.api_key_env.clone()));
        }
        let Some(base_url) = config.base_url.as_deref() else {
            return Err(Error::Config(
                "generation.base_url is required for the chat_completions backend".to_owned(),
            ));
        };

        Ok(Self {
            client: Client::default(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_new_tokens,
            temperature: config.temperature,
            stop: config.stop_sequences.clone(),
        })
    }

    /// Model name sent with each request.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn request(&self, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_owned(),
                content: prompt.to_owned(),
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stop: self.stop.clone(),
        }
    }
}

/// Request payload sent to the chat completion API.
#[derive(Debug, Serialize)]
struct ChatRequest {
    /// Model identifier.
    model: String,
    /// Conversation sent to the model.
    messages: Vec<ChatMessage>,
    /// Sampling temperature controlling response randomness.
    temperature: f32,
    /// Maximum number of tokens allowed in the completion.
    max_tokens: usize,
    /// Sequences that end generation.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

/// Message delivered to the API.
#[derive(Debug, Serialize)]
struct ChatMessage {
    /// Role of the message author.
    role: String,
    /// Textual content of the message.
    content: String,
}

/// Response payload of a chat completion.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    /// List of candidate completions.
    choices: Vec<ChatChoice>,
}

/// A single completion choice.
#[derive(Debug, Deserialize)]
struct ChatChoice {
    /// Message generated for the choice.
    message: ChatResponseMessage,
}

/// Response message containing the generated text.
#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    /// Generated text content.
    content: String,
}

impl ChatResponse {
    fn into_text(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::InvalidResponse("No choices in chat completion".to_owned()))
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsGenerator {
    fn name(&self) -> &'static str {
        "ChatCompletions"
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.request(prompt))
            .send()
            .await
            .map_err(|err| Error::Generation(format!("Chat completion request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_owned());
            return Err(Error::Generation(format!(
                "Chat completion API error {status}: {error_text}"
            )));
        }

        let completion: ChatResponse = response.json().await.map_err(|err| {
            Error::InvalidResponse(format!("Failed to parse chat completion: {err}"))
        })?;
        debug!("Chat completion received from {}", self.model);

        completion.into_text()
    }
}
