use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use studymate_core::{Error, GenerationConfig, Result, TextGenerator};
use tracing::debug;

/// Ollama endpoint used when no base URL is configured.
const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Generator backed by a local Ollama server.
pub struct OllamaGenerator {
    /// HTTP client for API requests.
    client: Client,
    /// Server root, without a trailing slash.
    base_url: String,
    /// Model name to use.
    model: String,
    /// Sampling options sent with every request.
    options: GenerateOptions,
}

impl OllamaGenerator {
    /// Create a generator from the generation settings.
    pub fn new(config: &GenerationConfig) -> Self {
        let base_url = config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_owned();

        Self {
            client: Client::new(),
            base_url,
            model: config.model.clone(),
            options: GenerateOptions {
                temperature: config.temperature,
                num_predict: config.max_new_tokens,
                stop: config.stop_sequences.clone(),
            },
        }
    }

    /// Model name sent with each request.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn request(&self, prompt: &str) -> GenerateRequest {
        GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_owned(),
            stream: false,
            options: self.options.clone(),
        }
    }
}

/// Request body for `/api/generate`.
#[derive(Debug, Serialize)]
struct GenerateRequest {
    /// Model to use for generation.
    model: String,
    /// Input prompt for the model.
    prompt: String,
    /// Whether to stream the response.
    stream: bool,
    /// Sampling options.
    options: GenerateOptions,
}

/// Sampling options understood by Ollama.
#[derive(Debug, Clone, Serialize)]
struct GenerateOptions {
    /// Sampling temperature.
    temperature: f32,
    /// Maximum tokens to generate.
    num_predict: usize,
    /// Sequences that end generation.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

/// Response body of a non-streaming `/api/generate` call.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    /// Generated text content.
    response: String,
    /// Number of tokens generated.
    #[serde(default)]
    eval_count: usize,
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    fn name(&self) -> &'static str {
        "Ollama"
    }

    async fn is_available(&self) -> bool {
        self.client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .is_ok_and(|response| response.status().is_success())
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&self.request(prompt))
            .send()
            .await
            .map_err(|err| Error::Generation(format!("Ollama request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_owned());
            return Err(Error::Generation(format!(
                "Ollama returned error {status}: {error_text}"
            )));
        }

        let generated: GenerateResponse = response.json().await.map_err(|err| {
            Error::InvalidResponse(format!("Failed to parse Ollama response: {err}"))
        })?;
        debug!("Ollama/{} generated {} tokens", self.model, generated.eval_count);

        Ok(generated.response)
    }
}
