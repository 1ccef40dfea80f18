//! Configuration types for chunking, embedding, retrieval and generation.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dirs::home_dir;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use toml::{from_str, to_string_pretty};
use tracing::debug;

use crate::{Error, Result};

/// Environment variable overriding the embedding model.
const ENV_EMBEDDING_MODEL: &str = "EMBEDDING_MODEL";
/// Environment variable overriding the Ollama host.
const ENV_OLLAMA_HOST: &str = "OLLAMA_HOST";
/// Environment variable overriding the generation model.
const ENV_GENERATION_MODEL: &str = "GENERATION_MODEL";
/// Environment variable overriding the number of retrieved chunks.
const ENV_TOP_K: &str = "STUDYMATE_TOP_K";

/// Complete configuration for a study session.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    /// Word-window chunking settings
    pub chunking: ChunkingConfig,
    /// Embedding model settings
    pub embedding: EmbeddingConfig,
    /// Retrieval settings
    pub retrieval: RetrievalConfig,
    /// Text-generation settings
    pub generation: GenerationConfig,
}

/// Word-window chunking configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum number of words per chunk
    pub chunk_size: usize,
    /// Number of words shared by consecutive chunks
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            overlap: 100,
        }
    }
}

impl ChunkingConfig {
    /// Number of words the window advances between chunks.
    pub fn stride(&self) -> usize {
        self.chunk_size.saturating_sub(self.overlap)
    }

    /// Reject window settings that would never advance.
    ///
    /// # Errors
    /// Returns a configuration error if `chunk_size` is zero or `overlap >= chunk_size`.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Config("chunk_size must be positive".to_owned()));
        }
        if self.overlap >= self.chunk_size {
            return Err(Error::Config(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Embedding model configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Sentence-embedding model name
    pub model: String,
    /// Ollama host URL without port
    pub host: String,
    /// Ollama port
    pub port: u16,
    /// Maximum number of texts sent to the model per request
    pub batch_size: usize,
    /// Whether a missing model is pulled with `ollama pull`
    pub pull_missing: bool,
}

impl EmbeddingConfig {
    /// URL of the Ollama server: `host` with `port` applied.
    ///
    /// # Errors
    /// Returns a configuration error if `host` is not an absolute `http` or
    /// `https` URL.
    pub fn service_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.host).map_err(|error| {
            Error::Config(format!("embedding.host '{}' is not a URL: {error}", self.host))
        })?;
        if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
            return Err(Error::Config(format!(
                "embedding.host '{}' must look like http://hostname",
                self.host
            )));
        }
        url.set_port(Some(self.port)).map_err(|()| {
            Error::Config(format!("embedding.host '{}' cannot carry a port", self.host))
        })?;
        Ok(url)
    }

    /// Point at the server named by an `OLLAMA_HOST` value.
    ///
    /// Accepts `host`, `host:port` and `scheme://host[:port]`; without a
    /// scheme `http` is assumed and without a port the current one is kept.
    ///
    /// # Errors
    /// Returns a configuration error if the value has no usable host.
    pub fn set_ollama_host(&mut self, value: &str) -> Result<()> {
        let value = value.trim();
        let with_scheme = if value.contains("://") {
            value.to_owned()
        } else {
            format!("http://{value}")
        };
        let url = Url::parse(&with_scheme)
            .map_err(|error| Error::Config(format!("{ENV_OLLAMA_HOST} '{value}': {error}")))?;
        let Some(host) = url.host_str() else {
            return Err(Error::Config(format!("{ENV_OLLAMA_HOST} '{value}' has no host")));
        };

        self.host = format!("{}://{host}", url.scheme());
        if let Some(port) = url.port() {
            self.port = port;
        }
        Ok(())
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "all-minilm".to_owned(),
            host: "http://localhost".to_owned(),
            port: 11434,
            batch_size: 32,
            pull_missing: true,
        }
    }
}

/// Retrieval configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks passed to the generator per question
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 3 }
    }
}

/// Which text-generation service answers questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationBackend {
    /// Local Ollama `/api/generate`
    Ollama,
    /// Any `OpenAI`-compatible `/chat/completions` endpoint
    ChatCompletions,
}

/// Text-generation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Service used for generation
    pub backend: GenerationBackend,
    /// Model identifier passed to the service
    pub model: String,
    /// Base URL of the service; Ollama falls back to localhost when unset
    pub base_url: Option<String>,
    /// Environment variable holding the API key for remote backends
    pub api_key_env: String,
    /// Maximum number of generated tokens
    pub max_new_tokens: usize,
    /// Sampling temperature
    pub temperature: f32,
    /// Sequences that stop generation
    pub stop_sequences: Vec<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            backend: GenerationBackend::Ollama,
            model: "granite3.3:8b".to_owned(),
            base_url: None,
            api_key_env: "STUDYMATE_API_KEY".to_owned(),
            max_new_tokens: 300,
            temperature: 0.5,
            stop_sequences: vec!["\n\n".to_owned()],
        }
    }
}

impl StudyConfig {
    /// Get the default config directory path (`~/.studymate`)
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined
    pub fn config_dir() -> Result<PathBuf> {
        let home = home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_owned()))?;
        Ok(home.join(".studymate"))
    }

    /// Get the default config file path (`~/.studymate/config.toml`)
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from `path`, or from the default location when it exists,
    /// falling back to defaults. Environment overrides are applied and the
    /// result is validated.
    ///
    /// # Errors
    /// Returns an error if an explicit file cannot be read, any file fails to
    /// parse, an override is malformed, or validation fails.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(explicit) => Self::load_from_file(explicit)?,
            None => match Self::config_path() {
                Ok(default_path) if default_path.exists() => Self::load_from_file(&default_path)?,
                _ => Self::default(),
            },
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = from_str(&contents)?;

        debug!(
            "Loaded config from {}: embedding_model={}, generation_model={}",
            path.display(),
            config.embedding.model,
            config.generation.model
        );

        Ok(config)
    }

    /// Save config to a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = to_string_pretty(self)
            .map_err(|error| Error::Config(format!("Failed to serialize config: {error}")))?;

        let header = "# StudyMate Configuration File\n\
                      # Edit this file to customize chunking, models and retrieval\n\n";

        fs::write(path, format!("{header}{contents}"))?;
        Ok(())
    }

    /// Apply overrides from the process environment.
    ///
    /// # Errors
    /// Returns an error if an override value is malformed
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Recognized keys: `EMBEDDING_MODEL`, `OLLAMA_HOST`, `GENERATION_MODEL`,
    /// `STUDYMATE_TOP_K`. `OLLAMA_HOST` also moves the Ollama generator.
    ///
    /// # Errors
    /// Returns an error if `OLLAMA_HOST` has no host or `STUDYMATE_TOP_K` is
    /// not a number
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup(ENV_EMBEDDING_MODEL) {
            self.embedding.model = model;
        }
        if let Some(host) = lookup(ENV_OLLAMA_HOST) {
            self.embedding.set_ollama_host(&host)?;
            if self.generation.backend == GenerationBackend::Ollama {
                self.generation.base_url =
                    Some(format!("{}:{}", self.embedding.host, self.embedding.port));
            }
        }
        if let Some(model) = lookup(ENV_GENERATION_MODEL) {
            self.generation.model = model;
        }
        if let Some(top_k) = lookup(ENV_TOP_K) {
            self.retrieval.top_k = top_k.trim().parse().map_err(|error| {
                Error::Config(format!("{ENV_TOP_K} must be a positive integer: {error}"))
            })?;
        }
        Ok(())
    }

    /// Validate every section.
    ///
    /// # Errors
    /// Returns a configuration error naming the first invalid setting
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        if self.embedding.model.trim().is_empty() {
            return Err(Error::Config("embedding.model must not be empty".to_owned()));
        }
        self.embedding.service_url()?;
        if self.embedding.batch_size == 0 {
            return Err(Error::Config("embedding.batch_size must be positive".to_owned()));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("retrieval.top_k must be positive".to_owned()));
        }
        if self.generation.backend == GenerationBackend::ChatCompletions
            && self.generation.base_url.is_none()
        {
            return Err(Error::Config(
                "generation.base_url is required for the chat_completions backend".to_owned(),
            ));
        }
        if self.generation.max_new_tokens == 0 {
            return Err(Error::Config(
                "generation.max_new_tokens must be positive".to_owned(),
            ));
        }
        Ok(())
    }
}
