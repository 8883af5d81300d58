//! Ollama client implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::debug;

use haven_core::{
    EmbeddingProvider, Error, GenerationConfig, GenerationResult, LLMProvider, Result,
};

use crate::config::OllamaConfig;

/// Client for a local Ollama server
pub struct OllamaClient {
    config: OllamaConfig,
    client: Client,
    current_model: String,
    connected: bool,
}

#[derive(Serialize)]
struct GenerateOptions {
    num_predict: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaClient {
    /// Create a new Ollama client from configuration
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            current_model: config.model.clone(),
            config,
            client,
            connected: false,
        })
    }

    /// Create a new Ollama client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = OllamaConfig::from_env()?;
        Self::new(config)
    }

    /// Set the model to use for generation
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.current_model = model_id.into();
        self
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Default generation settings for this client's model and timeout
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            model_id: self.current_model.clone(),
            timeout: self.config.timeout(),
            ..Default::default()
        }
    }

    async fn perform_generation(&self, prompt: &str, config: &GenerationConfig) -> Result<GenerateResponse> {
        let request_body = GenerateRequest {
            model: &config.model_id,
            prompt,
            stream: false,
            options: GenerateOptions {
                num_predict: config.max_tokens,
                temperature: config.temperature,
                top_k: config.top_k,
                top_p: config.top_p,
                stop: config.stop_sequences.clone(),
            },
        };

        let url = format!("{}/api/generate", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Generation(format!(
                "Ollama generate request failed with status {}: {}",
                status, error_text
            )));
        }

        let data: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        if data.response.trim().is_empty() {
            return Err(Error::Generation(format!(
                "Empty response from model {}",
                config.model_id
            )));
        }

        Ok(data)
    }
}

#[async_trait]
impl LLMProvider for OllamaClient {
    async fn connect(&mut self) -> Result<()> {
        let url = format!("{}/api/tags", self.config.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Ollama not reachable at {}: {}", self.config.base_url, e)))?;

        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "Ollama health check failed: {}",
                response.status()
            )));
        }

        self.connected = true;
        debug!(url = %self.config.base_url, model = %self.current_model, "connected to Ollama");

        Ok(())
    }

    async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
        let config = self.generation_config();
        self.generate_with_config(prompt, &config).await
    }

    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        let generation_future = self.perform_generation(prompt, config);

        let data = match timeout(config.timeout, generation_future).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(Error::Timeout(format!(
                    "No answer from {} within {}s",
                    config.model_id,
                    config.timeout.as_secs()
                )));
            }
        };

        Ok(GenerationResult {
            text: data.response.trim().to_string(),
            model_id: config.model_id.clone(),
            tokens_used: data.eval_count,
        })
    }

    fn model_id(&self) -> &str {
        &self.current_model
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request_body = EmbeddingRequest {
            model: &self.config.embedding_model,
            prompt: text,
        };

        let url = format!("{}/api/embeddings", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Retrieval(format!(
                "Ollama embedding request failed with status {}",
                response.status()
            )));
        }

        let data: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        if data.embedding.is_empty() {
            return Err(Error::Retrieval(format!(
                "Embedding model {} returned an empty vector",
                self.config.embedding_model
            )));
        }

        Ok(data.embedding)
    }

    fn embedding_model(&self) -> &str {
        &self.config.embedding_model
    }
}
