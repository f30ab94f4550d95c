//! OpenAI-based providers for embeddings and completion
//!
//! One `OpenAiClient` is shared by the embedder and the completion provider.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::OpenAiConfig;
use crate::error::{Error, Result};

use super::completion::CompletionProvider;
use super::embedding::EmbeddingProvider;
use super::retry::{read_json, CallError, RetryPolicy};

const PROVIDER: &str = "openai";

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    /// Output size override; only the text-embedding-3 family accepts it
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Order embeddings by their `index` field and check one came back per input
fn into_ordered(mut data: Vec<EmbeddingData>, expected: usize) -> std::result::Result<Vec<Vec<f32>>, CallError> {
    if data.len() != expected {
        return Err(CallError::Fatal(format!(
            "expected {} embeddings, got {}",
            expected,
            data.len()
        )));
    }
    data.sort_by_key(|d| d.index);
    if data.iter().enumerate().any(|(i, d)| d.index != i) {
        return Err(CallError::Fatal("embedding indices are not contiguous".to_string()));
    }
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

/// Reject vectors whose length differs from the configured dimensionality
fn check_dimensions(vectors: &[Vec<f32>], expected: usize) -> Result<()> {
    match vectors.iter().position(|v| v.len() != expected) {
        Some(i) => Err(Error::embedding(format!(
            "embedding {} has {} dimensions, expected {}",
            i,
            vectors[i].len(),
            expected
        ))),
        None => Ok(()),
    }
}

/// Whether `model` supports the `dimensions` request parameter
fn supports_dimensions(model: &str) -> bool {
    model.starts_with("text-embedding-3")
}

/// OpenAI REST client with deadline and retry
pub struct OpenAiClient {
    /// HTTP client
    http: Client,
    base_url: String,
    api_key: String,
    retry: RetryPolicy,
}

impl OpenAiClient {
    /// Create a new client
    pub fn new(config: &OpenAiConfig, retry: RetryPolicy) -> Result<Self> {
        let http = Client::builder()
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            retry,
        })
    }

    /// `POST /embeddings`; output order matches `input` order
    pub async fn embeddings(
        &self,
        model: &str,
        dimensions: Option<usize>,
        input: &[String],
    ) -> std::result::Result<Vec<Vec<f32>>, CallError> {
        let url = format!("{}/embeddings", self.base_url);
        let request = EmbeddingRequest {
            model,
            input,
            dimensions,
        };
        let (http, url, api_key, request) = (&self.http, url.as_str(), self.api_key.as_str(), &request);

        let response: EmbeddingResponse = self
            .retry
            .run("openai embeddings", move || async move {
                let response = http
                    .post(url)
                    .bearer_auth(api_key)
                    .json(request)
                    .send()
                    .await
                    .map_err(CallError::from_reqwest)?;
                read_json(response).await
            })
            .await?;

        into_ordered(response.data, input.len())
    }

    /// `POST /chat/completions` with a single user message
    pub async fn chat(
        &self,
        model: &str,
        temperature: f32,
        prompt: &str,
    ) -> std::result::Result<String, CallError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model,
            temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };
        let (http, url, api_key, request) = (&self.http, url.as_str(), self.api_key.as_str(), &request);

        let response: ChatResponse = self
            .retry
            .run("openai chat completion", move || async move {
                let response = http
                    .post(url)
                    .bearer_auth(api_key)
                    .json(request)
                    .send()
                    .await
                    .map_err(CallError::from_reqwest)?;
                read_json(response).await
            })
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CallError::Fatal("response contained no completion".to_string()))
    }
}

/// OpenAI embedding provider
pub struct OpenAiEmbedder {
    client: Arc<OpenAiClient>,
    model: String,
    dimensions: usize,
    batch_size: usize,
}

impl OpenAiEmbedder {
    pub fn new(client: Arc<OpenAiClient>, config: &OpenAiConfig) -> Self {
        Self {
            client,
            model: config.embedding_model.clone(),
            dimensions: config.embedding_dimensions,
            batch_size: config.embedding_batch_size.max(1),
        }
    }

    fn request_dimensions(&self) -> Option<usize> {
        supports_dimensions(&self.model).then_some(self.dimensions)
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_many(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::embedding("API returned empty response"))
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            tracing::debug!(model = %self.model, batch_size = batch.len(), "embedding batch");
            let vectors = self
                .client
                .embeddings(&self.model, self.request_dimensions(), batch)
                .await
                .map_err(|e| e.into_error(PROVIDER, "embeddings", Error::EmbeddingFailed))?;
            check_dimensions(&vectors, self.dimensions())?;
            embeddings.extend(vectors);
        }

        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// OpenAI chat completion provider
pub struct OpenAiCompletion {
    client: Arc<OpenAiClient>,
    model: String,
    temperature: f32,
}

impl OpenAiCompletion {
    pub fn new(client: Arc<OpenAiClient>, config: &OpenAiConfig) -> Self {
        Self {
            client,
            model: config.completion_model.clone(),
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompletion {
    async fn complete(&self, prompt: &str) -> Result<String> {
        tracing::info!("Generating answer with model: {}", self.model);
        self.client
            .chat(&self.model, self.temperature, prompt)
            .await
            .map_err(|e| e.into_error(PROVIDER, "chat completion", Error::CompletionFailed))
    }
}
