//! Configuration for the question answering backend
//!
//! Every section has a `Default`; `AppConfig::from_env` overlays environment
//! variables on top of those defaults.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// Main backend configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
    /// Embedding and completion provider configuration
    pub openai: OpenAiConfig,
    /// Vector index configuration
    pub vector_index: VectorIndexConfig,
    /// Timeout and retry policy for provider calls
    pub retry: RetryConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Maximum upload size in bytes (default: 25MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_upload_size: 25 * 1024 * 1024,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of nearest chunks fed to the completion model
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

/// OpenAI-compatible embedding and completion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API key (never logged)
    #[serde(skip_serializing)]
    pub api_key: String,
    /// API base URL
    pub base_url: String,
    /// Embedding model name
    pub embedding_model: String,
    /// Embedding dimensions
    pub embedding_dimensions: usize,
    /// Maximum texts per embeddings request
    pub embedding_batch_size: usize,
    /// Completion model name
    pub completion_model: String,
    /// Sampling temperature for completions
    pub temperature: f32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_dimensions: 1536,
            embedding_batch_size: 100,
            completion_model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
        }
    }
}

/// Vector index backend selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VectorBackend {
    /// Hosted Pinecone index
    #[default]
    Pinecone,
    /// Process-local index, lost on restart
    Memory,
}

impl FromStr for VectorBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pinecone" => Ok(Self::Pinecone),
            "memory" => Ok(Self::Memory),
            other => Err(Error::Config(format!(
                "Unknown vector backend '{}', expected 'pinecone' or 'memory'",
                other
            ))),
        }
    }
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndexConfig {
    /// Backend to use
    pub backend: VectorBackend,
    /// Pinecone API key (never logged)
    #[serde(skip_serializing)]
    pub api_key: String,
    /// Pinecone index name
    pub index_name: String,
    /// Data plane host; resolved from the control plane when absent
    pub index_host: Option<String>,
    /// Control plane base URL
    pub control_plane_url: String,
    /// Optional namespace inside the index
    pub namespace: Option<String>,
    /// Maximum vectors per upsert request
    pub upsert_batch_size: usize,
}

impl Default for VectorIndexConfig {
    fn default() -> Self {
        Self {
            backend: VectorBackend::default(),
            api_key: String::new(),
            index_name: String::new(),
            index_host: None,
            control_plane_url: "https://api.pinecone.io".to_string(),
            namespace: None,
            upsert_batch_size: 100,
        }
    }
}

/// Timeout and retry policy for provider calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Deadline for a single provider call in seconds
    pub timeout_secs: u64,
    /// Total attempts per call, including the first
    pub max_attempts: u32,
    /// Backoff before the second attempt in milliseconds; doubles afterwards
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            max_attempts: 3,
            base_delay_ms: 500,
        }
    }
}

impl RetryConfig {
    /// Per-call deadline
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Initial backoff
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

impl AppConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let env = Lookup(&lookup);

        env.parse_into("HOST", &mut config.server.host)?;
        env.parse_into("PORT", &mut config.server.port)?;
        env.parse_into("MAX_UPLOAD_SIZE", &mut config.server.max_upload_size)?;

        env.parse_into("CHUNK_SIZE", &mut config.chunking.chunk_size)?;
        env.parse_into("CHUNK_OVERLAP", &mut config.chunking.chunk_overlap)?;
        env.parse_into("RETRIEVAL_TOP_K", &mut config.retrieval.top_k)?;

        env.parse_into("OPENAI_API_KEY", &mut config.openai.api_key)?;
        env.parse_into("OPENAI_BASE_URL", &mut config.openai.base_url)?;
        env.parse_into("EMBEDDING_MODEL", &mut config.openai.embedding_model)?;
        env.parse_into("EMBEDDING_DIMENSIONS", &mut config.openai.embedding_dimensions)?;
        env.parse_into("EMBEDDING_BATCH_SIZE", &mut config.openai.embedding_batch_size)?;
        env.parse_into("COMPLETION_MODEL", &mut config.openai.completion_model)?;
        env.parse_into("COMPLETION_TEMPERATURE", &mut config.openai.temperature)?;

        env.parse_into("VECTOR_BACKEND", &mut config.vector_index.backend)?;
        env.parse_into("PINECONE_API_KEY", &mut config.vector_index.api_key)?;
        env.parse_into("PINECONE_INDEX_NAME", &mut config.vector_index.index_name)?;
        env.parse_into("PINECONE_CONTROL_PLANE_URL", &mut config.vector_index.control_plane_url)?;
        env.parse_into("PINECONE_UPSERT_BATCH_SIZE", &mut config.vector_index.upsert_batch_size)?;
        config.vector_index.index_host = env.get("PINECONE_INDEX_HOST");
        config.vector_index.namespace = env.get("PINECONE_NAMESPACE");

        env.parse_into("PROVIDER_TIMEOUT_SECS", &mut config.retry.timeout_secs)?;
        env.parse_into("PROVIDER_MAX_ATTEMPTS", &mut config.retry.max_attempts)?;
        env.parse_into("PROVIDER_RETRY_BASE_DELAY_MS", &mut config.retry.base_delay_ms)?;

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints and required credentials
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config("CHUNK_SIZE must be greater than zero".into()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::Config(format!(
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("RETRIEVAL_TOP_K must be greater than zero".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::Config("PROVIDER_MAX_ATTEMPTS must be at least 1".into()));
        }
        if self.openai.embedding_batch_size == 0 || self.vector_index.upsert_batch_size == 0 {
            return Err(Error::Config("Batch sizes must be greater than zero".into()));
        }
        if self.openai.api_key.is_empty() {
            return Err(Error::Config("OPENAI_API_KEY is not set".into()));
        }
        if self.vector_index.backend == VectorBackend::Pinecone {
            if self.vector_index.api_key.is_empty() {
                return Err(Error::Config("PINECONE_API_KEY is not set".into()));
            }
            if self.vector_index.index_name.is_empty() && self.vector_index.index_host.is_none() {
                return Err(Error::Config(
                    "PINECONE_INDEX_NAME or PINECONE_INDEX_HOST must be set".into(),
                ));
            }
        }
        Ok(())
    }
}

struct Lookup<'a, F>(&'a F);

impl<F> Lookup<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn parse_into<T>(&self, key: &str, slot: &mut T) -> Result<()>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        if let Some(raw) = self.get(key) {
            *slot = raw
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("Invalid value for {}: {}", key, e)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_required_keys() {
        let config = AppConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("PINECONE_API_KEY", "pc-test"),
            ("PINECONE_INDEX_NAME", "docs"),
        ]))
        .unwrap();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.chunking.chunk_overlap, 200);
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.vector_index.backend, VectorBackend::Pinecone);
        assert_eq!(config.vector_index.index_name, "docs");
        assert!(config.vector_index.index_host.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("VECTOR_BACKEND", "memory"),
            ("PORT", "8081"),
            ("CHUNK_SIZE", "500"),
            ("CHUNK_OVERLAP", "50"),
            ("RETRIEVAL_TOP_K", "3"),
            ("PROVIDER_TIMEOUT_SECS", "10"),
        ]))
        .unwrap();

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.chunking.chunk_overlap, 50);
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.vector_index.backend, VectorBackend::Memory);
        assert_eq!(config.retry.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_missing_openai_key() {
        let err = AppConfig::from_lookup(lookup(&[("VECTOR_BACKEND", "memory")])).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_pinecone_requires_index() {
        let err = AppConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("PINECONE_API_KEY", "pc-test"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("PINECONE_INDEX_NAME"));
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        let err = AppConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("VECTOR_BACKEND", "memory"),
            ("CHUNK_SIZE", "100"),
            ("CHUNK_OVERLAP", "100"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_number() {
        let err = AppConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("VECTOR_BACKEND", "memory"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_unknown_backend() {
        assert!("qdrant".parse::<VectorBackend>().is_err());
        assert_eq!("Memory".parse::<VectorBackend>().unwrap(), VectorBackend::Memory);
    }
}
