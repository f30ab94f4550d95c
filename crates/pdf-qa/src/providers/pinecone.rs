//! Pinecone vector index provider
//!
//! Talks to the index's data plane over REST. The data plane host is either
//! configured directly or resolved once from the control plane at startup.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::VectorIndexConfig;
use crate::error::{Error, Result};
use crate::providers::vector_index::VectorIndex;
use crate::types::{IndexedVector, Match, Metadata, VectorQuery};

use super::retry::{read_json, CallError, RetryPolicy};

const PROVIDER: &str = "pinecone";
const API_VERSION: &str = "2024-07";

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [IndexedVector],
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<Metadata>,
}

#[derive(Deserialize)]
struct DescribeIndexResponse {
    host: String,
}

/// Pinecone-hosted vector index
pub struct PineconeIndex {
    http: Client,
    /// Data plane base URL, e.g. `https://docs-abc123.svc.us-east-1.pinecone.io`
    base_url: String,
    api_key: String,
    namespace: Option<String>,
    retry: RetryPolicy,
}

impl PineconeIndex {
    /// Connect to the configured index, resolving its host if needed
    pub async fn connect(config: &VectorIndexConfig, retry: RetryPolicy) -> Result<Self> {
        let http = Client::builder()
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        let host = match &config.index_host {
            Some(host) => host.clone(),
            None => Self::describe_host(&http, config, &retry).await?,
        };

        tracing::info!("Pinecone index '{}' at {}", config.index_name, host);

        Ok(Self {
            http,
            base_url: data_plane_url(&host),
            api_key: config.api_key.clone(),
            namespace: config.namespace.clone(),
            retry,
        })
    }

    /// Look up the data plane host for `config.index_name`
    async fn describe_host(
        http: &Client,
        config: &VectorIndexConfig,
        retry: &RetryPolicy,
    ) -> Result<String> {
        let url = format!(
            "{}/indexes/{}",
            config.control_plane_url.trim_end_matches('/'),
            config.index_name
        );
        let (url, api_key) = (url.as_str(), config.api_key.as_str());

        let described: DescribeIndexResponse = retry
            .run("pinecone describe index", move || async move {
                let response = http
                    .get(url)
                    .header("Api-Key", api_key)
                    .header("X-Pinecone-API-Version", API_VERSION)
                    .send()
                    .await
                    .map_err(CallError::from_reqwest)?;
                read_json(response).await
            })
            .await
            .map_err(|e| {
                Error::Config(format!(
                    "Could not resolve Pinecone index '{}': {}",
                    config.index_name, e
                ))
            })?;

        Ok(described.host)
    }

    async fn post<B, R>(&self, path: &str, label: &str, body: &B) -> std::result::Result<R, CallError>
    where
        B: Serialize + Sync,
        R: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let (http, url, api_key) = (&self.http, url.as_str(), self.api_key.as_str());

        self.retry
            .run(label, move || async move {
                let response = http
                    .post(url)
                    .header("Api-Key", api_key)
                    .header("X-Pinecone-API-Version", API_VERSION)
                    .json(body)
                    .send()
                    .await
                    .map_err(CallError::from_reqwest)?;
                read_json(response).await
            })
            .await
    }
}

/// Normalize a host into an https base URL without trailing slash
fn data_plane_url(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn upsert(&self, vectors: &[IndexedVector]) -> Result<()> {
        if vectors.is_empty() {
            return Ok(());
        }

        let request = UpsertRequest {
            vectors,
            namespace: self.namespace.as_deref(),
        };
        let response: UpsertResponse = self
            .post("/vectors/upsert", "pinecone upsert", &request)
            .await
            .map_err(|e| e.into_error(PROVIDER, "upsert", Error::IndexWriteFailed))?;

        if response.upserted_count != vectors.len() {
            tracing::warn!(
                "Pinecone reported {} upserted vectors, sent {}",
                response.upserted_count,
                vectors.len()
            );
        }
        Ok(())
    }

    async fn query(&self, query: &VectorQuery) -> Result<Vec<Match>> {
        let request = QueryRequest {
            vector: &query.vector,
            top_k: query.top_k,
            include_metadata: query.include_metadata,
            include_values: false,
            namespace: self.namespace.as_deref(),
        };
        let response: QueryResponse = self
            .post("/query", "pinecone query", &request)
            .await
            .map_err(|e| e.into_error(PROVIDER, "query", Error::QueryFailed))?;

        Ok(response
            .matches
            .into_iter()
            .map(|m| Match {
                id: m.id,
                score: m.score,
                metadata: m.metadata.unwrap_or_default(),
            })
            .collect())
    }
}
