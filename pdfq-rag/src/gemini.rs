//! Gemini embedding provider calling the Generative Language REST API.
//!
//! This module is only available when the `gemini` feature is enabled.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

const PROVIDER: &str = "Gemini";

/// The default Generative Language API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";

/// The default embedding model.
pub const DEFAULT_MODEL: &str = "models/embedding-001";

/// The dimensionality of `embedding-001` vectors.
pub const DEFAULT_DIMENSIONS: usize = 768;

/// The environment variable holding the API key.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// `batchEmbedContents` accepts at most this many requests per call.
const MAX_BATCH_SIZE: usize = 100;

/// Client configuration for [`GeminiEmbeddingProvider`].
///
/// Built once at start-up and moved into the provider; there is no way to
/// change it afterwards. A missing API key is not an error here: it is
/// reported by the first embedding call.
#[derive(Clone, PartialEq)]
pub struct GeminiConfig {
    /// API key sent in the `x-goog-api-key` header.
    pub api_key: Option<String>,
    /// Model resource name, e.g. `models/embedding-001`.
    pub model: String,
    /// API base URL, ending in `/`.
    pub base_url: String,
    /// Dimensionality of the vectors the model returns. Anything other than
    /// [`DEFAULT_DIMENSIONS`] is sent as `outputDimensionality`.
    pub dimensions: usize,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            dimensions: DEFAULT_DIMENSIONS,
        }
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

impl GeminiConfig {
    /// Configuration with the given API key and default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { api_key: Some(api_key.into()), ..Self::default() }
    }

    /// Configuration reading the API key from `GOOGLE_API_KEY`.
    pub fn from_env() -> Self {
        Self { api_key: std::env::var(API_KEY_ENV).ok(), ..Self::default() }
    }

    /// Set the embedding model. A bare name such as `text-embedding-004`
    /// gets the `models/` prefix.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = normalize_model(model.into());
        self
    }

    /// Set the API base URL (useful for proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }

    /// Set the dimensionality requested from the model.
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }
}

fn normalize_model(model: String) -> String {
    if model.starts_with("models/") { model } else { format!("models/{model}") }
}

/// Whether an embedding is used for stored documents or for search queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    /// Text that will be stored and searched.
    RetrievalDocument,
    /// Text used to search stored documents.
    RetrievalQuery,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
    model: &'a str,
    content: Content<'a>,
    task_type: TaskType,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_dimensionality: Option<usize>,
}

impl<'a> EmbedContentRequest<'a> {
    fn new(model: &'a str, text: &'a str, task_type: TaskType) -> Self {
        Self {
            model,
            content: Content { parts: [Part { text }] },
            task_type,
            output_dimensionality: None,
        }
    }

    fn with_output_dimensionality(mut self, dimensions: Option<usize>) -> Self {
        self.output_dimensionality = dimensions;
        self
    }
}

#[derive(Debug, Serialize)]
struct BatchEmbedContentsRequest<'a> {
    requests: Vec<EmbedContentRequest<'a>>,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedContentsResponse {
    #[serde(default)]
    embeddings: Vec<ContentEmbedding>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Turn an error response body into a readable message, falling back to the raw body.
fn describe_api_error(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => match parsed.error.status {
            Some(kind) => format!("HTTP {status} {kind}: {}", parsed.error.message),
            None => format!("HTTP {status}: {}", parsed.error.message),
        },
        Err(_) if body.trim().is_empty() => format!("HTTP {status}"),
        Err(_) => format!("HTTP {status}: {}", body.trim()),
    }
}

fn service_error(message: impl Into<String>) -> RagError {
    RagError::EmbeddingError { provider: PROVIDER.into(), message: message.into() }
}

/// An [`EmbeddingProvider`] backed by the Gemini embedding API.
///
/// Chunks are embedded with [`TaskType::RetrievalDocument`] and queries with
/// [`TaskType::RetrievalQuery`]. Failures are never retried.
///
/// # Example
///
/// ```rust,ignore
/// use pdfq_rag::gemini::{GeminiConfig, GeminiEmbeddingProvider};
///
/// let provider = GeminiEmbeddingProvider::new(GeminiConfig::from_env());
/// let embedding = provider.embed("hello world").await?;
/// ```
pub struct GeminiEmbeddingProvider {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiEmbeddingProvider {
    /// Create a provider from its configuration.
    pub fn new(config: GeminiConfig) -> Self {
        Self { client: reqwest::Client::new(), config }
    }

    /// Create a provider that reuses an existing HTTP client, e.g. one with
    /// custom timeouts or proxy settings.
    pub fn with_client(client: reqwest::Client, config: GeminiConfig) -> Self {
        Self { client, config }
    }

    /// The configuration this provider was built with.
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn api_key(&self) -> Result<&str> {
        match self.config.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(service_error(format!("{API_KEY_ENV} is not set"))),
        }
    }

    fn request<'a>(&'a self, text: &'a str, task_type: TaskType) -> EmbedContentRequest<'a> {
        let dimensions = self.config.dimensions;
        EmbedContentRequest::new(&self.config.model, text, task_type)
            .with_output_dimensionality((dimensions != DEFAULT_DIMENSIONS).then_some(dimensions))
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}{}:{method}", self.config.base_url, self.config.model)
    }

    async fn post<B, R>(&self, method: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let api_key = self.api_key()?;
        let url = self.endpoint(method);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, url = %url, error = %e, "embedding request failed");
                service_error(format!("request to {url} failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = describe_api_error(status, &body);
            error!(provider = PROVIDER, %status, "embedding request rejected");
            return Err(service_error(message));
        }

        response.json::<R>().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to decode embedding response");
            service_error(format!("failed to decode response: {e}"))
        })
    }

    async fn embed_with_task(&self, text: &str, task_type: TaskType) -> Result<Vec<f32>> {
        debug!(provider = PROVIDER, text_len = text.len(), ?task_type, "embedding single text");
        let request = self.request(text, task_type);
        let response: EmbedContentResponse = self.post("embedContent", &request).await?;
        Ok(response.embedding.values)
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_with_task(text, TaskType::RetrievalDocument).await
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_with_task(text, TaskType::RetrievalQuery).await
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(MAX_BATCH_SIZE) {
            debug!(provider = PROVIDER, batch_size = batch.len(), "embedding batch");
            let request = BatchEmbedContentsRequest {
                requests: batch
                    .iter()
                    .map(|text| self.request(text, TaskType::RetrievalDocument))
                    .collect(),
            };
            let response: BatchEmbedContentsResponse =
                self.post("batchEmbedContents", &request).await?;

            if response.embeddings.len() != batch.len() {
                return Err(service_error(format!(
                    "requested {} embeddings, received {}",
                    batch.len(),
                    response.embeddings.len()
                )));
            }
            embeddings.extend(response.embeddings.into_iter().map(|e| e.values));
        }

        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }
}
