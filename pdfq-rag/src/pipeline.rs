//! Retrieval pipeline orchestrator.
//!
//! The [`RagPipeline`] runs the upload workflow (extract → chunk → embed →
//! index) and the query workflow (embed → nearest chunk) for one session.
//!
//! # Example
//!
//! ```rust,ignore
//! use pdfq_rag::{RagPipeline, RagConfig};
//!
//! let mut pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .build()?;
//!
//! pipeline.load_pdf("report.pdf").await?;
//! if let Some(best) = pipeline.query("what was the revenue?").await? {
//!     println!("{}", best.chunk.text);
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::chunking::Chunker;
use crate::config::RagConfig;
use crate::document::{Chunk, Document, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::extract::{PdfExtractor, source_name_for};
use crate::index::DocumentIndex;
use crate::inmemory::InMemoryVectorStore;
use crate::vectorstore::VectorStore;

/// What was indexed by the last successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexSummary {
    /// File or upload name of the document.
    pub source: String,
    /// Number of non-empty pages (or text documents) that were chunked.
    pub document_count: usize,
    /// Number of chunks in the index.
    pub chunk_count: usize,
}

/// Lifecycle of a pipeline session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum PipelineState {
    /// No document is loaded; queries are no-ops.
    Idle,
    /// A document has been chunked, embedded and indexed.
    Indexed(IndexSummary),
}

/// The retrieval pipeline for a single session.
///
/// Uploading a document always starts by discarding the current index, so a
/// failed upload leaves the pipeline [`Idle`](PipelineState::Idle) rather
/// than with a half-built or stale index. Construct one via
/// [`RagPipeline::builder()`].
pub struct RagPipeline {
    config: RagConfig,
    chunker: Arc<dyn Chunker>,
    index: DocumentIndex,
    extractor: PdfExtractor,
    state: PipelineState,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the document index.
    pub fn index(&self) -> &DocumentIndex {
        &self.index
    }

    /// The current lifecycle state.
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Whether a document is indexed and queries will be answered.
    pub fn is_indexed(&self) -> bool {
        matches!(self.state, PipelineState::Indexed(_))
    }

    /// Discard the current document and index and return to idle.
    ///
    /// # Errors
    ///
    /// Returns an error if the vector store cannot be cleared.
    pub async fn reset(&mut self) -> Result<()> {
        if let PipelineState::Indexed(summary) = &self.state {
            debug!(source = %summary.source, "discarding index");
        }
        self.state = PipelineState::Idle;
        self.index.clear().await
    }

    /// Read a PDF from disk and index it, replacing any previous document.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Io`] if the file cannot be read, otherwise as
    /// [`upload_pdf`](RagPipeline::upload_pdf).
    pub async fn load_pdf(&mut self, path: impl AsRef<Path>) -> Result<IndexSummary> {
        let path = path.as_ref().to_path_buf();
        let source_name = source_name_for(&path);
        self.extract_and_index(&source_name, move |extractor| extractor.extract_file(&path))
            .await
    }

    /// Index an uploaded PDF, replacing any previous document.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ExtractionError`] for unreadable PDFs and
    /// [`RagError::EmbeddingError`] if the embedding service fails. The
    /// pipeline is idle afterwards in either case.
    pub async fn upload_pdf(&mut self, bytes: Vec<u8>, source_name: &str) -> Result<IndexSummary> {
        let name = source_name.to_string();
        self.extract_and_index(source_name, move |extractor| extractor.extract(&bytes, &name))
            .await
    }

    async fn extract_and_index<F>(&mut self, source_name: &str, extract: F) -> Result<IndexSummary>
    where
        F: FnOnce(PdfExtractor) -> Result<Vec<Document>> + Send + 'static,
    {
        self.reset().await?;

        let extractor = self.extractor;
        let documents = tokio::task::spawn_blocking(move || extract(extractor))
            .await
            .map_err(|e| RagError::ExtractionError {
                source_name: source_name.to_string(),
                message: format!("extraction task failed: {e}"),
            })?
            .map_err(|e| {
                error!(source = source_name, error = %e, "PDF upload failed");
                e
            })?;

        self.index_documents(source_name, documents).await
    }

    /// Index plain text as a single document, replacing any previous document.
    ///
    /// # Errors
    ///
    /// As [`index_documents`](RagPipeline::index_documents).
    pub async fn index_text(&mut self, source: &str, text: &str) -> Result<IndexSummary> {
        self.index_documents(source, vec![Document::new(source, text)]).await
    }

    /// Chunk, embed and index `documents` as one upload named `source`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingError`] if the embedding service fails.
    /// The pipeline is idle afterwards.
    pub async fn index_documents(
        &mut self,
        source: &str,
        documents: Vec<Document>,
    ) -> Result<IndexSummary> {
        self.reset().await?;

        let chunks = self.chunk_documents(&documents)?;
        let chunk_count = self.index.build(chunks).await.map_err(|e| {
            error!(source, error = %e, "index build failed");
            e
        })?;

        let summary = IndexSummary {
            source: source.to_string(),
            document_count: documents.len(),
            chunk_count,
        };
        info!(source, document_count = summary.document_count, chunk_count, "document indexed");
        self.state = PipelineState::Indexed(summary.clone());
        Ok(summary)
    }

    fn chunk_documents(&self, documents: &[Document]) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::new();
        for document in documents {
            let document_chunks = self.chunker.chunk(document);
            if document_chunks.is_empty() && !document.text.trim().is_empty() {
                return Err(RagError::ChunkingError(format!(
                    "no chunks produced for non-empty document '{}'",
                    document.id
                )));
            }
            chunks.extend(document_chunks);
        }
        Ok(chunks)
    }

    /// Return the chunk closest to `text`.
    ///
    /// Returns `Ok(None)` without doing anything while the pipeline is idle.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyIndex`] if the indexed document had no text
    /// and [`RagError::EmbeddingError`] if the query cannot be embedded.
    pub async fn query(&self, text: &str) -> Result<Option<SearchResult>> {
        if !self.is_indexed() {
            debug!("query ignored: no document indexed");
            return Ok(None);
        }
        let results = self.index.query(text, 1).await?;
        Ok(results.into_iter().next())
    }

    /// Return up to `top_k` (from the configuration) closest chunks, nearest first.
    ///
    /// Returns an empty `Vec` while the pipeline is idle.
    ///
    /// # Errors
    ///
    /// As [`query`](RagPipeline::query).
    pub async fn search(&self, text: &str) -> Result<Vec<SearchResult>> {
        if !self.is_indexed() {
            debug!("search ignored: no document indexed");
            return Ok(Vec::new());
        }
        self.index.query(text, self.config.top_k).await
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// `config` and `embedding_provider` are required. The vector store defaults
/// to an [`InMemoryVectorStore`] using the configured metric, and the chunker
/// to the configured [`ChunkingStrategy`](crate::ChunkingStrategy).
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = RagPipeline::builder()
///     .config(RagConfig::default())
///     .embedding_provider(Arc::new(embedder))
///     .chunker(Arc::new(RecursiveChunker::new(1000, 250)))  // optional
///     .build()?;
/// ```
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Override the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Override the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`RagPipeline`], validating the configuration and that all
    /// required fields are set. The pipeline starts idle.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a required field is missing or the
    /// configuration is invalid.
    pub fn build(self) -> Result<RagPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::ConfigError("config is required".to_string()))?;
        config.validate()?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .unwrap_or_else(|| Arc::new(InMemoryVectorStore::with_metric(config.metric)));
        let chunker = self
            .chunker
            .unwrap_or_else(|| config.chunking.build(config.chunk_size, config.chunk_overlap));

        Ok(RagPipeline {
            index: DocumentIndex::with_store(embedding_provider, vector_store),
            chunker,
            config,
            extractor: PdfExtractor::new(),
            state: PipelineState::Idle,
        })
    }
}
