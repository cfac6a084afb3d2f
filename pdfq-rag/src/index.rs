//! Embedding-aware index over the chunks of one document.
//!
//! [`DocumentIndex`] pairs an [`EmbeddingProvider`] with a [`VectorStore`]:
//! `build` embeds chunks and stores them, `query` embeds a query string and
//! looks up its nearest chunks.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::document::{Chunk, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::inmemory::InMemoryVectorStore;
use crate::vectorstore::VectorStore;

/// The searchable index for the current document.
#[derive(Clone)]
pub struct DocumentIndex {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
}

impl DocumentIndex {
    /// Create an index over an in-memory store with the default metric.
    pub fn new(embedding_provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self::with_store(embedding_provider, Arc::new(InMemoryVectorStore::new()))
    }

    /// Create an index over the given vector store.
    pub fn with_store(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Self {
        Self { embedding_provider, vector_store }
    }

    /// Embed every chunk and replace the index contents with them.
    ///
    /// Returns the number of chunks stored. Building from an empty `Vec`
    /// leaves an empty index that rejects queries with [`RagError::EmptyIndex`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingError`] if the provider fails, or if it
    /// returns a different number of vectors than chunks, or vectors whose
    /// length differs from its declared [`dimensions`]. On error the
    /// previous contents are already gone; the index is left empty.
    ///
    /// [`dimensions`]: EmbeddingProvider::dimensions
    pub async fn build(&self, mut chunks: Vec<Chunk>) -> Result<usize> {
        self.vector_store.clear().await?;
        if chunks.is_empty() {
            info!(chunk_count = 0, "built empty index");
            return Ok(0);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedding_provider.embed_batch(&texts).await.map_err(|e| {
            error!(chunk_count = chunks.len(), error = %e, "embedding failed during index build");
            e
        })?;

        if embeddings.len() != chunks.len() {
            return Err(RagError::EmbeddingError {
                provider: "index".to_string(),
                message: format!(
                    "expected {} embeddings, provider returned {}",
                    chunks.len(),
                    embeddings.len()
                ),
            });
        }

        for embedding in &embeddings {
            self.check_dimensions(embedding)?;
        }
        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = embedding;
        }

        let chunk_count = chunks.len();
        self.vector_store.replace(chunks).await?;
        info!(chunk_count, "built index");
        Ok(chunk_count)
    }

    /// Embed `text` and return the `k` closest chunks by ascending distance.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyIndex`] if nothing has been indexed; the
    /// embedding provider is not called in that case. Returns
    /// [`RagError::EmbeddingError`] if the query cannot be embedded or its
    /// vector has the wrong length.
    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<SearchResult>> {
        if self.vector_store.is_empty().await? {
            return Err(RagError::EmptyIndex);
        }

        let query_embedding = self.embedding_provider.embed_query(text).await.map_err(|e| {
            error!(error = %e, "embedding failed during query");
            e
        })?;
        self.check_dimensions(&query_embedding)?;

        let results = self.vector_store.search(&query_embedding, k).await?;
        debug!(query_len = text.len(), result_count = results.len(), "index query completed");
        Ok(results)
    }

    fn check_dimensions(&self, embedding: &[f32]) -> Result<()> {
        let expected = self.embedding_provider.dimensions();
        if embedding.len() == expected {
            return Ok(());
        }
        error!(expected, actual = embedding.len(), "embedding has unexpected dimensions");
        Err(RagError::EmbeddingError {
            provider: "index".to_string(),
            message: format!(
                "expected {expected}-dimensional embeddings, provider returned {}",
                embedding.len()
            ),
        })
    }

    /// Number of chunks currently indexed.
    pub async fn len(&self) -> Result<usize> {
        self.vector_store.len().await
    }

    /// Whether the index holds no chunks.
    pub async fn is_empty(&self) -> Result<bool> {
        self.vector_store.is_empty().await
    }

    /// Drop every indexed chunk.
    pub async fn clear(&self) -> Result<()> {
        self.vector_store.clear().await
    }
}
