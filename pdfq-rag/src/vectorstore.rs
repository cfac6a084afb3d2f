//! Vector store trait for storing and searching vector embeddings.

use async_trait::async_trait;

use crate::document::{Chunk, SearchResult};
use crate::error::Result;

/// A storage backend for embedded chunks with nearest-neighbor search.
///
/// A store holds the chunks of exactly one document at a time: every
/// [`replace`](VectorStore::replace) discards what was stored before.
///
/// # Example
///
/// ```rust,ignore
/// use pdfq_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.replace(chunks).await?;
/// let results = store.search(&query_embedding, 1).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Replace the stored chunks. Chunks must have embeddings set.
    async fn replace(&self, chunks: Vec<Chunk>) -> Result<()>;

    /// Remove every stored chunk.
    async fn clear(&self) -> Result<()>;

    /// Number of stored chunks.
    async fn len(&self) -> Result<usize>;

    /// Whether the store holds no chunks.
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Search for the `top_k` chunks closest to the given embedding.
    ///
    /// Returns results ordered by ascending distance; chunks at equal distance
    /// keep the order in which they were stored. An empty store yields an
    /// empty `Vec`.
    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>>;
}
