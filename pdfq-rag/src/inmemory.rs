//! In-memory vector store with exact (brute-force) nearest-neighbor search.
//!
//! This module provides [`InMemoryVectorStore`], a vector store backed by a
//! `Vec` protected by a `tokio::sync::RwLock`. Every search scans all stored
//! chunks, which is plenty for the few thousand chunks a single PDF yields.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

const BACKEND: &str = "InMemory";

/// How the distance between two embeddings is measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Euclidean (L2) distance.
    #[default]
    Euclidean,
    /// `1 - cosine similarity`, in `[0, 2]`.
    Cosine,
}

impl DistanceMetric {
    /// Distance between two vectors of equal length. Never negative.
    pub fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            DistanceMetric::Euclidean => euclidean_distance(a, b),
            DistanceMetric::Cosine => (1.0 - cosine_similarity(a, b)).max(0.0),
        }
    }
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum::<f32>().sqrt()
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// An in-memory vector store using exact search.
///
/// Chunks are kept in insertion order so that ties in distance resolve to
/// the chunk that appeared first in the document.
///
/// # Example
///
/// ```rust,ignore
/// use pdfq_rag::{DistanceMetric, InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::with_metric(DistanceMetric::Cosine);
/// store.replace(chunks).await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    metric: DistanceMetric,
    chunks: RwLock<Vec<Chunk>>,
}

impl InMemoryVectorStore {
    /// Create a new empty store using Euclidean distance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty store using the given distance metric.
    pub fn with_metric(metric: DistanceMetric) -> Self {
        Self { metric, chunks: RwLock::new(Vec::new()) }
    }
}

fn store_error(message: String) -> RagError {
    RagError::VectorStoreError { backend: BACKEND.to_string(), message }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn replace(&self, chunks: Vec<Chunk>) -> Result<()> {
        if let Some(first) = chunks.first() {
            let dimensions = first.embedding.len();
            if dimensions == 0 {
                return Err(store_error(format!("chunk '{}' has no embedding", first.id)));
            }
            if let Some(bad) = chunks.iter().find(|c| c.embedding.len() != dimensions) {
                return Err(store_error(format!(
                    "chunk '{}' has {} dimensions, expected {dimensions}",
                    bad.id,
                    bad.embedding.len()
                )));
            }
        }

        debug!(backend = BACKEND, chunk_count = chunks.len(), "replacing stored chunks");
        *self.chunks.write().await = chunks;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.chunks.write().await.clear();
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.chunks.read().await.len())
    }

    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        let chunks = self.chunks.read().await;
        let Some(first) = chunks.first() else {
            return Ok(Vec::new());
        };
        if first.embedding.len() != embedding.len() {
            return Err(store_error(format!(
                "query has {} dimensions, stored chunks have {}",
                embedding.len(),
                first.embedding.len()
            )));
        }

        let mut scored: Vec<SearchResult> = chunks
            .iter()
            .map(|chunk| SearchResult {
                chunk: chunk.clone(),
                distance: self.metric.distance(&chunk.embedding, embedding),
            })
            .collect();

        // Stable sort: equal distances keep insertion order.
        scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        scored.truncate(top_k);
        Ok(scored)
    }
}
