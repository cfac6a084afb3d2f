//! Deterministic embedding providers shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use pdfq_rag::{EmbeddingProvider, RagError};

const SPACE_WORDS: &[&str] =
    &["space", "travel", "rocket", "rockets", "fuel", "orbit", "launch", "planet"];
const ANIMAL_WORDS: &[&str] = &["cat", "cats", "mammal", "mammals", "dog", "dogs", "fur"];

/// Embeds text by counting words per topic.
///
/// Dimensions: `[space, animals, other words, bias]`. The bias component keeps
/// every vector non-zero. Vectors are L2-normalized.
#[derive(Debug, Default)]
pub struct KeywordEmbedder {
    calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of texts embedded so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32, 0.0, 0.0, 0.1];
        for word in text.split_whitespace() {
            let word = word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
            if SPACE_WORDS.contains(&word.as_str()) {
                v[0] += 1.0;
            } else if ANIMAL_WORDS.contains(&word.as_str()) {
                v[1] += 1.0;
            } else if !word.is_empty() {
                v[2] += 0.5;
            }
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        v.iter().map(|x| x / norm).collect()
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> pdfq_rag::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::vector(text))
    }

    fn dimensions(&self) -> usize {
        4
    }
}

/// Fails every call, like an embedding service with a revoked key.
#[derive(Debug, Default)]
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> pdfq_rag::Result<Vec<f32>> {
        Err(RagError::EmbeddingError {
            provider: "test".to_string(),
            message: "quota exceeded".to_string(),
        })
    }

    fn dimensions(&self) -> usize {
        4
    }
}

/// Returns one vector fewer than requested from `embed_batch`.
#[derive(Debug, Default)]
pub struct ShortBatchEmbedder;

#[async_trait]
impl EmbeddingProvider for ShortBatchEmbedder {
    async fn embed(&self, text: &str) -> pdfq_rag::Result<Vec<f32>> {
        Ok(KeywordEmbedder::vector(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> pdfq_rag::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().skip(1).map(|t| KeywordEmbedder::vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        4
    }
}

/// Returns keyword vectors but declares a different dimensionality.
#[derive(Debug)]
pub struct MisdeclaredEmbedder {
    pub declared: usize,
}

#[async_trait]
impl EmbeddingProvider for MisdeclaredEmbedder {
    async fn embed(&self, text: &str) -> pdfq_rag::Result<Vec<f32>> {
        Ok(KeywordEmbedder::vector(text))
    }

    fn dimensions(&self) -> usize {
        self.declared
    }
}

/// Embeds documents correctly but pads query vectors with an extra component.
#[derive(Debug, Default)]
pub struct PaddedQueryEmbedder;

#[async_trait]
impl EmbeddingProvider for PaddedQueryEmbedder {
    async fn embed(&self, text: &str) -> pdfq_rag::Result<Vec<f32>> {
        Ok(KeywordEmbedder::vector(text))
    }

    async fn embed_query(&self, text: &str) -> pdfq_rag::Result<Vec<f32>> {
        let mut vector = KeywordEmbedder::vector(text);
        vector.push(0.0);
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        4
    }
}
