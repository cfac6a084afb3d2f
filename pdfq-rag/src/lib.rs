//! # pdfq-rag
//!
//! Retrieval over a single uploaded PDF: extract its text, split it into
//! overlapping chunks, embed the chunks with an external model and answer
//! queries with the nearest chunk.
//!
//! ## Overview
//!
//! - [`PdfExtractor`] turns PDF bytes into one [`Document`] per page
//! - [`Chunker`] implementations ([`FixedSizeChunker`], [`RecursiveChunker`])
//!   split documents into [`Chunk`]s
//! - [`EmbeddingProvider`] maps text to vectors; the `gemini` feature (on by
//!   default) provides [`gemini::GeminiEmbeddingProvider`]
//! - [`VectorStore`] / [`InMemoryVectorStore`] hold embedded chunks
//! - [`DocumentIndex`] embeds chunks on build and queries on lookup
//! - [`RagPipeline`] runs the whole upload and query workflow
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pdfq_rag::gemini::{GeminiConfig, GeminiEmbeddingProvider};
//! use pdfq_rag::{RagConfig, RagPipeline};
//!
//! let embedder = GeminiEmbeddingProvider::new(GeminiConfig::from_env());
//! let mut pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(embedder))
//!     .build()?;
//!
//! pipeline.load_pdf("manual.pdf").await?;
//! let best = pipeline.query("how do I reset the device?").await?;
//! ```

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod index;
pub mod inmemory;
pub mod pipeline;
pub mod vectorstore;

#[cfg(feature = "gemini")]
pub mod gemini;

pub use chunking::{Chunker, ChunkingStrategy, FixedSizeChunker, RecursiveChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Chunk, Document, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use extract::PdfExtractor;
pub use index::DocumentIndex;
pub use inmemory::{DistanceMetric, InMemoryVectorStore};
pub use pipeline::{IndexSummary, PipelineState, RagPipeline, RagPipelineBuilder};
pub use vectorstore::VectorStore;
