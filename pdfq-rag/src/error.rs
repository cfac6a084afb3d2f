//! Error types for the `pdfq-rag` crate.

use thiserror::Error;

/// Errors that can occur while indexing or querying a document.
#[derive(Debug, Error)]
pub enum RagError {
    /// The PDF could not be read or its text could not be extracted.
    #[error("Extraction error ({source_name}): {message}")]
    ExtractionError {
        /// The file or upload name the bytes came from.
        source_name: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during document chunking.
    #[error("Chunking error: {0}")]
    ChunkingError(String),

    /// The external embedding service failed (network, credential, quota, bad response).
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A query was issued against an index that holds no chunks.
    #[error("the index is empty; no chunks have been indexed")]
    EmptyIndex,

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Reading a document from disk failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RagError {
    /// Whether this error came from the external embedding service.
    pub fn is_service_error(&self) -> bool {
        matches!(self, RagError::EmbeddingError { .. })
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
