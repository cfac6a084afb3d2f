//! Turns pipeline results and errors into the text shown to the user.

use pdfq_rag::{IndexSummary, PipelineState, RagError, SearchResult};

/// Shown when a query matches nothing because the document had no text.
pub const NO_RESULTS: &str = "No results found.";

/// Shown when a query is typed before any document is loaded.
pub const NO_DOCUMENT: &str = "No document loaded. Use `:load <path>` to upload a PDF first.";

/// One line (or short paragraph) per failure, never a backtrace.
pub fn render_error(err: &RagError) -> String {
    match err {
        RagError::ExtractionError { source_name, message } => {
            format!("Could not read '{source_name}' as a PDF: {message}")
        }
        RagError::ChunkingError(message) => {
            format!("Internal error while splitting the document: {message}")
        }
        RagError::EmbeddingError { provider, message } => format!(
            "The {provider} embedding service failed: {message}. \
             Check your API key and connection, then try again."
        ),
        RagError::EmptyIndex => NO_RESULTS.to_string(),
        RagError::VectorStoreError { .. } => format!("An error occurred: {err}"),
        RagError::ConfigError(message) => format!("Invalid configuration: {message}"),
        RagError::Io(e) => format!("Could not read the file: {e}"),
    }
}

pub fn render_summary(summary: &IndexSummary) -> String {
    if summary.chunk_count == 0 {
        return format!(
            "PDF uploaded, but no text could be extracted from '{}'. Queries will find nothing.",
            summary.source
        );
    }
    format!(
        "PDF uploaded successfully! Indexed {} chunk{} from {} page{} of '{}'.",
        summary.chunk_count,
        plural(summary.chunk_count),
        summary.document_count,
        plural(summary.document_count),
        summary.source
    )
}

pub fn render_answer(result: &SearchResult) -> String {
    let location = match result.chunk.metadata.get("page") {
        Some(page) => format!("page {page}, "),
        None => String::new(),
    };
    format!(
        "Top result ({location}distance {:.4}):\n{}",
        result.distance,
        result.chunk.text.trim()
    )
}

pub fn render_state(state: &PipelineState) -> String {
    match state {
        PipelineState::Idle => "No document loaded.".to_string(),
        PipelineState::Indexed(summary) => format!(
            "Loaded '{}': {} page{}, {} chunk{}.",
            summary.source,
            summary.document_count,
            plural(summary.document_count),
            summary.chunk_count,
            plural(summary.chunk_count)
        ),
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}
