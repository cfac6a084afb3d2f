//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use pdfq_rag::gemini::{DEFAULT_BASE_URL, DEFAULT_DIMENSIONS, DEFAULT_MODEL, GeminiConfig};
use pdfq_rag::{ChunkingStrategy, DistanceMetric, RagConfig};

/// Ask questions of a PDF: every answer is the passage closest in meaning to the question.
#[derive(Debug, Parser)]
#[command(name = "pdfq", version, about)]
pub struct Cli {
    /// PDF to load at start-up (more can be loaded later with `:load`)
    pub pdf: Option<PathBuf>,

    /// Run a single query against PDF and exit instead of starting the prompt
    #[arg(short, long, requires = "pdf")]
    pub query: Option<String>,

    /// Maximum chunk length in characters
    #[arg(long, default_value_t = 1000)]
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks
    #[arg(long, default_value_t = 250)]
    pub chunk_overlap: usize,

    /// How document text is split into chunks
    #[arg(long, value_enum, default_value_t = ChunkerArg::Fixed)]
    pub chunker: ChunkerArg,

    /// Distance used to rank chunks
    #[arg(long, value_enum, default_value_t = MetricArg::Euclidean)]
    pub metric: MetricArg,

    /// Gemini embedding model
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Embedding size; values other than the model default are requested from the API
    #[arg(long, default_value_t = DEFAULT_DIMENSIONS)]
    pub dimensions: usize,

    /// Gemini API key
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Generative Language API base URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Log filter, e.g. `info` or `pdfq_rag=debug`
    #[arg(long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChunkerArg {
    /// Fixed-size windows with exact overlap
    Fixed,
    /// Paragraph, line, then word boundaries
    Recursive,
}

impl From<ChunkerArg> for ChunkingStrategy {
    fn from(arg: ChunkerArg) -> Self {
        match arg {
            ChunkerArg::Fixed => ChunkingStrategy::Fixed,
            ChunkerArg::Recursive => ChunkingStrategy::Recursive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MetricArg {
    /// Euclidean (L2) distance
    Euclidean,
    /// One minus cosine similarity
    Cosine,
}

impl From<MetricArg> for DistanceMetric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Euclidean => DistanceMetric::Euclidean,
            MetricArg::Cosine => DistanceMetric::Cosine,
        }
    }
}

impl Cli {
    /// The validated pipeline configuration described by the arguments.
    pub fn rag_config(&self) -> pdfq_rag::Result<RagConfig> {
        RagConfig::builder()
            .chunk_size(self.chunk_size)
            .chunk_overlap(self.chunk_overlap)
            .chunking(self.chunker.into())
            .metric(self.metric.into())
            .build()
    }

    /// The embedding client configuration. The API key may be absent; that
    /// is reported when the first document is embedded.
    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.api_key.clone().filter(|key| !key.trim().is_empty()),
            ..GeminiConfig::default()
        }
        .with_model(self.model.clone())
        .with_base_url(self.base_url.clone())
        .with_dimensions(self.dimensions)
    }
}
