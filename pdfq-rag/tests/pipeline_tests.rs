//! Tests for the upload/query lifecycle of [`RagPipeline`].

mod common;

use std::sync::Arc;

use common::{FailingEmbedder, KeywordEmbedder, MisdeclaredEmbedder};
use pdfq_rag::{
    ChunkingStrategy, Document, EmbeddingProvider, IndexSummary, PipelineState, RagConfig,
    RagError, RagPipeline,
};

fn pipeline_with(config: RagConfig, embedder: Arc<dyn EmbeddingProvider>) -> RagPipeline {
    RagPipeline::builder().config(config).embedding_provider(embedder).build().unwrap()
}

fn keyword_pipeline() -> RagPipeline {
    pipeline_with(RagConfig::default(), Arc::new(KeywordEmbedder::new()))
}

#[tokio::test]
async fn new_pipeline_is_idle_and_ignores_queries() {
    let pipeline = keyword_pipeline();
    assert_eq!(pipeline.state(), &PipelineState::Idle);
    assert!(pipeline.query("anything").await.unwrap().is_none());
    assert!(pipeline.search("anything").await.unwrap().is_empty());
}

#[tokio::test]
async fn idle_query_does_not_call_embedder() {
    let embedder = Arc::new(KeywordEmbedder::new());
    let pipeline = pipeline_with(RagConfig::default(), embedder.clone());
    pipeline.query("anything").await.unwrap();
    assert_eq!(embedder.calls(), 0);
}

#[tokio::test]
async fn indexing_text_moves_to_indexed() {
    let config = RagConfig::builder().chunk_size(4).chunk_overlap(2).build().unwrap();
    let mut pipeline = pipeline_with(config, Arc::new(KeywordEmbedder::new()));

    let summary = pipeline.index_text("letters", "ABCDEFGHIJ").await.unwrap();
    assert_eq!(
        summary,
        IndexSummary { source: "letters".to_string(), document_count: 1, chunk_count: 4 }
    );
    assert_eq!(pipeline.state(), &PipelineState::Indexed(summary));
    assert!(pipeline.is_indexed());
}

#[tokio::test]
async fn query_returns_best_chunk() {
    let mut pipeline = keyword_pipeline();
    let documents = vec![
        Document::new("facts_p1", "cats are mammals"),
        Document::new("facts_p2", "rockets use fuel"),
    ];
    let summary = pipeline.index_documents("facts.pdf", documents).await.unwrap();
    assert_eq!(summary.document_count, 2);
    assert_eq!(summary.chunk_count, 2);

    let best = pipeline.query("space travel").await.unwrap().unwrap();
    assert_eq!(best.chunk.text, "rockets use fuel");
    assert_eq!(best.chunk.document_id, "facts_p2");
}

#[tokio::test]
async fn search_returns_configured_number_of_results() {
    let config = RagConfig::builder().top_k(2).build().unwrap();
    let mut pipeline = pipeline_with(config, Arc::new(KeywordEmbedder::new()));
    let documents = vec![
        Document::new("a", "cats are mammals"),
        Document::new("b", "rockets use fuel"),
        Document::new("c", "dogs have fur"),
    ];
    pipeline.index_documents("mixed", documents).await.unwrap();

    let results = pipeline.search("cats").await.unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[0].distance <= results[1].distance);
    assert_ne!(results[0].chunk.text, "rockets use fuel");
}

#[tokio::test]
async fn new_upload_replaces_previous_document() {
    let mut pipeline = keyword_pipeline();
    pipeline.index_text("first", "cats are mammals").await.unwrap();
    pipeline.index_text("second", "rockets use fuel").await.unwrap();

    let best = pipeline.query("cats").await.unwrap().unwrap();
    assert_eq!(best.chunk.text, "rockets use fuel");
    assert_eq!(pipeline.index().len().await.unwrap(), 1);
    match pipeline.state() {
        PipelineState::Indexed(summary) => assert_eq!(summary.source, "second"),
        PipelineState::Idle => panic!("expected indexed state"),
    }
}

#[tokio::test]
async fn failed_extraction_leaves_pipeline_idle() {
    let mut pipeline = keyword_pipeline();
    pipeline.index_text("first", "cats are mammals").await.unwrap();

    let err = pipeline.upload_pdf(b"%PDF-garbage".to_vec(), "broken.pdf").await.unwrap_err();
    assert!(matches!(err, RagError::ExtractionError { .. }));
    assert_eq!(pipeline.state(), &PipelineState::Idle);
    assert!(pipeline.index().is_empty().await.unwrap());
    assert!(pipeline.query("cats").await.unwrap().is_none());
}

#[tokio::test]
async fn failed_embedding_leaves_pipeline_idle() {
    let mut pipeline = pipeline_with(RagConfig::default(), Arc::new(FailingEmbedder));
    let err = pipeline.index_text("doc", "rockets use fuel").await.unwrap_err();
    assert!(err.is_service_error());
    assert_eq!(pipeline.state(), &PipelineState::Idle);
}

#[tokio::test]
async fn dimension_mismatch_leaves_pipeline_idle() {
    let embedder = Arc::new(MisdeclaredEmbedder { declared: 256 });
    let mut pipeline = pipeline_with(RagConfig::default(), embedder);
    let err = pipeline.index_text("doc", "rockets use fuel").await.unwrap_err();
    assert!(err.is_service_error());
    assert_eq!(pipeline.state(), &PipelineState::Idle);
    assert!(pipeline.query("rockets").await.unwrap().is_none());
}

#[tokio::test]
async fn missing_file_is_io_error_and_idle() {
    let mut pipeline = keyword_pipeline();
    pipeline.index_text("first", "cats are mammals").await.unwrap();

    let err = pipeline.load_pdf("/definitely/not/here.pdf").await.unwrap_err();
    assert!(matches!(err, RagError::Io(_)));
    assert_eq!(pipeline.state(), &PipelineState::Idle);
}

#[tokio::test]
async fn document_without_text_is_indexed_but_empty() {
    let mut pipeline = keyword_pipeline();
    let summary = pipeline.index_documents("scan.pdf", Vec::new()).await.unwrap();
    assert_eq!(summary.chunk_count, 0);
    assert!(pipeline.is_indexed());

    let err = pipeline.query("anything").await.unwrap_err();
    assert!(matches!(err, RagError::EmptyIndex));
}

#[tokio::test]
async fn reset_returns_to_idle() {
    let mut pipeline = keyword_pipeline();
    pipeline.index_text("doc", "rockets use fuel").await.unwrap();
    pipeline.reset().await.unwrap();
    assert_eq!(pipeline.state(), &PipelineState::Idle);
    assert!(pipeline.index().is_empty().await.unwrap());
}

#[tokio::test]
async fn recursive_strategy_is_used_when_configured() {
    let config = RagConfig::builder()
        .chunk_size(20)
        .chunk_overlap(0)
        .chunking(ChunkingStrategy::Recursive)
        .build()
        .unwrap();
    let mut pipeline = pipeline_with(config, Arc::new(KeywordEmbedder::new()));
    let summary =
        pipeline.index_text("doc", "First paragraph.\n\nSecond paragraph.").await.unwrap();
    assert_eq!(summary.chunk_count, 2);
}

#[test]
fn builder_requires_provider_and_valid_config() {
    let missing = RagPipeline::builder().config(RagConfig::default()).build();
    assert!(matches!(missing, Err(RagError::ConfigError(_))));

    let invalid = RagConfig { chunk_size: 10, chunk_overlap: 10, ..RagConfig::default() };
    let result = RagPipeline::builder()
        .config(invalid)
        .embedding_provider(Arc::new(KeywordEmbedder::new()))
        .build();
    assert!(matches!(result, Err(RagError::ConfigError(_))));
}
