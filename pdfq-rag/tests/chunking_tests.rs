//! Tests for the fixed-size and recursive chunkers.

use std::collections::HashMap;

use pdfq_rag::chunking::{Chunker, ChunkingStrategy, FixedSizeChunker, RecursiveChunker};
use pdfq_rag::Document;
use proptest::prelude::*;

fn texts(chunker: &dyn Chunker, text: &str) -> Vec<String> {
    chunker.chunk(&Document::new("doc", text)).into_iter().map(|c| c.text).collect()
}

#[test]
fn fixed_chunks_with_overlap_stop_at_end_of_text() {
    let chunks = texts(&FixedSizeChunker::new(4, 2), "ABCDEFGHIJ");
    assert_eq!(chunks, vec!["ABCD", "CDEF", "EFGH", "GHIJ"]);
}

#[test]
fn short_text_is_a_single_chunk() {
    let chunks = texts(&FixedSizeChunker::new(1000, 250), "short");
    assert_eq!(chunks, vec!["short"]);
}

#[test]
fn final_chunk_may_be_shorter() {
    let chunks = texts(&FixedSizeChunker::new(4, 1), "ABCDEFGHI");
    assert_eq!(chunks, vec!["ABCD", "DEFG", "GHI"]);
}

#[test]
fn empty_text_produces_no_chunks() {
    assert!(texts(&FixedSizeChunker::new(10, 2), "").is_empty());
    assert!(texts(&RecursiveChunker::new(10, 2), "").is_empty());
    assert!(texts(&RecursiveChunker::new(10, 2), " \n\n ").is_empty());
}

#[test]
fn chunks_carry_ids_and_metadata() {
    let document = Document {
        id: "report_p3".to_string(),
        text: "ABCDEFGHIJ".to_string(),
        metadata: HashMap::from([("page".to_string(), "3".to_string())]),
        source_uri: None,
    };
    let chunks = FixedSizeChunker::new(4, 2).chunk(&document);

    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.id, format!("report_p3_{i}"));
        assert_eq!(chunk.document_id, "report_p3");
        assert_eq!(chunk.metadata["page"], "3");
        assert_eq!(chunk.metadata["chunk_index"], i.to_string());
        assert!(chunk.embedding.is_empty());
    }
}

#[test]
fn recursive_chunker_prefers_paragraph_boundaries() {
    let text = "First paragraph.\n\nSecond paragraph.";
    let chunks = texts(&RecursiveChunker::new(20, 0), text);
    assert_eq!(chunks, vec!["First paragraph.", "Second paragraph."]);
}

#[test]
fn recursive_chunker_overlaps_words() {
    let chunks = texts(&RecursiveChunker::new(10, 5), "aaaa bbbb cccc dddd");
    assert_eq!(chunks, vec!["aaaa bbbb", "bbbb cccc", "cccc dddd"]);
}

#[test]
fn recursive_chunker_splits_long_words_by_character() {
    let chunks = texts(&RecursiveChunker::new(4, 0), "abcdefghij");
    assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
}

#[test]
fn strategy_builds_matching_chunker() {
    let fixed = ChunkingStrategy::Fixed.build(4, 2);
    assert_eq!(texts(fixed.as_ref(), "ABCDEFGHIJ").len(), 4);

    let recursive = ChunkingStrategy::Recursive.build(20, 0);
    assert_eq!(texts(recursive.as_ref(), "First paragraph.\n\nSecond paragraph.").len(), 2);
}

/// Strategy producing `(chunk_size, chunk_overlap)` with `overlap < size`.
fn arb_size_and_overlap() -> impl Strategy<Value = (usize, usize)> {
    (1usize..64).prop_flat_map(|size| (Just(size), 0..size))
}

/// *For any* text and `overlap < size`, the first chunk followed by every
/// later chunk minus its first `overlap` characters SHALL reconstruct the
/// text, every chunk SHALL hold at most `size` characters, and neighbours
/// SHALL share exactly `overlap` characters.
mod prop_fixed_size_reconstruction {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn advances_reconstruct_text(
            text in "\\PC{0,300}",
            (size, overlap) in arb_size_and_overlap(),
        ) {
            let chunks = texts(&FixedSizeChunker::new(size, overlap), &text);

            let mut rebuilt = String::new();
            for (i, chunk) in chunks.iter().enumerate() {
                prop_assert!(chunk.chars().count() <= size);
                if i == 0 {
                    rebuilt.push_str(chunk);
                } else {
                    rebuilt.extend(chunk.chars().skip(overlap));
                }
            }
            prop_assert_eq!(&rebuilt, &text);

            for pair in chunks.windows(2) {
                let prev: Vec<char> = pair[0].chars().collect();
                let next: Vec<char> = pair[1].chars().collect();
                prop_assert_eq!(prev.len(), size);
                prop_assert!(next.len() > overlap);
                prop_assert_eq!(&prev[size - overlap..], &next[..overlap]);
            }
        }

        #[test]
        fn text_not_longer_than_size_is_one_chunk(
            text in "\\PC{1,40}",
            size in 40usize..100,
            overlap_seed in 0usize..40,
        ) {
            let chunks = texts(&FixedSizeChunker::new(size, overlap_seed % size), &text);
            prop_assert_eq!(chunks, vec![text]);
        }

        #[test]
        fn recursive_chunks_are_bounded_substrings(
            text in "[a-z]{0,12}( [a-z]{1,12}| ?\n{1,2}[a-z]{1,8}){0,40}",
            (size, overlap) in arb_size_and_overlap(),
        ) {
            let chunks = texts(&RecursiveChunker::new(size, overlap), &text);
            for chunk in &chunks {
                prop_assert!(!chunk.is_empty());
                prop_assert!(chunk.chars().count() <= size);
                prop_assert!(text.contains(chunk.as_str()));
            }
            if !text.trim().is_empty() {
                prop_assert!(!chunks.is_empty());
            }
        }
    }
}
