//! Document chunking strategies.
//!
//! This module provides the [`Chunker`] trait and two implementations:
//!
//! - [`FixedSizeChunker`] splits by character count with a fixed overlap
//! - [`RecursiveChunker`] splits on paragraph, line, word, then character
//!   boundaries and merges the pieces back up to the chunk size
//!
//! All lengths are counted in `char`s, so multi-byte text is never cut in the
//! middle of a code point.

use std::collections::VecDeque;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::document::{Chunk, Document};

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text and metadata but no embeddings.
/// Embeddings are attached later by the index.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks, in source order.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    /// Each returned chunk has an empty embedding vector.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Selects which [`Chunker`] the pipeline builds from its configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkingStrategy {
    /// [`FixedSizeChunker`].
    #[default]
    Fixed,
    /// [`RecursiveChunker`].
    Recursive,
}

impl ChunkingStrategy {
    /// Build the chunker for this strategy.
    pub fn build(self, chunk_size: usize, chunk_overlap: usize) -> Arc<dyn Chunker> {
        match self {
            ChunkingStrategy::Fixed => Arc::new(FixedSizeChunker::new(chunk_size, chunk_overlap)),
            ChunkingStrategy::Recursive => {
                Arc::new(RecursiveChunker::new(chunk_size, chunk_overlap))
            }
        }
    }
}

fn make_chunk(document: &Document, chunk_index: usize, text: String) -> Chunk {
    let mut metadata = document.metadata.clone();
    metadata.insert("chunk_index".to_string(), chunk_index.to_string());
    Chunk {
        id: format!("{}_{chunk_index}", document.id),
        text,
        embedding: Vec::new(),
        metadata,
        document_id: document.id.clone(),
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Splits text into fixed-size chunks by character count with a fixed overlap.
///
/// Every chunk holds at most `chunk_size` characters and starts
/// `chunk_size - chunk_overlap` characters after its predecessor, so
/// neighbours share exactly `chunk_overlap` characters. The chunk that reaches
/// the end of the text is the last one and may be shorter.
///
/// Chunk IDs are generated as `{document_id}_{chunk_index}`. Each chunk inherits
/// the parent document's metadata plus a `chunk_index` field.
///
/// # Example
///
/// ```rust,ignore
/// use pdfq_rag::FixedSizeChunker;
///
/// let chunker = FixedSizeChunker::new(1000, 250);
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` - maximum number of characters per chunk
    /// * `chunk_overlap` - number of overlapping characters between consecutive chunks,
    ///   expected to be smaller than `chunk_size`
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

/// Character windows of `chunk_size` advancing by `chunk_size - chunk_overlap`.
fn split_by_size(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }

    let size = chunk_size.max(1);
    // An overlap that swallows the whole window would never advance.
    let step = size.saturating_sub(chunk_overlap).max(1);

    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }

    chunks
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        split_by_size(&document.text, self.chunk_size, self.chunk_overlap)
            .into_iter()
            .enumerate()
            .map(|(i, text)| make_chunk(document, i, text))
            .collect()
    }
}

/// Splits text hierarchically: paragraphs → lines → words → characters.
///
/// The text is cut at the first separator that occurs in it (`"\n\n"`, then
/// `"\n"`, then `" "`, then between characters). Pieces shorter than
/// `chunk_size` are merged back together until the next piece would overflow
/// the chunk; the following chunk then starts with the trailing pieces of the
/// previous one, up to `chunk_overlap` characters. Pieces that are still too
/// long are split again with the next separator.
///
/// Chunks are trimmed of surrounding whitespace and empty chunks are dropped,
/// so unlike [`FixedSizeChunker`] the overlap is a best effort, not exact.
///
/// # Example
///
/// ```rust,ignore
/// use pdfq_rag::RecursiveChunker;
///
/// let chunker = RecursiveChunker::new(1000, 250);
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    const SEPARATORS: [&'static str; 4] = ["\n\n", "\n", " ", ""];

    /// Create a new `RecursiveChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` - maximum number of characters per chunk
    /// * `chunk_overlap` - maximum number of characters carried over from the previous chunk
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

/// Split text at a separator while keeping the separator attached to the preceding segment.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text.char_indices().map(|(i, c)| &text[i..i + c.len_utf8()]).collect();
    }

    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}

/// Merge small pieces into chunks of at most `chunk_size` characters, carrying
/// up to `chunk_overlap` trailing characters into the next chunk.
fn merge_pieces(pieces: &[&str], chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut window: VecDeque<(&str, usize)> = VecDeque::new();
    let mut total = 0;

    for piece in pieces {
        let len = char_len(piece);
        if total + len > chunk_size && !window.is_empty() {
            chunks.push(window.iter().map(|(p, _)| *p).collect::<String>());
            while total > chunk_overlap || (total + len > chunk_size && total > 0) {
                match window.pop_front() {
                    Some((_, popped)) => total -= popped,
                    None => break,
                }
            }
        }
        window.push_back((piece, len));
        total += len;
    }

    if !window.is_empty() {
        chunks.push(window.iter().map(|(p, _)| *p).collect::<String>());
    }

    chunks
}

fn split_recursive(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    separators: &[&str],
) -> Vec<String> {
    let Some(position) = separators.iter().position(|s| s.is_empty() || text.contains(s)) else {
        return split_by_size(text, chunk_size, chunk_overlap);
    };
    let separator = separators[position];
    let remaining_separators = &separators[position + 1..];

    let mut chunks = Vec::new();
    let mut pending: Vec<&str> = Vec::new();

    for piece in split_keeping_separator(text, separator) {
        if char_len(piece) < chunk_size {
            pending.push(piece);
            continue;
        }

        if !pending.is_empty() {
            chunks.extend(merge_pieces(&pending, chunk_size, chunk_overlap));
            pending.clear();
        }
        if remaining_separators.is_empty() {
            chunks.push(piece.to_string());
        } else {
            chunks.extend(split_recursive(piece, chunk_size, chunk_overlap, remaining_separators));
        }
    }

    if !pending.is_empty() {
        chunks.extend(merge_pieces(&pending, chunk_size, chunk_overlap));
    }

    chunks
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.trim().is_empty() {
            return Vec::new();
        }

        let chunk_size = self.chunk_size.max(1);
        split_recursive(&document.text, chunk_size, self.chunk_overlap, &Self::SEPARATORS)
            .into_iter()
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .enumerate()
            .map(|(i, text)| make_chunk(document, i, text))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_keeping_separator_keeps_every_byte() {
        let pieces = split_keeping_separator("a b  c", " ");
        assert_eq!(pieces, vec!["a ", "b ", " ", "c"]);
        assert_eq!(pieces.concat(), "a b  c");
    }

    #[test]
    fn empty_separator_splits_into_chars() {
        assert_eq!(split_keeping_separator("héy", ""), vec!["h", "é", "y"]);
    }

    #[test]
    fn merge_pieces_carries_overlap() {
        let pieces = ["aa ", "bb ", "cc ", "dd"];
        let merged = merge_pieces(&pieces, 6, 3);
        assert_eq!(merged, vec!["aa bb ", "bb cc ", "cc dd"]);
    }

    #[test]
    fn split_by_size_counts_chars_not_bytes() {
        let chunks = split_by_size("ééééé", 2, 1);
        assert_eq!(chunks, vec!["éé", "éé", "éé", "éé"]);
    }
}
