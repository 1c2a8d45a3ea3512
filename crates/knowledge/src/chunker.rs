//! Recursive text chunking with configurable size and overlap.
//!
//! Text is split on the coarsest separator that appears in it (paragraphs,
//! then lines, then words); pieces still larger than the chunk size are split
//! again with the next separator, and as a last resort on character
//! boundaries. Adjacent pieces are then merged greedily back up to the chunk
//! size, carrying a tail of up to `overlap` characters into the next chunk.
//! All sizes are counted in characters, not bytes.

use crate::types::ChunkCandidate;
use std::collections::VecDeque;

const SEPARATORS: &[&str] = &["\n\n", "\n", " "];

/// Chunk text into overlapping segments.
pub fn chunk_text(
    source_id: &str,
    text: &str,
    chunk_size: usize,
    overlap: usize,
) -> Vec<ChunkCandidate> {
    let chunk_size = chunk_size.max(1);
    let overlap = overlap.min(chunk_size.saturating_sub(1));

    let chunks: Vec<ChunkCandidate> = split_text(text, chunk_size, overlap, SEPARATORS)
        .into_iter()
        .map(|piece| piece.trim().to_string())
        .filter(|piece| !piece.is_empty())
        .enumerate()
        .map(|(position, piece)| ChunkCandidate {
            source_id: source_id.to_string(),
            position: position as u32,
            metadata: serde_json::json!({ "chars": piece.chars().count() }),
            text: piece,
        })
        .collect();

    tracing::debug!(
        "Chunked text into {} chunks (size: {}, overlap: {})",
        chunks.len(),
        chunk_size,
        overlap
    );

    chunks
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn split_text(text: &str, chunk_size: usize, overlap: usize, separators: &[&str]) -> Vec<String> {
    if char_len(text) <= chunk_size {
        return vec![text.to_string()];
    }

    let Some(pos) = separators.iter().position(|sep| text.contains(sep)) else {
        return hard_split(text, chunk_size, overlap);
    };
    let separator = separators[pos];
    let finer = &separators[pos + 1..];

    let mut output = Vec::new();
    let mut fitting: Vec<&str> = Vec::new();

    for piece in text.split(separator).filter(|p| !p.is_empty()) {
        if char_len(piece) <= chunk_size {
            fitting.push(piece);
            continue;
        }

        if !fitting.is_empty() {
            output.extend(merge_splits(&fitting, separator, chunk_size, overlap));
            fitting.clear();
        }
        output.extend(split_text(piece, chunk_size, overlap, finer));
    }

    if !fitting.is_empty() {
        output.extend(merge_splits(&fitting, separator, chunk_size, overlap));
    }

    output
}

/// Split on character boundaries when no separator is left.
fn hard_split(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let step = chunk_size - overlap;

    let mut pieces = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        pieces.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }
    pieces
}

/// Greedily join pieces up to `chunk_size`, keeping up to `overlap` trailing
/// characters of each emitted chunk at the start of the next.
fn merge_splits(pieces: &[&str], separator: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let sep_len = char_len(separator);
    let mut merged = Vec::new();
    let mut window: VecDeque<(&str, usize)> = VecDeque::new();
    let mut total = 0usize;

    for &piece in pieces {
        let len = char_len(piece);
        let joined_len = |total: usize, window_empty: bool| {
            total + len + if window_empty { 0 } else { sep_len }
        };

        if joined_len(total, window.is_empty()) > chunk_size && !window.is_empty() {
            merged.push(join(&window, separator));

            while let Some(&(_, front_len)) = window.front() {
                let over_overlap = total > overlap;
                let would_overflow = joined_len(total, false) > chunk_size;
                if !over_overlap && !would_overflow {
                    break;
                }
                window.pop_front();
                total -= front_len + if window.is_empty() { 0 } else { sep_len };
            }
        }

        if !window.is_empty() {
            total += sep_len;
        }
        total += len;
        window.push_back((piece, len));
    }

    if !window.is_empty() {
        merged.push(join(&window, separator));
    }

    merged
}

fn join(window: &VecDeque<(&str, usize)>, separator: &str) -> String {
    window
        .iter()
        .map(|(piece, _)| *piece)
        .collect::<Vec<_>>()
        .join(separator)
}
