//! Character-window chunk splitter with separator preference.
//!
//! Text is cut into windows of at most `max_chars` characters. Each cut
//! prefers the latest occurrence of the highest-priority separator inside
//! the window (paragraph break, then line break, then space) and falls
//! back to an unconditional fixed-width cut. The next window starts
//! exactly `overlap` characters before the previous cut, so consecutive
//! chunks of one document share that much trailing/leading text.

use crate::error::{Error, Result};
use crate::types::{Document, DocumentChunk};

pub const DEFAULT_MAX_CHARS: usize = 1000;
pub const DEFAULT_OVERLAP: usize = 150;

#[derive(Debug, Clone)]
pub struct TextSplitter {
    max_chars: usize,
    overlap: usize,
    separators: Vec<String>,
}

fn default_separators() -> Vec<String> {
    vec!["\n\n".to_string(), "\n".to_string(), " ".to_string(), String::new()]
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            overlap: DEFAULT_OVERLAP,
            separators: default_separators(),
        }
    }
}

impl TextSplitter {
    pub fn new(max_chars: usize, overlap: usize) -> Result<Self> {
        Self::with_separators(max_chars, overlap, default_separators())
    }

    /// Separator order is the cut preference; an empty string marks the
    /// fixed-width fallback and ends the preference list.
    pub fn with_separators(
        max_chars: usize,
        overlap: usize,
        separators: Vec<String>,
    ) -> Result<Self> {
        if max_chars == 0 {
            return Err(Error::InvalidConfig("chunk size must be positive".to_string()));
        }
        if overlap >= max_chars {
            return Err(Error::InvalidConfig(format!(
                "overlap ({overlap}) must be smaller than chunk size ({max_chars})"
            )));
        }
        Ok(Self { max_chars, overlap, separators })
    }

    /// Split one text into chunks of at most `max_chars` characters.
    ///
    /// Deterministic: identical input always yields identical chunks, in
    /// left-to-right order.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let n = chars.len();
        if n == 0 {
            return Vec::new();
        }
        let mut pieces = Vec::new();
        let mut start = 0usize;
        loop {
            let hard_end = (start + self.max_chars).min(n);
            let end = if hard_end == n {
                n
            } else {
                self.pick_cut(&chars, start, hard_end)
            };
            pieces.push(chars[start..end].iter().collect::<String>());
            if end == n {
                break;
            }
            start = end - self.overlap;
        }
        pieces
    }

    /// Find the cut position in `(start, hard_end]`, preferring the latest
    /// occurrence of the highest-priority separator. The cut lands just
    /// after the separator. A cut must leave room for forward progress past
    /// the next chunk's leading overlap, so anything at or before
    /// `start + overlap` is ignored.
    fn pick_cut(&self, chars: &[char], start: usize, hard_end: usize) -> usize {
        let min_end = start + self.overlap + 1;
        for sep in &self.separators {
            if sep.is_empty() {
                break;
            }
            let sep_chars: Vec<char> = sep.chars().collect();
            let w = sep_chars.len();
            let lowest = min_end.max(start + w);
            if lowest > hard_end {
                continue;
            }
            let mut e = hard_end;
            while e >= lowest {
                if chars[e - w..e] == sep_chars[..] {
                    return e;
                }
                e -= 1;
            }
        }
        hard_end
    }

    /// Split every document, assigning `"{doc_id}:{index}"` ids and
    /// per-document totals. Chunk order is document order, then
    /// in-document order.
    pub fn split_documents(&self, docs: &[Document]) -> Vec<DocumentChunk> {
        let mut all_chunks = Vec::new();
        for doc in docs {
            let doc_path = doc.path.to_string_lossy().to_string();
            let mut chunks = Vec::new();
            for piece in self.split_text(&doc.text) {
                if piece.trim().is_empty() {
                    continue;
                }
                let chunk_index = chunks.len();
                chunks.push(DocumentChunk {
                    id: format!("{}:{}", doc.doc_id, chunk_index),
                    doc_id: doc.doc_id.clone(),
                    doc_path: doc_path.clone(),
                    content: piece,
                    chunk_index,
                    total_chunks: 0,
                });
            }
            let total_chunks = chunks.len();
            for chunk in &mut chunks {
                chunk.total_chunks = total_chunks;
            }
            all_chunks.extend(chunks);
        }
        all_chunks
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }
}
