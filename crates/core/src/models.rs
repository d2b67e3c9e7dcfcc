use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One contiguous region of extracted document text: a page for PDFs, the
/// whole file for plain text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSection {
    pub source_path: String,
    pub page: Option<u32>,
    pub text: String,
}

/// A fixed-size window over one section's text. Metadata always points back
/// to exactly one section and one source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionChunk {
    pub chunk_id: String,
    pub source_path: String,
    pub page: Option<u32>,
    pub section_index: usize,
    pub chunk_index: usize,
    pub text: String,
}

/// A persisted row of the vector store. Append-only; never updated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreEntry {
    pub entry_id: String,
    pub chunk: SectionChunk,
    pub embedding: Vec<f32>,
    pub indexed_at: DateTime<Utc>,
}

/// One ranked retrieval hit, recomputed per query.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub entry: StoreEntry,
    pub score: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct ChunkingOptions {
    pub max_chars: usize,
    pub overlap_chars: usize,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            max_chars: 1_000,
            overlap_chars: 200,
        }
    }
}

/// Counts reported after the one-time build phase.
#[derive(Debug, Clone, Copy)]
pub struct IndexReport {
    pub sections: usize,
    pub chunks: usize,
}
