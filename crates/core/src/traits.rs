use crate::error::QueryError;
use crate::models::{RetrievedChunk, SectionChunk};
use async_trait::async_trait;

/// Nearest-neighbor index over embedded chunks. Entries are write-once;
/// re-indexing the same document appends rather than replaces.
#[async_trait]
pub trait VectorIndex {
    async fn index_chunks(
        &self,
        chunks: &[SectionChunk],
        embeddings: &[Vec<f32>],
    ) -> Result<(), QueryError>;

    /// Top-k entries ranked by similarity descending. An empty store is an
    /// empty result, not an error.
    async fn search(&self, query_vector: &[f32], top_k: usize)
        -> Result<Vec<RetrievedChunk>, QueryError>;
}

/// Turns a question plus its retrieval hits into the text shown to the
/// user, either by calling a completion model or by formatting the hits
/// directly.
#[async_trait]
pub trait AnswerStrategy: Send + Sync {
    async fn answer(
        &self,
        question: &str,
        hits: &[RetrievedChunk],
    ) -> Result<String, QueryError>;
}
