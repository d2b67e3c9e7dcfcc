use crate::chunking::build_chunks;
use crate::embeddings::EmbeddingProvider;
use crate::error::{IngestError, QueryError};
use crate::loader::load_document;
use crate::models::{ChunkingOptions, IndexReport, RetrievedChunk};
use crate::traits::{AnswerStrategy, VectorIndex};
use std::path::Path;

pub const DEFAULT_TOP_K: usize = 3;

/// The document-to-answer pipeline: one build pass (load, chunk, embed,
/// store) followed by any number of retrieve/answer rounds against the
/// same store. The embedding provider and answer strategy are capabilities
/// chosen at configuration time; the store is the only stateful piece.
pub struct RagPipeline<S: VectorIndex> {
    embedder: Box<dyn EmbeddingProvider>,
    store: S,
    answerer: Box<dyn AnswerStrategy>,
    top_k: usize,
}

impl<S> RagPipeline<S>
where
    S: VectorIndex + Send + Sync,
{
    pub fn new(
        embedder: Box<dyn EmbeddingProvider>,
        store: S,
        answerer: Box<dyn AnswerStrategy>,
    ) -> Self {
        Self {
            embedder,
            store,
            answerer,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// One-time build phase. Any failure here is fatal to the caller; there
    /// is no partial-index recovery.
    pub async fn index_document(
        &self,
        path: &Path,
        options: &ChunkingOptions,
    ) -> Result<IndexReport, IngestError> {
        let sections = load_document(path)?;
        let chunks = build_chunks(&sections, options)?;

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        self.store
            .index_chunks(&chunks, &embeddings)
            .await
            .map_err(|error| IngestError::Store(error.to_string()))?;

        Ok(IndexReport {
            sections: sections.len(),
            chunks: chunks.len(),
        })
    }

    /// Embed the question with the build-time provider and return the top-k
    /// entries by similarity. An empty store yields an empty list.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<RetrievedChunk>, QueryError> {
        if question.trim().is_empty() {
            return Err(QueryError::EmptyQuery);
        }

        let query_vector = self.embedder.embed(question).await?;
        self.store.search(&query_vector, self.top_k).await
    }

    pub async fn answer(&self, question: &str) -> Result<String, QueryError> {
        let hits = self.retrieve(question).await?;
        self.answerer.answer(question, &hits).await
    }
}

#[cfg(test)]
mod tests {
    use super::RagPipeline;
    use crate::answer::{SnippetPresenter, NO_CONTEXT_MESSAGE};
    use crate::embeddings::NgramHashEmbedder;
    use crate::error::QueryError;
    use crate::models::ChunkingOptions;
    use crate::stores::DiskVectorStore;
    use std::fs;
    use tempfile::tempdir;

    fn local_pipeline(store: DiskVectorStore) -> RagPipeline<DiskVectorStore> {
        RagPipeline::new(
            Box::new(NgramHashEmbedder::default()),
            store,
            Box::new(SnippetPresenter::default()),
        )
    }

    #[tokio::test]
    async fn sample_text_round_trip() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let doc_path = dir.path().join("sample.txt");
        fs::write(&doc_path, "The sky is blue. Water is wet.")?;

        let store = DiskVectorStore::open(dir.path().join("store"), 256)?;
        let pipeline = local_pipeline(store);

        let report = pipeline
            .index_document(&doc_path, &ChunkingOptions::default())
            .await?;
        assert_eq!(report.sections, 1);
        assert_eq!(report.chunks, 1);

        let answer = pipeline.answer("What color is the sky?").await?;
        assert!(answer.contains("The sky is blue."));
        assert!(answer.contains("sample.txt"));
        Ok(())
    }

    #[tokio::test]
    async fn exact_chunk_text_retrieves_its_own_chunk() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let doc_path = dir.path().join("notes.txt");
        let body = format!(
            "{}\n{}\n{}",
            "Hydraulic pumps fail under sustained overpressure. ".repeat(4),
            "Lubrication schedules are listed in the appendix. ".repeat(4),
            "Operators must wear certified eye protection at all times. ".repeat(4),
        );
        fs::write(&doc_path, &body)?;

        let store = DiskVectorStore::open(dir.path().join("store"), 256)?;
        let pipeline = local_pipeline(store).with_top_k(3);

        let options = ChunkingOptions {
            max_chars: 120,
            overlap_chars: 20,
        };
        let report = pipeline.index_document(&doc_path, &options).await?;
        assert!(report.chunks > 1);

        let probe = "Operators must wear certified eye protection at all times.";
        let hits = pipeline.retrieve(probe).await?;
        assert!(!hits.is_empty());
        assert!(hits[0].entry.chunk.text.contains("eye protection"));
        Ok(())
    }

    #[tokio::test]
    async fn blank_question_is_rejected_at_the_seam() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store = DiskVectorStore::open(dir.path(), 256)?;
        let pipeline = local_pipeline(store);

        let result = pipeline.retrieve("   ").await;
        assert!(matches!(result, Err(QueryError::EmptyQuery)));
        Ok(())
    }

    #[tokio::test]
    async fn empty_store_answers_with_the_fallback_message(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store = DiskVectorStore::open(dir.path(), 256)?;
        let pipeline = local_pipeline(store);

        let hits = pipeline.retrieve("anything at all").await?;
        assert!(hits.is_empty());

        let answer = pipeline.answer("anything at all").await?;
        assert_eq!(answer, NO_CONTEXT_MESSAGE);
        Ok(())
    }
}
