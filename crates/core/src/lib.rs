pub mod answer;
pub mod chunking;
pub mod embeddings;
pub mod error;
pub mod loader;
pub mod models;
mod net;
pub mod openai;
pub mod pipeline;
pub mod stores;
pub mod traits;

pub use answer::{
    ContextAnswerer, SnippetPresenter, DEFAULT_BEST_GUESS_CHARS, DEFAULT_MAX_CONTEXT_CHARS,
    DEFAULT_SNIPPET_CHARS, NO_CONTEXT_MESSAGE,
};
pub use chunking::{build_chunks, split_text};
pub use embeddings::{EmbeddingProvider, NgramHashEmbedder, DEFAULT_LOCAL_DIMENSIONS};
pub use error::{IngestError, QueryError};
pub use loader::{is_pdf_path, load_document, LopdfExtractor, PdfExtractor};
pub use models::{
    ChunkingOptions, DocumentSection, IndexReport, RetrievedChunk, SectionChunk, StoreEntry,
};
pub use openai::{
    OpenAiChatClient, OpenAiEmbedder, DEFAULT_CHAT_MODEL, DEFAULT_EMBEDDING_DIMENSIONS,
    DEFAULT_EMBEDDING_MODEL, DEFAULT_OPENAI_BASE_URL,
};
pub use pipeline::{RagPipeline, DEFAULT_TOP_K};
pub use stores::{DiskVectorStore, DEFAULT_STORE_DIR};
pub use traits::{AnswerStrategy, VectorIndex};
