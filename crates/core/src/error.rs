use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("text decode error: {0}")]
    Decode(String),

    #[error("path has no file name: {0}")]
    MissingFileName(String),

    #[error("invalid chunking config: {0}")]
    InvalidChunkConfig(String),

    #[error("vector store error: {0}")]
    Store(String),

    #[error("embedding failed during indexing: {0}")]
    Embedding(#[from] QueryError),
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned {status}: {details}")]
    Backend {
        service: String,
        status: String,
        details: String,
    },

    #[error("missing api key: {0}")]
    MissingApiKey(String),

    #[error("query is empty")]
    EmptyQuery,

    #[error("vector store error: {0}")]
    Store(String),

    #[error("retrieved context is {chars} chars, limit is {limit}")]
    ContextTooLarge { chars: usize, limit: usize },

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T, E = IngestError> = std::result::Result<T, E>;
