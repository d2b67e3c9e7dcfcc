use crate::error::QueryError;
use crate::models::RetrievedChunk;
use crate::openai::OpenAiChatClient;
use crate::traits::AnswerStrategy;
use async_trait::async_trait;
use std::fmt::Write as _;

pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 12_000;
pub const DEFAULT_SNIPPET_CHARS: usize = 500;
pub const DEFAULT_BEST_GUESS_CHARS: usize = 300;

pub const NO_CONTEXT_MESSAGE: &str = "No relevant information found in the indexed document.";

fn fill_prompt(context: &str, question: &str) -> String {
    format!(
        "Use the following pieces of context to answer the question at the end.\n\
         If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\
         \n\
         {context}\n\
         \n\
         Question: {question}\n\
         Answer:"
    )
}

fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(limit).collect();
        cut.push_str("...");
        cut
    }
}

/// Generative strategy: retrieved chunk texts become the context block of a
/// fixed prompt template, answered by the hosted completion model at
/// temperature zero. The context size is bounded up front; oversized
/// contexts fail loudly instead of being truncated somewhere downstream.
pub struct ContextAnswerer {
    client: OpenAiChatClient,
    max_context_chars: usize,
}

impl ContextAnswerer {
    pub fn new(client: OpenAiChatClient) -> Self {
        Self {
            client,
            max_context_chars: DEFAULT_MAX_CONTEXT_CHARS,
        }
    }

    pub fn with_context_limit(mut self, max_context_chars: usize) -> Self {
        self.max_context_chars = max_context_chars;
        self
    }

    fn build_context(hits: &[RetrievedChunk]) -> String {
        hits.iter()
            .map(|hit| hit.entry.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[async_trait]
impl AnswerStrategy for ContextAnswerer {
    async fn answer(
        &self,
        question: &str,
        hits: &[RetrievedChunk],
    ) -> Result<String, QueryError> {
        if hits.is_empty() {
            return Ok(NO_CONTEXT_MESSAGE.to_string());
        }

        let context = Self::build_context(hits);
        let chars = context.chars().count();
        if chars > self.max_context_chars {
            return Err(QueryError::ContextTooLarge {
                chars,
                limit: self.max_context_chars,
            });
        }

        self.client.complete(&fill_prompt(&context, question), 0.0).await
    }
}

/// Extractive strategy: ranked snippets with their source metadata, no
/// model call. The top hit's opening characters double as a best-guess
/// answer line.
pub struct SnippetPresenter {
    snippet_chars: usize,
    best_guess_chars: usize,
}

impl Default for SnippetPresenter {
    fn default() -> Self {
        Self {
            snippet_chars: DEFAULT_SNIPPET_CHARS,
            best_guess_chars: DEFAULT_BEST_GUESS_CHARS,
        }
    }
}

impl SnippetPresenter {
    pub fn new(snippet_chars: usize, best_guess_chars: usize) -> Self {
        Self {
            snippet_chars,
            best_guess_chars,
        }
    }

    fn source_line(hit: &RetrievedChunk, rank: usize) -> String {
        let chunk = &hit.entry.chunk;
        match chunk.page {
            Some(page) => format!(
                "[{rank}] {} (page {page}) score={:.4}",
                chunk.source_path, hit.score
            ),
            None => format!("[{rank}] {} score={:.4}", chunk.source_path, hit.score),
        }
    }
}

#[async_trait]
impl AnswerStrategy for SnippetPresenter {
    async fn answer(
        &self,
        _question: &str,
        hits: &[RetrievedChunk],
    ) -> Result<String, QueryError> {
        if hits.is_empty() {
            return Ok(NO_CONTEXT_MESSAGE.to_string());
        }

        let mut out = String::new();
        for (position, hit) in hits.iter().enumerate() {
            let _ = writeln!(out, "{}", Self::source_line(hit, position + 1));
            let _ = writeln!(
                out,
                "{}",
                truncate_chars(&hit.entry.chunk.text, self.snippet_chars)
            );
            let _ = writeln!(out);
        }

        let _ = write!(
            out,
            "Best guess: {}",
            truncate_chars(&hits[0].entry.chunk.text, self.best_guess_chars)
        );

        Ok(out)
    }
}
