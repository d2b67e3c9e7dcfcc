use anyhow::Context;
use chrono::Utc;
use clap::{Parser, ValueEnum};
use docqa_core::{
    AnswerStrategy, ChunkingOptions, ContextAnswerer, DiskVectorStore, EmbeddingProvider,
    NgramHashEmbedder, OpenAiChatClient, OpenAiEmbedder, RagPipeline, SnippetPresenter,
    DEFAULT_CHAT_MODEL, DEFAULT_EMBEDDING_DIMENSIONS, DEFAULT_EMBEDDING_MODEL,
    DEFAULT_OPENAI_BASE_URL, DEFAULT_STORE_DIR, DEFAULT_TOP_K,
};
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "docqa", version)]
struct Cli {
    /// Embedding provider used at both index and query time.
    #[arg(long, value_enum, default_value = "local")]
    embedding_provider: Provider,

    /// Answer strategy; defaults to chat for the openai provider, snippet for local.
    #[arg(long, value_enum)]
    answer_mode: Option<AnswerMode>,

    /// Vector store directory.
    #[arg(long, default_value = DEFAULT_STORE_DIR)]
    store_dir: String,

    /// Number of chunks retrieved per question.
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    /// Hosted embedding model name.
    #[arg(long, default_value = DEFAULT_EMBEDDING_MODEL)]
    embedding_model: String,

    /// Hosted chat model name.
    #[arg(long, default_value = DEFAULT_CHAT_MODEL)]
    chat_model: String,

    /// Base URL of the hosted API.
    #[arg(long, default_value = DEFAULT_OPENAI_BASE_URL)]
    openai_base_url: String,

    /// API key for hosted embedding and chat calls.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, default_value = "")]
    openai_api_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Provider {
    Local,
    Openai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AnswerMode {
    Snippet,
    Chat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        started_at = %Utc::now().to_rfc3339(),
        "docqa boot"
    );

    let answer_mode = cli.answer_mode.unwrap_or(match cli.embedding_provider {
        Provider::Local => AnswerMode::Snippet,
        Provider::Openai => AnswerMode::Chat,
    });

    let embedder: Box<dyn EmbeddingProvider> = match cli.embedding_provider {
        Provider::Local => Box::new(NgramHashEmbedder::default()),
        Provider::Openai => Box::new(
            OpenAiEmbedder::new(
                &cli.openai_base_url,
                &cli.openai_api_key,
                cli.embedding_model.clone(),
                DEFAULT_EMBEDDING_DIMENSIONS,
            )
            .context("failed to configure the hosted embedding provider")?,
        ),
    };

    let answerer: Box<dyn AnswerStrategy> = match answer_mode {
        AnswerMode::Snippet => Box::new(SnippetPresenter::default()),
        AnswerMode::Chat => Box::new(ContextAnswerer::new(
            OpenAiChatClient::new(
                &cli.openai_base_url,
                &cli.openai_api_key,
                cli.chat_model.clone(),
            )
            .context("failed to configure the chat completion client")?,
        )),
    };

    let dimensions = embedder.dimensions();
    let store = DiskVectorStore::open(&cli.store_dir, dimensions)
        .with_context(|| format!("failed to open vector store at {}", cli.store_dir))?;
    let pipeline = RagPipeline::new(embedder, store, answerer).with_top_k(cli.top_k);

    let stdin = io::stdin();
    let Some(path_input) = prompt_line(&stdin, "Enter document path (sample.pdf or sample.txt): ")?
    else {
        return Ok(());
    };
    let path_text = path_input.trim();
    let path = Path::new(path_text);
    if path_text.is_empty() || !path.exists() {
        println!("File not found: {path_text}");
        return Ok(());
    }

    println!("Loading document...");
    println!("Building index (this may take a moment)...");
    let report = pipeline
        .index_document(path, &ChunkingOptions::default())
        .await
        .context("failed to build the index")?;
    info!(
        sections = report.sections,
        chunks = report.chunks,
        store_dir = %cli.store_dir,
        "index built"
    );

    println!();
    println!("*** Ready. Ask questions about the document (type 'exit' to quit). ***");
    println!();

    loop {
        let Some(line) = prompt_line(&stdin, "Question: ")? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if is_exit_keyword(question) {
            break;
        }

        match pipeline.answer(question).await {
            Ok(answer) => {
                println!();
                println!("Answer:");
                println!("{answer}");
            }
            Err(error) => {
                println!();
                println!("Error: {error}");
            }
        }

        println!();
        println!("{}", "-".repeat(60));
        println!();
    }

    Ok(())
}

fn is_exit_keyword(input: &str) -> bool {
    matches!(input.to_lowercase().as_str(), "exit" | "quit" | "bye")
}

fn prompt_line(stdin: &io::Stdin, prompt: &str) -> anyhow::Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut buffer = String::new();
    let read = stdin.lock().read_line(&mut buffer)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(buffer))
}
