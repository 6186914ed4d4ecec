use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::Parser;
use common::utils::{config::get_config, embedding::EmbeddingProvider};
use futures::{pin_mut, StreamExt};
use retrieval_pipeline::{IndexCache, PdfIndexer, QaEngine};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Parser)]
#[command(about = "Interactive PDF Question Answering")]
struct Args {
    /// Path to the PDF file
    pdf_path: Option<PathBuf>,

    /// One-time question (skips interactive mode)
    #[arg(short, long)]
    question: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Keep stdout for the conversation itself; diagnostics go to stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    let args = Args::parse();
    let config = get_config()?;

    let pdf_path = match args.pdf_path {
        Some(path) => path,
        None => match prompt_line("Enter the path to your PDF file: ")? {
            Some(path) => PathBuf::from(path),
            None => return Ok(()),
        },
    };

    if !pdf_path.exists() {
        println!("Error: File not found: {}", pdf_path.display());
        return Ok(());
    }

    println!("PDF RAG Assistant: {}", display_name(&pdf_path));
    println!("Initializing system...");
    let engine = build_engine(&config, &pdf_path).await?;

    if let Some(question) = args.question {
        answer_question(&engine, &question).await;
        return Ok(());
    }

    println!("Ready! Ask questions about your PDF (type 'exit' to quit)");
    loop {
        let line = match prompt_line("\nYour question: ")? {
            Some(line) => line,
            None => break,
        };
        let question = line.trim();

        if question.is_empty() {
            continue;
        }
        if is_exit_command(question) {
            println!("Goodbye!");
            break;
        }

        answer_question(&engine, question).await;
    }

    Ok(())
}

async fn build_engine(
    config: &common::utils::config::AppConfig,
    pdf_path: &Path,
) -> anyhow::Result<QaEngine> {
    let openai_client = Arc::new(async_openai::Client::with_config(
        async_openai::config::OpenAIConfig::new()
            .with_api_key(&config.openai_api_key)
            .with_api_base(&config.openai_base_url),
    ));
    let embedding_provider =
        Arc::new(EmbeddingProvider::from_config(config, Some(openai_client.clone())).await?);

    let cache = IndexCache::new(config.data_dir.clone());
    let indexer = PdfIndexer::new(embedding_provider.clone());
    let index = cache.load_or_build(pdf_path, &indexer).await?;

    Ok(QaEngine::new(
        index,
        embedding_provider,
        openai_client,
        config.chat_model.clone(),
    ))
}

/// First pass answers the question over the retrieved context; the second
/// pass streams an elaboration token by token. Any failure is printed and
/// the conversation continues.
async fn answer_question(engine: &QaEngine, question: &str) {
    println!("Q: {question}");

    let answer = match engine.answer(question).await {
        Ok(answer) => answer,
        Err(err) => {
            println!("Error: {err}");
            return;
        }
    };

    print!("A: ");
    flush_stdout();
    match engine.elaborate_stream(question, &answer.content).await {
        Ok(stream) => {
            pin_mut!(stream);
            while let Some(token) = stream.next().await {
                match token {
                    Ok(token) => {
                        print!("{token}");
                        flush_stdout();
                    }
                    Err(err) => {
                        println!();
                        println!("Error: {err}");
                        return;
                    }
                }
            }
            println!();
        }
        Err(err) => {
            println!();
            println!("Error: {err}");
            return;
        }
    }

    if !answer.sources.is_empty() {
        println!("Sources:");
        for source in &answer.sources {
            println!("- {source}");
        }
    }
    println!();
}

fn is_exit_command(input: &str) -> bool {
    matches!(
        input.trim().to_ascii_lowercase().as_str(),
        "exit" | "quit" | "q"
    )
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

/// Blocking stdin prompt; returns `None` on EOF.
fn prompt_line(prompt: &str) -> io::Result<Option<String>> {
    print!("{prompt}");
    flush_stdout();
    let mut line = String::new();
    let bytes_read = io::stdin().read_line(&mut line)?;
    if bytes_read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_owned()))
}

fn flush_stdout() {
    let _ = io::stdout().flush();
}
