use clap::Parser;
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use inq_core::{ChatHistory, ChunkStorage, InferenceModel, Result, TextSplitter, EMBEDDING_DIM};
use inq_core::chunk::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use inq_inference::QaEngine;
use inq_scrapers::{HttpFetcher, IngestManager, PageFetcher};

#[derive(Debug, Clone)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                match c {
                    's' => total_seconds += num,
                    'm' => total_seconds += num * 60,
                    'h' => total_seconds += num * 3600,
                    'd' => total_seconds += num * 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                }
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // A trailing bare number counts as seconds.
        if !current_number.is_empty() {
            if let Ok(num) = current_number.parse::<u64>() {
                total_seconds += num;
                has_unit = true;
            } else {
                return Err("Invalid number in duration".to_string());
            }
        }

        if !has_unit {
            return Err("Duration must include a number".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Insurance knowledge assistant", long_about = None)]
struct Cli {
    /// Storage backend: memory, or qdrant when built with the feature.
    #[arg(long, default_value = "memory")]
    storage: String,
    /// Override the storage backend URL.
    #[arg(long)]
    backend_url: Option<String>,
    /// Inference model: openai (default) or mock.
    #[arg(long, default_value = "openai")]
    model: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Scrape a source (or all sources) and upsert embeddings.
    Ingest {
        /// Source shorthand (e.g. allstate). All sources when omitted.
        source: Option<String>,
        /// Cap on articles per source for this run.
        #[arg(long)]
        max_articles: Option<usize>,
        /// Re-run periodically (e.g. 1h, 30m, 1h15m30s).
        #[arg(long)]
        interval: Option<HumanDuration>,
    },
    /// List configured sources.
    Sources,
    /// Ask a single question and print the answer with citations.
    Ask {
        #[arg(required = true)]
        question: Vec<String>,
    },
    /// Interactive question loop.
    Chat,
    /// Serve the chat API.
    Serve {
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
}

async fn check_storage(storage: &Arc<dyn ChunkStorage>) -> Result<()> {
    // A zero-vector query works on an empty index and proves the backend is
    // reachable without writing anything.
    storage.query(&vec![0.0; EMBEDDING_DIM], 1).await?;
    Ok(())
}

async fn check_storage_with_retry(
    storage: &Arc<dyn ChunkStorage>,
    storage_type: &str,
    max_retries: u32,
    timeout: Duration,
) -> Result<()> {
    let mut retries = 0;
    let mut last_error = None;

    while retries < max_retries {
        match tokio::time::timeout(timeout, check_storage(storage)).await {
            Ok(Ok(())) => {
                info!("🏦 Storage backend ready (using {})", storage_type);
                return Ok(());
            }
            Ok(Err(e)) => last_error = Some(e),
            Err(elapsed) => {
                last_error = Some(inq_core::Error::Storage(format!(
                    "Storage health check timed out: {}",
                    elapsed
                )))
            }
        }
        retries += 1;
        if retries < max_retries {
            info!("Storage health check failed, retrying {}/{}...", retries, max_retries);
            tokio::time::sleep(Duration::from_secs(2)).await;
        }
    }

    Err(last_error.unwrap_or_else(|| {
        inq_core::Error::Storage("Storage health check failed after all retries".to_string())
    }))
}

fn print_answer(answer: &inq_core::Answer) {
    println!("\n{}\n", answer.text);
    if !answer.sources.is_empty() {
        println!("Sources:");
        for source in &answer.sources {
            println!("  - {} ({})", source.title, source.url);
        }
    }
}

async fn chat_loop(engine: &QaEngine) -> Result<()> {
    let mut history = ChatHistory::new();
    println!("Insurance QA (type 'quit' to exit)");
    println!("----------------------------------");

    let stdin = io::stdin();
    loop {
        print!("\nYour question: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question.to_lowercase().as_str(), "quit" | "exit") {
            break;
        }

        match engine.ask(question, &history).await {
            Ok(answer) => {
                print_answer(&answer);
                history.push(question.to_string(), &answer);
            }
            Err(e) => eprintln!("Error getting answer: {}", e),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    info!("💾 Initializing storage...");
    let storage = inq_storage::create_storage(&cli.storage, cli.backend_url.as_deref()).await?;
    check_storage_with_retry(&storage, &cli.storage, 3, Duration::from_secs(10)).await?;

    let model: Arc<dyn InferenceModel> = inq_inference::create_model(&cli.model, None).await?;
    info!("🧠 Inference model initialized (using {})", model.name());

    match cli.command {
        Commands::Ingest {
            source,
            max_articles,
            interval,
        } => {
            let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new());
            let manager = IngestManager::new(storage, model, fetcher)
                .with_splitter(TextSplitter::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP))
                .with_max_articles(max_articles);

            info!(
                "🕸️ Ingesting {}",
                source.as_deref().unwrap_or("all sources")
            );
            if let Some(interval) = interval {
                info!("Running in periodic mode every {}s", interval.0.as_secs());
                loop {
                    if let Err(e) = manager.ingest_source(source.as_deref()).await {
                        eprintln!("Error during ingestion: {}", e);
                    }
                    info!("Waiting {}s before next run", interval.0.as_secs());
                    tokio::time::sleep(interval.0).await;
                }
            } else {
                let report = manager.ingest_source(source.as_deref()).await?;
                println!(
                    "Ingested {} articles ({} chunks, {} failures)",
                    report.articles, report.chunks, report.failures
                );
            }
        }
        Commands::Sources => {
            let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new());
            let manager = IngestManager::new(storage, model, fetcher);
            for meta in manager.sources() {
                println!("{} {} — {}", meta.emoji, meta.name, meta.base_url);
            }
        }
        Commands::Ask { question } => {
            let engine = QaEngine::new(storage, model);
            let question = question.join(" ");
            let answer = engine.ask(&question, &ChatHistory::new()).await?;
            print_answer(&answer);
        }
        Commands::Chat => {
            let engine = QaEngine::new(storage, model);
            chat_loop(&engine).await?;
        }
        Commands::Serve { port } => {
            let engine = QaEngine::new(storage, model);
            inq_web::serve(inq_web::AppState::new(engine), port).await?;
        }
    }

    Ok(())
}
