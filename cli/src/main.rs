mod chat;
mod error;
mod generate;
mod output;

use std::path::PathBuf;

use agent::cache::ResultCache;
use agent::paper::DEFAULT_CHAT_TEMPERATURE;
use agent::relay::{DEFAULT_RELAY_URL, RelayClient};
use agent::sources::arxiv::{ArxivClient, DEFAULT_ARXIV_API_URL};
use agent::{DEFAULT_TEMPERATURE, GenerationRequest, WritingStyle};
use clap::{Args, Parser, Subcommand};
use tokio::io::BufReader;

use crate::chat::ChatSession;
use crate::error::CliError;
use crate::generate::{BATCH_DELAY, Outcome, Pipeline};
use crate::output::{DEFAULT_OUTPUT_FOLDER, PostWriter};

#[derive(Parser, Debug)]
#[command(name = "obsixiv", about = "Turn research paper PDFs into blog posts through an ObsiXiv relay")]
struct Cli {
    #[arg(long, env = "OBSIXIV_RELAY_URL", default_value = DEFAULT_RELAY_URL)]
    relay_url: String,

    #[arg(long, env = "OBSIXIV_API_KEY", default_value = "", hide_env_values = true)]
    api_key: String,

    /// Result cache file. Defaults to the user cache directory.
    #[arg(long, env = "OBSIXIV_CACHE_FILE")]
    cache_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate one blog post per PDF.
    Generate(GenerateArgs),
    /// Ask questions about a PDF.
    Chat(ChatArgs),
    #[command(subcommand)]
    Cache(CacheCommand),
    /// Check that the relay is up.
    Health,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[arg(required = true)]
    pdfs: Vec<PathBuf>,

    #[arg(long, short, env = "OBSIXIV_OUTPUT_FOLDER", default_value = DEFAULT_OUTPUT_FOLDER)]
    output: PathBuf,

    #[arg(long, default_value_t = DEFAULT_TEMPERATURE, value_parser = parse_temperature)]
    temperature: f64,

    /// alphaxiv, technical, casual or academic.
    #[arg(long, default_value = "alphaxiv")]
    style: String,

    #[arg(long)]
    no_emojis: bool,

    #[arg(long)]
    no_humor: bool,

    #[arg(long, default_value = "")]
    custom_prompt: String,

    #[arg(long)]
    no_cache: bool,

    /// Skip the arXiv metadata lookup.
    #[arg(long)]
    no_arxiv: bool,

    #[arg(long, env = "ARXIV_API_URL", default_value = DEFAULT_ARXIV_API_URL)]
    arxiv_url: String,

    /// Replace an existing post file for the same day.
    #[arg(long)]
    overwrite: bool,
}

#[derive(Args, Debug)]
struct ChatArgs {
    pdf: PathBuf,

    /// Ask once and exit instead of reading questions from stdin.
    #[arg(long, short)]
    question: Option<String>,

    #[arg(long, default_value_t = DEFAULT_CHAT_TEMPERATURE, value_parser = parse_temperature)]
    temperature: f64,
}

#[derive(Subcommand, Debug)]
enum CacheCommand {
    Stats,
    Clear,
}

fn parse_temperature(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.parse().map_err(|_| format!("not a number: {raw}"))?;
    if (0.0..=2.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("temperature must be between 0 and 2, got {value}"))
    }
}

fn default_cache_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("obsixiv")
        .join("cache.json")
}

impl GenerateArgs {
    fn template(&self) -> GenerationRequest {
        let mut request = GenerationRequest::new("");
        request.temperature = self.temperature;
        request.flags.include_emojis = !self.no_emojis;
        request.flags.include_humor = !self.no_humor;
        request.custom_prompt.clone_from(&self.custom_prompt);
        request.writing_style = WritingStyle::from_name(&self.style);
        request
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let cache_path = cli.cache_file.clone().unwrap_or_else(default_cache_path);

    match cli.command {
        Command::Generate(args) => run_generate(&cli.relay_url, &cli.api_key, cache_path, args).await,
        Command::Chat(args) => run_chat(&cli.relay_url, &cli.api_key, args).await,
        Command::Cache(command) => run_cache(cache_path, command),
        Command::Health => run_health(&cli.relay_url).await,
    }
}

async fn run_generate(relay_url: &str, api_key: &str, cache_path: PathBuf, args: GenerateArgs) -> Result<(), CliError> {
    if api_key.trim().is_empty() {
        return Err(CliError::MissingApiKey);
    }
    let relay = RelayClient::new(relay_url)?;
    let writer = PostWriter::new(&args.output, args.overwrite);
    let mut pipeline = Pipeline::new(relay, writer, api_key, args.template());
    if !args.no_arxiv {
        let http = reqwest::Client::builder()
            .user_agent(concat!("obsixiv/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CliError::HttpClientBuild(e.to_string()))?;
        pipeline = pipeline.with_arxiv(ArxivClient::new(http, args.arxiv_url.clone()));
    }
    if !args.no_cache {
        pipeline = pipeline.with_cache(ResultCache::load(cache_path)?);
    }

    if let [pdf] = args.pdfs.as_slice() {
        let outcome = pipeline.process(pdf).await?;
        match &outcome {
            Outcome::Cached(_) => eprintln!("✨ Using cached result!"),
            Outcome::Generated(_) | Outcome::NotStored { .. } => eprintln!("✨ Blog post generated successfully!"),
        }
        if let Some(warning) = outcome.warning() {
            eprintln!("{warning}");
        }
        println!("{}", outcome.path().display());
        return Ok(());
    }

    let total = args.pdfs.len();
    eprintln!("Starting batch processing of {total} PDFs...");
    let summary = pipeline.run_batch(&args.pdfs, BATCH_DELAY).await;
    eprintln!("✅ Batch complete! {} successful, {} failed", summary.succeeded, summary.failed);
    if summary.failed > 0 {
        return Err(CliError::BatchFailed { failed: summary.failed, total });
    }
    Ok(())
}

async fn run_chat(relay_url: &str, api_key: &str, args: ChatArgs) -> Result<(), CliError> {
    let relay = RelayClient::new(relay_url)?;
    eprintln!("Loading PDF...");
    let session = ChatSession::load(relay, api_key, &args.pdf, args.temperature).await?;

    if let Some(question) = args.question {
        println!("{}", session.ask(&question).await?);
        return Ok(());
    }

    eprintln!("PDF loaded! Ask me anything. Type `exit` to leave.");
    session
        .repl(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
        .map_err(CliError::io(&args.pdf))?;
    Ok(())
}

fn run_cache(cache_path: PathBuf, command: CacheCommand) -> Result<(), CliError> {
    let mut cache = ResultCache::load(cache_path)?;
    match command {
        CacheCommand::Stats => {
            println!("path: {}", cache.path().display());
            println!("entries: {}", cache.len());
        }
        CacheCommand::Clear => {
            cache.clear()?;
            println!("✅ Cache cleared!");
        }
    }
    Ok(())
}

async fn run_health(relay_url: &str) -> Result<(), CliError> {
    let health = RelayClient::new(relay_url)?.health().await?;
    println!("{} {} {} ({relay_url})", health.status, health.service, health.version);
    Ok(())
}
