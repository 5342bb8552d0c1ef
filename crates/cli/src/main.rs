use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use cli::{render, repl};
use policy_core::config::{self, AppConfig};
use policy_core::{registry, scanner, Session};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Answers go to stdout; logs stay on stderr.
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let mut cfg = config::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Chat { docs } => {
            let json = docs.json;
            let session = open_session(&mut cfg, docs).await?;
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            repl::run(&session, stdin.lock(), &mut stdout, json).await
        }
        Commands::Ask { docs, question } => {
            let json = docs.json;
            let session = open_session(&mut cfg, docs).await?;
            let outcome = session.ask(&question).await?;
            let mut stdout = io::stdout();
            render::write_outcome(&mut stdout, &outcome, json)?;
            stdout.flush()?;
            Ok(())
        }
    }
}

#[derive(Parser)]
#[command(name = "policy-bot")]
#[command(about = "Answer questions from policy documents with cited excerpts", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest documents, then answer questions interactively
    Chat {
        #[command(flatten)]
        docs: DocArgs,
    },
    /// Ingest documents and answer a single question
    Ask {
        #[command(flatten)]
        docs: DocArgs,
        /// Question to answer
        #[arg(short, long)]
        question: String,
    },
}

#[derive(Args)]
struct DocArgs {
    /// PDF or text files, or directories to walk
    #[arg(required = true, num_args = 1..)]
    paths: Vec<PathBuf>,
    /// Glob patterns to skip while walking directories
    #[arg(long)]
    exclude: Vec<String>,
    /// Output JSON
    #[arg(long)]
    json: bool,
    /// Number of passages to retrieve
    #[arg(long)]
    top_k: Option<usize>,
    /// Highest accepted distance for the closest passage
    #[arg(long)]
    threshold: Option<f32>,
}

async fn open_session(cfg: &mut AppConfig, docs: DocArgs) -> Result<Session> {
    if let Some(k) = docs.top_k {
        cfg.retrieval.top_k = k;
    }
    if let Some(t) = docs.threshold {
        cfg.retrieval.guardrail_threshold = t;
    }
    cfg.validate()?;

    let registry = registry::build_registry(cfg);
    let provider = registry::select_embedding(&registry)?;

    let mut excludes = cfg.scan.exclude.clone();
    excludes.extend(docs.exclude);
    let paths = scanner::collect_documents(&docs.paths, &excludes)?;

    let mut session = Session::new(cfg, provider)?;
    info!(model = session.model_name(), "embedding provider ready");
    let report = session.ingest(&paths).await.context("ingesting documents")?;
    render::write_report(&mut io::stdout(), &report, docs.json)?;
    Ok(session)
}
