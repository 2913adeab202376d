//! Gitlore command-line entry point.
//!
//! Logs go to stderr; every command writes its result to stdout as JSON.

use anyhow::Context;
use clap::{Parser, Subcommand};
use gitlore_memory::{create_provider, MemoryStore, VectorEngine};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gitlore_miner::analyzer;
use gitlore_miner::extraction::{
    ChatEnricher, CommitSnapshot, CommitSource, ExtractionEngine, StaticCommitSource,
    StoreMaterializer,
};
use gitlore_miner::{parse_commit_message, parse_diff, BatchMiner, GitCommitSource, MinerConfig};

const DEFAULT_LIMIT: usize = 20;
const DEFAULT_FAN_OUT: usize = 4;

#[derive(Parser)]
#[command(name = "gitlore")]
#[command(about = "Mine git history into searchable memories")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a unified diff and print the file sections
    ParseDiff {
        /// Diff file (reads stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Summarize a unified diff: totals, complexity and patterns
    Analyze {
        /// Diff file (reads stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Classify a commit message
    Classify { message: String },

    /// Show the drafts a commit message and diff would produce
    Extract {
        /// Full commit message
        #[arg(long, short)]
        message: String,

        /// Diff file (reads stdin when omitted)
        file: Option<PathBuf>,

        /// JSON config file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Extract memories from commits of a local repository
    Mine {
        /// Repository directory
        #[arg(long, short, default_value = ".")]
        repo: PathBuf,

        /// Revision to mine; repeatable. Defaults to the most recent commits
        #[arg(long = "commit", short)]
        commits: Vec<String>,

        /// Number of recent commits when no revision is given
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,

        /// Commits extracted concurrently
        #[arg(long, default_value_t = DEFAULT_FAN_OUT)]
        fan_out: usize,

        /// JSON config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory for the memory snapshot (in-memory when omitted)
        #[arg(long)]
        store: Option<PathBuf>,

        /// Print drafts instead of storing them
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gitlore_miner=info,gitlore_memory=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(args.command).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::ParseDiff { file } => {
            let outcome = parse_diff(&read_input(file.as_deref())?);
            print_json(&outcome)
        }
        Command::Analyze { file } => {
            let outcome = parse_diff(&read_input(file.as_deref())?);
            print_json(&analyzer::summarize(&outcome.diffs))
        }
        Command::Classify { message } => print_json(&parse_commit_message(&message)),
        Command::Extract {
            message,
            file,
            config,
        } => {
            let config = MinerConfig::load(config.as_deref())?;
            let diff = read_input(file.as_deref())?;
            let (snapshot, warnings) = CommitSnapshot::new("0000000", message).with_diff(diff);
            for warning in &warnings {
                tracing::warn!(line = warning.line, "{}", warning.message);
            }

            let source = Arc::new(StaticCommitSource::new().with(snapshot.clone()));
            let engine = ExtractionEngine::drafting(config.extraction, source)?;
            print_json(&engine.draft(&snapshot))
        }
        Command::Mine {
            repo,
            commits,
            limit,
            fan_out,
            config,
            store,
            dry_run,
        } => {
            let config = MinerConfig::load(config.as_deref())?;
            let source = Arc::new(
                GitCommitSource::open(&repo)
                    .with_context(|| format!("Cannot mine {}", repo.display()))?,
            );
            let commits = if commits.is_empty() {
                source.recent_commits(limit).await?
            } else {
                commits
            };
            tracing::info!("Mining {} commit(s) in {}", commits.len(), repo.display());

            if dry_run {
                let engine = ExtractionEngine::drafting(config.extraction, source.clone())?;
                let mut drafts = Vec::new();
                for commit in &commits {
                    let snapshot = source.load(commit).await?;
                    drafts.extend(engine.draft(&snapshot));
                }
                return print_json(&drafts);
            }

            let store = Arc::new(match store {
                Some(dir) => MemoryStore::open(dir)?,
                None => MemoryStore::in_memory(),
            });
            let engine = build_engine(&config, source, Arc::clone(&store))?;
            let batch = BatchMiner::new(Arc::new(engine)).mine(&commits, fan_out).await;
            for warning in &batch.warnings {
                tracing::warn!("{}", warning);
            }
            if store.save().await? {
                tracing::info!("Saved {} memories", store.len());
            }
            print_json(&batch)
        }
    }
}

fn build_engine(
    config: &MinerConfig,
    source: Arc<dyn CommitSource>,
    store: Arc<MemoryStore>,
) -> anyhow::Result<ExtractionEngine> {
    let materializer = if config.embeddings_enabled() {
        let provider = create_provider(&config.embedding)?;
        StoreMaterializer::new(store, Arc::new(VectorEngine::new(provider)))
    } else {
        StoreMaterializer::without_embeddings(store)
    };

    let mut engine =
        ExtractionEngine::new(config.extraction.clone(), source, Arc::new(materializer))?;
    if config.extraction.enrichment_enabled {
        engine = engine.with_enricher(Arc::new(ChatEnricher::new(&config.enrichment)?));
    }
    Ok(engine)
}

fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
