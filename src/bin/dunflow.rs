use clap::{Parser, Subcommand};
use dunflow::compiler::loader::{load_config, load_event_from_file, load_flow_from_file, load_flows_from_dir};
use dunflow::config::EngineConfig;
use dunflow::runtime::engine::{Engine, RunRequest};
use dunflow::runtime::redis_storage::{RedisActionQueue, RedisRunStore};
use dunflow::runtime::run::{Flow, RunMode, RunOutcome};
use dunflow::runtime::storage::{ActionQueue, InMemoryActionQueue, InMemoryFlowRepository, InMemoryRunStore, RunStore};
use std::path::PathBuf;
use std::sync::Arc;
use anyhow::{Result, Context as AnyhowContext};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Engine config (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Persist runs and queue actions in Redis instead of memory
    #[arg(long, global = true)]
    redis: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one flow against one event (direct entry)
    Run {
        /// Flow file (YAML or JSON)
        #[arg(long, short)]
        flow: PathBuf,

        /// Event file (YAML or JSON)
        #[arg(long, short)]
        event: PathBuf,

        /// Simulate without halting on waits or enqueueing actions
        #[arg(long)]
        dry_run: bool,
    },

    /// Offer an event to every active flow of its org (broadcast entry)
    Dispatch {
        /// Directory of flow files
        #[arg(long)]
        flows: PathBuf,

        #[arg(long, short)]
        event: PathBuf,

        #[arg(long)]
        dry_run: bool,
    },
}

fn build_engine(flows: Vec<Flow>, config: EngineConfig) -> Result<Engine> {
    let repo = Arc::new(InMemoryFlowRepository::with_flows(flows));

    let (store, queue): (Arc<dyn RunStore>, Arc<dyn ActionQueue>) = match &config.redis_url {
        Some(url) => {
            info!("Persisting to Redis: {}", url);
            let client = redis::Client::open(url.as_str()).context("Invalid Redis URL")?;
            (
                Arc::new(RedisRunStore::new(client.clone())),
                Arc::new(RedisActionQueue::new(client, config.action_queue_key.clone())),
            )
        }
        None => (Arc::new(InMemoryRunStore::new()), Arc::new(InMemoryActionQueue::new())),
    };

    Engine::with_config(repo, store, queue, config).context("Invalid engine config")
}

fn mode(dry_run: bool) -> RunMode {
    if dry_run { RunMode::DryRun } else { RunMode::Live }
}

fn print_outcome(outcome: &RunOutcome) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(outcome)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    if cli.redis.is_some() {
        config.redis_url = cli.redis.clone();
    }

    match cli.command {
        Commands::Run { flow, event, dry_run } => {
            let flow = load_flow_from_file(&flow)?;
            let event = load_event_from_file(&event)?;
            info!("Loaded flow: {}", flow.id);

            let request = RunRequest::new(&flow.org_id, &flow.id, mode(dry_run), event);
            let engine = build_engine(vec![flow], config)?;
            let outcome = engine.run_flow(request).await?;
            print_outcome(&outcome)?;
        }

        Commands::Dispatch { flows, event, dry_run } => {
            let flows = load_flows_from_dir(&flows)?;
            let event = load_event_from_file(&event)?;
            info!("Loaded {} flows", flows.len());

            let org_id = event.org_id.clone();
            let engine = build_engine(flows, config)?;
            let outcomes = engine.dispatch_event(&org_id, &event, mode(dry_run)).await?;
            if outcomes.is_empty() {
                info!("No flow matched event '{}'", event.event_type);
            }
            for outcome in &outcomes {
                print_outcome(outcome)?;
            }
        }
    }

    Ok(())
}
