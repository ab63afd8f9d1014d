//! Chatlet terminal client entry point.
//!
//! Binary name: `chatlet`
//!
//! Wires the session engine together: file-backed state, session identity,
//! restored conversation, debounced persistence, the HTTP completion client,
//! and the interactive chat loop.

mod commands;
mod input;
mod repl;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use chatlet_core::controller::RequestController;
use chatlet_core::conversation::ConversationStore;
use chatlet_core::identity::SessionIdentity;
use chatlet_core::persist::gateway::PersistenceGateway;
use chatlet_core::persist::state::load_transcript;
use chatlet_infra::completion::HttpCompletionClient;
use chatlet_infra::config::load_config;
use chatlet_infra::state::FileStateStore;

#[derive(Parser)]
#[command(name = "chatlet", version, about = "Terminal client for the Chatlet chat demo")]
struct Cli {
    /// Completion endpoint URL (overrides config.toml).
    #[arg(long, env = "CHATLET_ENDPOINT")]
    endpoint: Option<String>,

    /// Data directory for config and persisted state (default: ~/.chatlet).
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,chatlet_core=debug,chatlet_infra=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("could not determine a home directory; pass --data-dir"))?
            .join(".chatlet"),
    };

    let mut config = load_config(&data_dir).await;
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }

    let state = Arc::new(FileStateStore::new(data_dir));

    let session_id = SessionIdentity::new(state.clone()).get_or_create().await;
    tracing::debug!(%session_id, "session identity resolved");

    let persisted = load_transcript(state.as_ref()).await;
    let store = ConversationStore::restore(persisted, &config.welcome_message);
    let events = store.subscribe();
    let store = Arc::new(Mutex::new(store));

    let shutdown = CancellationToken::new();
    let gateway = PersistenceGateway::new(
        state.clone(),
        store.clone(),
        Duration::from_millis(config.persist_debounce_ms),
        config.history_limit,
        shutdown.clone(),
    );
    let gateway_handle = gateway.spawn(events);

    let provider = Arc::new(HttpCompletionClient::new(&config, session_id));
    let controller = RequestController::new(provider, store);

    let result = repl::run(&controller, &config.endpoint).await;

    // Flush any pending durable write before exiting.
    shutdown.cancel();
    let _ = gateway_handle.await;

    result
}
