//! simple_bank server
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌─────────────┐    ┌──────────┐
//! │  Config  │───▶│ Gateway  │───▶│ BankService │───▶│  Store   │
//! │  (YAML)  │    │  (axum)  │    │ (auth+rpc)  │    │ (PG/mem) │
//! └──────────┘    └──────────┘    └─────────────┘    └──────────┘
//! ```
//!
//! Usage: `simple_bank [--env dev] [--port 8080]`

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};

use simple_bank::config::AppConfig;
use simple_bank::db::Database;
use simple_bank::gateway::{self, AppState};
use simple_bank::rpc::BankService;
use simple_bank::store::{MemoryStore, PgStore, Store};
use simple_bank::token::build_token_maker;

fn get_env() -> String {
    arg_value(&["--env", "-e"]).unwrap_or_else(|| "dev".to_string())
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Result<Option<u16>> {
    arg_value(&["--port"])
        .map(|p| p.parse().with_context(|| format!("Invalid --port value: {}", p)))
        .transpose()
}

fn arg_value(names: &[&str]) -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    args.windows(2)
        .find(|pair| names.contains(&pair[0].as_str()))
        .map(|pair| pair[1].clone())
}

async fn open_store(config: &AppConfig) -> Result<Arc<dyn Store>> {
    match config.postgres_url.as_deref() {
        Some(url) => {
            let db = Database::connect(url)
                .await
                .context("Failed to connect to PostgreSQL")?;
            db.migrate().await.context("Failed to apply migrations")?;
            Ok(Arc::new(PgStore::new(db.pool().clone())))
        }
        None => {
            tracing::warn!("No postgres_url configured, using the in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env)?;
    let _log_guard = simple_bank::logging::init_logging(&config);

    tracing::info!(env = %env, git_hash = env!("GIT_HASH"), "Starting simple_bank");

    let store = open_store(&config).await?;
    let token_maker =
        build_token_maker(&config.token).context("Failed to build token maker")?;
    let service = BankService::from_config(store, token_maker, &config.token);
    let state = Arc::new(AppState::new(Arc::new(service)));

    let port = get_port_override()?.unwrap_or(config.gateway.port);
    let addr: SocketAddr = format!("{}:{}", config.gateway.host, port)
        .parse()
        .with_context(|| format!("Invalid gateway address {}:{}", config.gateway.host, port))?;

    gateway::run_server(addr, state)
        .await
        .with_context(|| format!("Gateway failed on {}", addr))?;
    tracing::info!("Server stopped");
    Ok(())
}
