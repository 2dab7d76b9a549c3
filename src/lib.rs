// src/lib.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::Mutex;

// Re-export commonly used types
pub use ethers::types::{Address, H256, U256};

pub mod agent;
pub mod api;
pub mod blockchain;
pub mod config;
pub mod mcp;
pub mod utils;

use agent::{AgentOperations, RelayerClient};
use blockchain::{ChainGateway, EvmClient, WalletSession};
use config::Config;
use mcp::session_store::SessionStore;

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Immutable configuration, loaded once at startup
    pub config: Arc<Config>,
    /// Connected wallet and active chain
    pub session: WalletSession,
    /// Agent tools (dispatchers and read-only queries)
    pub operations: AgentOperations,
    /// Encrypted wallet session on disk, when a store path is configured
    pub session_store: Option<Arc<Mutex<SessionStore>>>,
}

impl AppState {
    /// Wires the components around an already-built chain gateway.
    pub fn new(
        config: Config,
        session: WalletSession,
        gateway: Arc<dyn ChainGateway>,
        relayer: RelayerClient,
        session_store: Option<SessionStore>,
    ) -> Self {
        let config = Arc::new(config);
        let operations = AgentOperations::new(config.clone(), session.clone(), gateway, relayer);
        Self {
            config,
            session,
            operations,
            session_store: session_store.map(|store| Arc::new(Mutex::new(store))),
        }
    }

    /// Production wiring: ethers providers for every configured chain and
    /// the relayer client from `config`.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let session = WalletSession::new();
        let gateway: Arc<dyn ChainGateway> =
            Arc::new(EvmClient::new(&config.chain_rpc_urls, session.clone()));
        let relayer = RelayerClient::from_config(&config)?;

        let session_store = match &config.session_store_path {
            Some(path) => Some(
                SessionStore::load(PathBuf::from(path))
                    .with_context(|| format!("Failed to open session store at {}", path))?,
            ),
            None => None,
        };

        Ok(Self::new(config, session, gateway, relayer, session_store))
    }
}
