// src/main.rs

use std::env;
use std::net::SocketAddr;

use anyhow::Context;
use mind_agent_mcp_server::{
    api,
    blockchain::Signer,
    config::{chain_name, Config},
    mcp::{
        handler::handle_mcp_request,
        protocol::{error_codes, Request, Response},
        session_store::wallet_from_key,
    },
    AppState,
};
use secrecy::SecretString;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// --- HTTP Server Logic ---
async fn run_http_server(state: AppState) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], state.config.port));
    let app = api::router(state);

    info!("🚀 HTTP Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .context("HTTP server error")
}

// --- MCP Server Logic ---
async fn run_mcp_server(state: AppState) {
    info!("🚀 Starting MCP server on stdin/stdout...");

    let mut stdin = io::BufReader::new(io::stdin());
    let mut stdout = io::stdout();

    loop {
        let mut line = String::new();

        match stdin.read_line(&mut line).await {
            Ok(0) => {
                info!("EOF received, shutting down MCP server");
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                debug!("Received: {}", line);

                let response = match serde_json::from_str::<Request>(line) {
                    Ok(request) => handle_mcp_request(request, state.clone()).await,
                    Err(parse_error) => {
                        error!("JSON parse error: {}", parse_error);
                        Some(Response::error(
                            serde_json::Value::Null,
                            error_codes::PARSE_ERROR,
                            format!("Parse error: {}", parse_error),
                        ))
                    }
                };

                if let Some(response) = response {
                    if let Ok(response_json) = serde_json::to_string(&response) {
                        debug!("Sending: {}", response_json);
                        let written = stdout
                            .write_all(format!("{}\n", response_json).as_bytes())
                            .await;
                        if let Err(e) = written.and(stdout.flush().await) {
                            error!("Failed to write response: {}", e);
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                error!("Failed to read from stdin: {}", e);
                break;
            }
        }
    }

    info!("MCP server shutting down");
}

/// Restores a wallet at startup: `WALLET_PRIVATE_KEY` wins, otherwise the
/// stored session is unlocked with `MASTER_PASSWORD`. Without either the
/// server starts disconnected on the default chain.
async fn restore_wallet(state: &AppState) {
    let config = &state.config;

    if let Some(key) = &config.wallet_private_key {
        match wallet_from_key(&SecretString::new(key.clone())) {
            Ok(wallet) => {
                let address = state.session.connect(wallet, config.default_chain_id).await;
                info!("Wallet {:?} connected from WALLET_PRIVATE_KEY", address);
            }
            Err(e) => warn!("Ignoring WALLET_PRIVATE_KEY: {}", e),
        }
        return;
    }

    if let (Some(store), Some(password)) = (&state.session_store, &config.master_password) {
        let store = store.lock().await;
        if store.session().is_some() {
            match store.unlock(&SecretString::new(password.clone())) {
                Ok((wallet, chain_id)) => {
                    let address = wallet.address();
                    state.session.connect(wallet, chain_id).await;
                    info!("Restored wallet {:?} on chain {} from {}", address, chain_id, store.path().display());
                    return;
                }
                Err(e) => warn!("Could not unlock stored session: {}", e),
            }
        }
    }

    state.session.switch_chain(config.default_chain_id).await;
}

#[tokio::main]
async fn main() {
    // Initialize tracing; stdout is reserved for MCP frames
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mind_agent_mcp_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("❌ Failed to load configuration: {:#}", e);
            return;
        }
    };
    for chain_id in config.supported_chains() {
        info!(
            "Chain {} ({}): relayer={} deployment={}",
            chain_id,
            chain_name(chain_id),
            config.relayer_chain_ids.contains(&chain_id),
            config.deployments.contains_key(&chain_id)
        );
    }

    let app_state = match AppState::from_config(config) {
        Ok(state) => state,
        Err(e) => {
            error!("❌ Failed to initialize server: {:#}", e);
            return;
        }
    };
    restore_wallet(&app_state).await;

    // Check if running in MCP mode (stdin/stdout) or HTTP server mode
    let args: Vec<String> = env::args().collect();
    if args.contains(&"--mcp".to_string()) || env::var("MCP_MODE").is_ok() {
        run_mcp_server(app_state).await;
    } else if let Err(e) = run_http_server(app_state).await {
        error!("❌ {:#}", e);
    }
}
