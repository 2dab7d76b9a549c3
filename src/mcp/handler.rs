//! # MCP Handler Module
//!
//! Implements the Model Context Protocol for the Mind Network agent server.
//! Incoming requests are dispatched to the tools below.
//!
//! ## Supported Tools
//!
//! ### Wallet Session
//! - `connectWallet` / `disconnectWallet` - Connect a local signer or drop it
//! - `getAccountInfo` - Connected address, chain and status
//! - `get-chain-id` / `get-chains` / `switchChain` - Chain selection
//!
//! ### Agent Reads
//! - `getAgentId`, `getStakeAmount`, `getClaimableReward`, `getFheBalance`
//! - `listHubs`, `getCurrentHub`
//!
//! ### Agent Actions
//! - `burn`, `claimReward`, `stakeFHE`, `unstakeFHE`
//! - `trainInHub`, `switchHub`, `exitHub`
//!
//! Every tool answers with `{ content: [{ type: "text", text }], isError }`.
//! Malformed arguments are JSON-RPC errors; everything else, including
//! failed operations, is a tool result.

use ethers::types::Address;
use ethers::utils::to_checksum;
use secrecy::SecretString;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::{
    agent::OperationResult,
    config::chain_name,
    mcp::{
        protocol::{error_codes, Request, Response},
        session_store::wallet_from_key,
        tools::tool_definitions,
    },
    utils, AppState,
};

const DEFAULT_WALLET_NAME: &str = "default";

/// This is the main dispatcher for all incoming MCP requests.
pub async fn handle_mcp_request(req: Request, state: AppState) -> Option<Response> {
    info!("Handling MCP request for method: {}", req.method);

    if req.is_notification() {
        return None;
    }

    let response = match req.method.as_str() {
        "initialize" => handle_initialize(&req),
        "tools/list" => handle_tools_list(&req),
        "tools/call" => handle_tool_call(req, state).await,
        "ping" => Response::success(req.id, json!({})),
        _ => Response::error(
            req.id,
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", req.method),
        ),
    };

    Some(response)
}

fn tool_response(req_id: &Value, result: OperationResult) -> Response {
    Response::success(req_id.clone(), result.to_tool_result())
}

fn tool_failure(req_id: &Value, text: impl Into<String>) -> Response {
    tool_response(req_id, OperationResult::failure(text))
}

fn address_arg(args: &Value, req_id: &Value) -> Result<Address, Response> {
    let raw = utils::get_required_arg::<String>(args, "address", req_id)?;
    utils::parse_address(&raw).map_err(|e| {
        Response::error(req_id.clone(), error_codes::INVALID_PARAMS, e.to_string())
    })
}

/// Address for a state-changing tool. It must be the connected wallet, since
/// that wallet signs or sends on its behalf.
async fn action_user(state: &AppState, args: &Value, req_id: &Value) -> Result<Address, Response> {
    let user = address_arg(args, req_id)?;
    match state.session.address().await {
        Some(connected) if connected != user => Err(tool_failure(
            req_id,
            format!(
                "Address {} is not the connected wallet {}.",
                to_checksum(&user, None),
                to_checksum(&connected, None)
            ),
        )),
        _ => Ok(user),
    }
}

fn chain_summary(state: &AppState, chain_id: u64) -> Value {
    json!({
        "id": chain_id,
        "name": chain_name(chain_id),
        "rpcUrl": state.config.chain_rpc_urls.get(&chain_id),
        "strategy": format!("{:?}", state.operations.strategy().select(chain_id)).to_lowercase(),
    })
}

/// Handles a 'tools/call' request by dispatching it to the correct tool logic.
async fn handle_tool_call(req: Request, state: AppState) -> Response {
    let params = match req.params.as_ref() {
        Some(p) => p,
        None => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing 'params' object".into(),
            )
        }
    };

    let tool_name = match params.get("name").and_then(|n| n.as_str()) {
        Some(name) => name,
        None => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing 'name' field in params".into(),
            )
        }
    };

    let empty_args = json!({});
    let args = params.get("arguments").unwrap_or(&empty_args);
    let req_id = &req.id;
    let ops = &state.operations;

    match tool_name {
        // --- Wallet session ---
        "connectWallet" => {
            let res: Result<Response, Response> = (async {
                let private_key = utils::get_optional_arg::<String>(args, "private_key", req_id)?;
                let wallet_name = utils::get_optional_arg::<String>(args, "wallet_name", req_id)?
                    .unwrap_or_else(|| DEFAULT_WALLET_NAME.to_string());
                let master_password = utils::get_optional_arg::<String>(args, "master_password", req_id)?
                    .or_else(|| state.config.master_password.clone())
                    .map(SecretString::new);
                let requested_chain = match args.get("chain_id") {
                    None | Some(Value::Null) => None,
                    Some(_) => Some(utils::get_u64_arg(args, "chain_id", req_id)?),
                };
                if let Some(chain_id) = requested_chain {
                    if !state.config.is_chain_supported(chain_id) {
                        return Err(tool_failure(req_id, format!("Unsupported chain: {}", chain_id)));
                    }
                }

                let (wallet, chain_id) = match private_key {
                    Some(key) => {
                        let key = SecretString::new(key);
                        let wallet = wallet_from_key(&key).map_err(|e| tool_failure(req_id, e.to_string()))?;
                        let chain_id = requested_chain.unwrap_or(state.config.default_chain_id);
                        if let (Some(password), Some(store)) = (&master_password, &state.session_store) {
                            store
                                .lock()
                                .await
                                .store(&wallet_name, &key, chain_id, password)
                                .map_err(|e| tool_failure(req_id, format!("Failed to store session: {}", e)))?;
                        }
                        (wallet, chain_id)
                    }
                    None => {
                        let store = state.session_store.as_ref().ok_or_else(|| {
                            tool_failure(req_id, "No session store configured; pass a private_key to connect.")
                        })?;
                        let password = master_password.as_ref().ok_or_else(|| {
                            tool_failure(req_id, "A master_password is required to unlock the stored session.")
                        })?;
                        let (wallet, stored_chain) = store
                            .lock()
                            .await
                            .unlock(password)
                            .map_err(|e| tool_failure(req_id, e.to_string()))?;
                        (wallet, requested_chain.unwrap_or(stored_chain))
                    }
                };

                let address = state.session.connect(wallet, chain_id).await;
                info!("wallet {:?} connected on chain {}", address, chain_id);
                Ok(tool_response(
                    req_id,
                    OperationResult::success(
                        json!({
                            "address": to_checksum(&address, None),
                            "chainId": chain_id,
                            "status": "connected",
                        })
                        .to_string(),
                    ),
                ))
            })
            .await;
            res.unwrap_or_else(|err_resp| err_resp)
        }
        "disconnectWallet" => {
            state.session.disconnect().await;
            if let Some(store) = &state.session_store {
                if let Err(e) = store.lock().await.clear() {
                    warn!("failed to clear stored session: {}", e);
                    return tool_failure(req_id, format!("Disconnected, but the stored session could not be removed: {}", e));
                }
            }
            tool_response(req_id, OperationResult::success("Disconnect successfully"))
        }
        "getAccountInfo" => {
            let address = state.session.address().await;
            let info = json!({
                "address": address.map(|a| to_checksum(&a, None)),
                "chainId": state.session.chain_id().await,
                "status": if address.is_some() { "connected" } else { "disconnected" },
            });
            tool_response(req_id, OperationResult::success(info.to_string()))
        }
        "get-chain-id" => match state.session.chain_id().await {
            Some(chain_id) => tool_response(req_id, OperationResult::success(chain_id.to_string())),
            None => tool_failure(req_id, "Please specify a chain ID."),
        },
        "get-chains" => {
            let chains: Vec<Value> = state
                .config
                .supported_chains()
                .into_iter()
                .map(|chain_id| chain_summary(&state, chain_id))
                .collect();
            tool_response(req_id, OperationResult::success(Value::Array(chains).to_string()))
        }
        "switchChain" => {
            let res: Result<Response, Response> = (async {
                let chain_id = utils::get_u64_arg(args, "chainId", req_id)?;
                if !state.config.is_chain_supported(chain_id) {
                    return Err(tool_failure(req_id, format!("Unsupported chain: {}", chain_id)));
                }
                state.session.switch_chain(chain_id).await;
                if let Some(store) = &state.session_store {
                    if let Err(e) = store.lock().await.set_chain(chain_id) {
                        warn!("failed to persist chain switch: {}", e);
                    }
                }
                info!("switched to chain {}", chain_id);
                Ok(tool_response(
                    req_id,
                    OperationResult::success(chain_summary(&state, chain_id).to_string()),
                ))
            })
            .await;
            res.unwrap_or_else(|err_resp| err_resp)
        }

        // --- Agent reads ---
        "getAgentId" | "getStakeAmount" | "getClaimableReward" | "getFheBalance" | "getCurrentHub" => {
            let res: Result<Response, Response> = (async {
                let address = address_arg(args, req_id)?;
                let result = match tool_name {
                    "getAgentId" => ops.get_agent_id(address).await,
                    "getStakeAmount" => ops.get_stake_amount(address).await,
                    "getClaimableReward" => ops.get_claimable_reward(address).await,
                    "getFheBalance" => ops.get_fhe_balance(address).await,
                    _ => ops.get_current_hub(address).await,
                };
                Ok(tool_response(req_id, result))
            })
            .await;
            res.unwrap_or_else(|err_resp| err_resp)
        }
        "listHubs" => tool_response(req_id, ops.list_hubs().await),

        // --- Agent actions ---
        "burn" | "claimReward" | "exitHub" => {
            let res: Result<Response, Response> = (async {
                let user = action_user(&state, args, req_id).await?;
                let result = match tool_name {
                    "burn" => ops.burn(user).await,
                    "claimReward" => ops.claim_reward(user).await,
                    _ => ops.exit_hub(user).await,
                };
                Ok(tool_response(req_id, result))
            })
            .await;
            res.unwrap_or_else(|err_resp| err_resp)
        }
        "stakeFHE" | "unstakeFHE" => {
            let res: Result<Response, Response> = (async {
                let user = action_user(&state, args, req_id).await?;
                let amount = utils::get_numeric_arg(args, "amount", req_id)?;
                let result = if tool_name == "stakeFHE" {
                    ops.stake(user, &amount).await
                } else {
                    ops.unstake(user, &amount).await
                };
                Ok(tool_response(req_id, result))
            })
            .await;
            res.unwrap_or_else(|err_resp| err_resp)
        }
        "trainInHub" | "switchHub" => {
            let res: Result<Response, Response> = (async {
                let user = action_user(&state, args, req_id).await?;
                let hub_id = utils::get_u64_arg(args, "hubId", req_id)?;
                let need_sign = utils::get_optional_arg::<bool>(args, "needSign", req_id)?.unwrap_or(false);
                let result = if tool_name == "trainInHub" {
                    ops.train_in_hub(user, hub_id, need_sign).await
                } else {
                    ops.switch_hub(user, hub_id, need_sign).await
                };
                Ok(tool_response(req_id, result))
            })
            .await;
            res.unwrap_or_else(|err_resp| err_resp)
        }

        _ => Response::error(
            req.id.clone(),
            error_codes::METHOD_NOT_FOUND,
            format!("Unknown tool: {}", tool_name),
        ),
    }
}

/// Handles the 'initialize' request.
fn handle_initialize(req: &Request) -> Response {
    let server_info = json!({
        "name": "mind-agent-mcp-server",
        "version": env!("CARGO_PKG_VERSION")
    });
    let capabilities = json!({ "tools": { "listChanged": false } });
    let instructions = "Mind Network agent server: stake FHE, train agents in hubs and claim rewards. \
        Connect a wallet and pick a chain (Mind Network Mainnet 228, Testnet 192940, BNB Smart Chain 56) first.";

    Response::success(
        req.id.clone(),
        json!({
            "serverInfo": server_info,
            "protocolVersion": "2025-06-18",
            "capabilities": capabilities,
            "instructions": instructions
        }),
    )
}

/// Handles the 'tools/list' request.
fn handle_tools_list(req: &Request) -> Response {
    Response::success(req.id.clone(), json!({ "tools": tool_definitions() }))
}
