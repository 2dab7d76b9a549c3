// src/config.rs

use std::collections::{BTreeSet, HashMap};
use std::env;

use anyhow::{Context, Result};
use ethers::types::Address;
use serde::{Deserialize, Serialize};

use crate::agent::error::OperationError;

/// Mind Network mainnet.
pub const MAINNET_ID: u64 = 228;
/// Mind Network testnet.
pub const TESTNET_ID: u64 = 192940;
/// BNB Smart Chain, served through the direct path.
pub const BSC_ID: u64 = 56;

const DEFAULT_RELAYER_BASE_URL: &str = "https://mcp-api.mindnetwork.xyz";
const DEFAULT_RELAYER_API_VERSION: &str = "0.1.0";

/// Contract addresses deployed on one chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDeployment {
    /// Agent NFT contract (staking, hubs, rewards).
    pub agent: Address,
    /// FHE ERC-20 token with EIP-2612 permit.
    pub fhe_token: Address,
    /// Verifying contract for relayer authorizations.
    pub sig_verify: Address,
    /// Read-only reward inspector.
    pub dao_inspector: Address,
}

// A struct to hold all configuration, loaded once at startup from the .env file.
#[derive(Clone, Debug)]
pub struct Config {
    // Server settings
    pub port: u16,

    /// RPC endpoint per chain id. Only chains listed here can be selected.
    pub chain_rpc_urls: HashMap<u64, String>,
    /// Chain selected when a wallet connects without naming one.
    pub default_chain_id: u64,
    /// Contract tables per chain id.
    pub deployments: HashMap<u64, ChainDeployment>,

    // Relayer settings
    pub relayer_chain_ids: BTreeSet<u64>,
    pub relayer_base_url: String,
    pub relayer_api_version: String,
    pub relayer_timeout_secs: u64,

    // Wallet session settings
    pub wallet_private_key: Option<String>,
    pub session_store_path: Option<String>,
    pub master_password: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            chain_rpc_urls: default_rpc_urls(),
            default_chain_id: MAINNET_ID,
            deployments: HashMap::new(),
            relayer_chain_ids: [MAINNET_ID, TESTNET_ID].into_iter().collect(),
            relayer_base_url: DEFAULT_RELAYER_BASE_URL.to_string(),
            relayer_api_version: DEFAULT_RELAYER_API_VERSION.to_string(),
            relayer_timeout_secs: 30,
            wallet_private_key: None,
            session_store_path: None,
            master_password: None,
        }
    }
}

fn default_rpc_urls() -> HashMap<u64, String> {
    HashMap::from([
        (MAINNET_ID, "https://rpc-mainnet.mindnetwork.xyz".to_string()),
        (TESTNET_ID, "https://rpc-testnet.mindnetwork.xyz".to_string()),
        (BSC_ID, "https://bsc-dataseed.bnbchain.org".to_string()),
    ])
}

/// Human readable name for the chains this server knows about.
pub fn chain_name(chain_id: u64) -> &'static str {
    match chain_id {
        MAINNET_ID => "Mind Network Mainnet",
        TESTNET_ID => "Mind Network Testnet",
        BSC_ID => "BNB Smart Chain",
        97 => "BNB Smart Chain Testnet",
        _ => "Custom EVM Chain",
    }
}

impl Config {
    /// Returns the configured chain ids in ascending order
    pub fn supported_chains(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.chain_rpc_urls.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Checks if a chain ID is supported
    pub fn is_chain_supported(&self, chain_id: u64) -> bool {
        self.chain_rpc_urls.contains_key(&chain_id)
    }

    /// Contract table for `chain_id`.
    pub fn deployment(&self, chain_id: u64) -> Result<&ChainDeployment, OperationError> {
        self.deployments
            .get(&chain_id)
            .ok_or(OperationError::UnsupportedChain(chain_id))
    }

    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load variables from the .env file into the environment
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let chain_rpc_urls = match env::var("CHAIN_RPC_URLS") {
            Ok(raw) => parse_chain_map::<String>(&raw)
                .context("Invalid CHAIN_RPC_URLS JSON format (expected chain_id -> RPC URL)")?,
            Err(_) => defaults.chain_rpc_urls,
        };

        let deployments = match env::var("CHAIN_DEPLOYMENTS") {
            Ok(raw) => parse_chain_map::<ChainDeployment>(&raw)
                .context("Invalid CHAIN_DEPLOYMENTS JSON format")?,
            Err(_) => HashMap::new(),
        };
        if deployments.is_empty() {
            tracing::warn!("CHAIN_DEPLOYMENTS is empty; agent operations will be unavailable");
        }

        let relayer_chain_ids = match env::var("RELAYER_CHAIN_IDS") {
            Ok(raw) => parse_chain_list(&raw).context("RELAYER_CHAIN_IDS must be a comma-separated list of chain ids")?,
            Err(_) => defaults.relayer_chain_ids,
        };

        Ok(Config {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,

            chain_rpc_urls,
            default_chain_id: env::var("DEFAULT_CHAIN_ID")
                .unwrap_or_else(|_| MAINNET_ID.to_string())
                .parse()
                .context("DEFAULT_CHAIN_ID must be a valid number")?,
            deployments,

            relayer_chain_ids,
            relayer_base_url: env::var("RELAYER_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_RELAYER_BASE_URL.to_string()),
            relayer_api_version: env::var("RELAYER_API_VERSION")
                .unwrap_or_else(|_| DEFAULT_RELAYER_API_VERSION.to_string()),
            relayer_timeout_secs: env::var("RELAYER_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("RELAYER_TIMEOUT_SECS must be a valid number")?,

            wallet_private_key: env::var("WALLET_PRIVATE_KEY").ok(),
            session_store_path: env::var("SESSION_STORE_PATH").ok().or_else(|| {
                dirs::home_dir().map(|mut path| {
                    path.push(".mind-agent-mcp");
                    path.push("session.json");
                    path.to_string_lossy().to_string()
                })
            }),
            master_password: env::var("MASTER_PASSWORD").ok(),
        })
    }
}

// JSON object keys are always strings, so chain ids arrive as "228".
fn parse_chain_map<T: serde::de::DeserializeOwned>(raw: &str) -> Result<HashMap<u64, T>> {
    let by_string: HashMap<String, T> = serde_json::from_str(raw)?;
    by_string
        .into_iter()
        .map(|(key, value)| {
            let id = key
                .trim()
                .parse::<u64>()
                .with_context(|| format!("'{}' is not a valid chain id", key))?;
            Ok((id, value))
        })
        .collect()
}

fn parse_chain_list(raw: &str) -> Result<BTreeSet<u64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u64>().with_context(|| format!("'{}' is not a valid chain id", s)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_map_accepts_string_keys() {
        let map = parse_chain_map::<String>(r#"{"228": "https://a", " 56 ": "https://b"}"#).unwrap();
        assert_eq!(map.get(&228).map(String::as_str), Some("https://a"));
        assert_eq!(map.get(&56).map(String::as_str), Some("https://b"));
        assert!(parse_chain_map::<String>(r#"{"mainnet": "https://a"}"#).is_err());
    }

    #[test]
    fn deployments_use_camel_case_keys() {
        let raw = r#"{"228": {
            "agent": "0x0000000000000000000000000000000000000001",
            "fheToken": "0x0000000000000000000000000000000000000002",
            "sigVerify": "0x0000000000000000000000000000000000000003",
            "daoInspector": "0x0000000000000000000000000000000000000004"
        }}"#;
        let map = parse_chain_map::<ChainDeployment>(raw).unwrap();
        assert_eq!(map[&228].fhe_token, Address::from_low_u64_be(2));
    }

    #[test]
    fn relayer_chain_list_parsing() {
        let ids = parse_chain_list("228, 192940,").unwrap();
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec![228, 192940]);
        assert!(parse_chain_list("228,abc").is_err());
    }

    #[test]
    fn missing_deployment_is_an_unsupported_chain() {
        let config = Config::default();
        assert!(matches!(
            config.deployment(56),
            Err(OperationError::UnsupportedChain(56))
        ));
    }
}
