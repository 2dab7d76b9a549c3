//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ethers::abi::{encode, Token};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{transaction::eip712::TypedData, Address, Bytes, Signature, H256, U256};

use mind_agent_mcp_server::{
    agent::RelayerClient,
    blockchain::{ChainError, ChainGateway, ContractCall, PreparedCall, WalletSession},
    config::{ChainDeployment, Config, BSC_ID, MAINNET_ID, TESTNET_ID},
    AppState,
};

pub const TEST_KEY: &str = "4f3edf983ac636a65a842ce7c78d9aa706d3b113bce9c46f30d7d21715b23b1d";

pub fn test_wallet() -> LocalWallet {
    TEST_KEY.parse().unwrap()
}

pub fn deployment() -> ChainDeployment {
    ChainDeployment {
        agent: Address::from_low_u64_be(0xa9e7),
        fhe_token: Address::from_low_u64_be(0xf4e),
        sig_verify: Address::from_low_u64_be(0x5196),
        dao_inspector: Address::from_low_u64_be(0xda0),
    }
}

/// Default config pointed at `relayer_url`, with the same contracts on every
/// chain.
pub fn test_config(relayer_url: &str) -> Config {
    let mut config = Config::default();
    config.relayer_base_url = relayer_url.to_string();
    config.relayer_timeout_secs = 5;
    config.deployments = [MAINNET_ID, TESTNET_ID, BSC_ID]
        .into_iter()
        .map(|id| (id, deployment()))
        .collect();
    config
}

/// In-memory chain. Reads answer from a table keyed by function signature;
/// every call, simulation, write and signed payload is recorded.
pub struct MockGateway {
    signer: LocalWallet,
    responses: Mutex<HashMap<&'static str, Bytes>>,
    simulation_failures: Mutex<HashMap<&'static str, String>>,
    write_failure: Mutex<Option<String>>,
    pub reads: Mutex<Vec<ContractCall>>,
    pub simulations: Mutex<Vec<ContractCall>>,
    pub writes: Mutex<Vec<PreparedCall>>,
    pub signed: Mutex<Vec<TypedData>>,
}

impl MockGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            signer: test_wallet(),
            responses: Mutex::new(HashMap::new()),
            simulation_failures: Mutex::new(HashMap::new()),
            write_failure: Mutex::new(None),
            reads: Mutex::new(Vec::new()),
            simulations: Mutex::new(Vec::new()),
            writes: Mutex::new(Vec::new()),
            signed: Mutex::new(Vec::new()),
        })
    }

    pub fn respond(&self, signature: &'static str, token: Token) {
        self.responses
            .lock()
            .unwrap()
            .insert(signature, Bytes::from(encode(&[token])));
    }

    pub fn respond_uint(&self, signature: &'static str, value: u64) {
        self.respond(signature, Token::Uint(U256::from(value)));
    }

    /// Makes `owner` hold agent `id` (or nothing when `id == 0`).
    pub fn with_agent(&self, id: u64) {
        self.respond_uint("balanceOf(address)", u64::from(id != 0));
        self.respond_uint("tokenOfOwnerByIndex(address,uint256)", id);
    }

    pub fn fail_simulation(&self, signature: &'static str, cause: &str) {
        self.simulation_failures
            .lock()
            .unwrap()
            .insert(signature, cause.to_string());
    }

    pub fn fail_writes(&self, message: &str) {
        *self.write_failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn read_signatures(&self) -> Vec<&'static str> {
        self.reads.lock().unwrap().iter().map(|c| c.signature).collect()
    }

    pub fn simulated_signatures(&self) -> Vec<&'static str> {
        self.simulations.lock().unwrap().iter().map(|c| c.signature).collect()
    }

    pub fn written_signatures(&self) -> Vec<&'static str> {
        self.writes.lock().unwrap().iter().map(|p| p.call.signature).collect()
    }

    pub fn signed_payloads(&self) -> Vec<TypedData> {
        self.signed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainGateway for MockGateway {
    async fn read_contract(&self, _chain_id: u64, call: &ContractCall) -> Result<Bytes, ChainError> {
        self.reads.lock().unwrap().push(call.clone());
        self.responses
            .lock()
            .unwrap()
            .get(call.signature)
            .cloned()
            .ok_or_else(|| ChainError::Rpc(format!("no mock response for {}", call.signature)))
    }

    async fn simulate_contract(&self, _chain_id: u64, call: ContractCall) -> Result<PreparedCall, ChainError> {
        self.simulations.lock().unwrap().push(call.clone());
        if let Some(cause) = self.simulation_failures.lock().unwrap().get(call.signature) {
            return Err(ChainError::Execution { cause: cause.clone() });
        }
        Ok(PreparedCall {
            call,
            from: self.signer.address(),
            gas: Some(U256::from(100_000)),
        })
    }

    async fn write_contract(&self, _chain_id: u64, prepared: PreparedCall) -> Result<H256, ChainError> {
        if let Some(message) = self.write_failure.lock().unwrap().clone() {
            return Err(ChainError::Rpc(message));
        }
        let mut writes = self.writes.lock().unwrap();
        writes.push(prepared);
        Ok(H256::from_low_u64_be(writes.len() as u64))
    }

    async fn sign_typed_data(&self, chain_id: u64, data: &TypedData) -> Result<Signature, ChainError> {
        self.signed.lock().unwrap().push(data.clone());
        self.signer
            .clone()
            .with_chain_id(chain_id)
            .sign_typed_data(data)
            .await
            .map_err(|e| ChainError::Signer(e.to_string()))
    }
}

/// App state over `gateway` with the test wallet connected on `chain_id`.
pub async fn connected_state(gateway: Arc<MockGateway>, relayer_url: &str, chain_id: u64) -> AppState {
    let state = disconnected_state(gateway, relayer_url);
    state.session.connect(test_wallet(), chain_id).await;
    state
}

pub fn disconnected_state(gateway: Arc<MockGateway>, relayer_url: &str) -> AppState {
    let config = test_config(relayer_url);
    let relayer = RelayerClient::new(relayer_url, &config.relayer_api_version, Duration::from_secs(5)).unwrap();
    AppState::new(config, WalletSession::new(), gateway, relayer, None)
}

pub fn user() -> Address {
    test_wallet().address()
}
