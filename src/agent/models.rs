// src/agent/models.rs

use ethers::types::{Address, Bytes, H256, U256};
use serde::Serialize;
use serde_json::{json, Value};

pub type ChainId = u64;

/// The caller's on-chain agent token. `id == 0` means no agent is owned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Agent {
    pub id: U256,
    pub owner: Address,
    pub chain_id: ChainId,
}

impl Agent {
    pub fn none(owner: Address, chain_id: ChainId) -> Self {
        Self {
            id: U256::zero(),
            owner,
            chain_id,
        }
    }

    pub fn exists(&self) -> bool {
        !self.id.is_zero()
    }
}

/// The accountable action, signed as EIP-712 and posted to the relayer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionPayload {
    pub user: Address,
    pub hub_id: U256,
    pub agent_id: U256,
    pub action: &'static str,
    pub amount: U256,
}

/// A relayer authorization. `timestamp` and `nonce` are the same clock read
/// that was embedded in the signed message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedAuthorization {
    pub signature: Bytes,
    pub timestamp: u64,
    pub nonce: u64,
}

/// EIP-2612 permit letting the agent contract pull staked tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PermitAuthorization {
    pub signature: Bytes,
    pub spender: Address,
    pub value: U256,
    pub deadline: u64,
}

/// Hub-issued pre-authorization. Hubs that do not require one still get the
/// empty placeholder (`0x`) with the timestamp it would have been signed at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DelegateSignature {
    pub signature: Bytes,
    pub sig_ts: u64,
}

impl DelegateSignature {
    pub fn placeholder(sig_ts: u64) -> Self {
        Self {
            signature: Bytes::new(),
            sig_ts,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.signature.is_empty()
    }
}

/// State-changing agent operations. Everything that differs between them is
/// data returned from these methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentAction {
    Burn,
    ClaimReward,
    Stake,
    Unstake,
    TrainInHub,
    SwitchHub,
    ExitHub,
}

impl AgentAction {
    /// Label embedded in the signed message.
    pub fn label(self) -> &'static str {
        match self {
            AgentAction::Burn => "Destroy Agent",
            AgentAction::ClaimReward => "claim reward",
            AgentAction::Stake => "Stake FHE",
            AgentAction::Unstake => "Unstake FHE",
            AgentAction::TrainInHub => "Delegate to Hub",
            AgentAction::SwitchHub => "Switch to another Hub",
            AgentAction::ExitHub => "Exit current Hub",
        }
    }

    /// Last path segment of `/relayer/agent/{chainId}/{endpoint}`.
    pub fn relayer_endpoint(self) -> &'static str {
        match self {
            AgentAction::Burn => "burn",
            AgentAction::ClaimReward => "claim",
            AgentAction::Stake => "stake",
            AgentAction::Unstake => "unstake",
            AgentAction::TrainInHub => "delegate",
            AgentAction::SwitchHub => "switch",
            AgentAction::ExitHub => "undelegate",
        }
    }

    /// Rewards are claimed per address; every other action targets the agent.
    pub fn targets_agent(self) -> bool {
        !matches!(self, AgentAction::ClaimReward)
    }

    pub fn requires_delegate_signature(self) -> bool {
        matches!(self, AgentAction::TrainInHub | AgentAction::SwitchHub)
    }
}

/// What a successful submission produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Submission {
    RelayerJob(u64),
    Transaction(H256),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Success,
    Failure,
}

/// Uniform tool output: one text item plus an explicit status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperationResult {
    pub status: ResultStatus,
    pub text: String,
}

impl OperationResult {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            status: ResultStatus::Success,
            text: text.into(),
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            status: ResultStatus::Failure,
            text: text.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResultStatus::Success
    }

    /// MCP `tools/call` result body.
    pub fn to_tool_result(&self) -> Value {
        json!({
            "content": [{ "type": "text", "text": self.text }],
            "isError": !self.is_success(),
        })
    }
}
