// src/agent/queries.rs
//
// Read-only tools. These never sign and never touch the relayer's action
// endpoints, so they bypass strategy selection entirely.

use ethers::types::{Address, U256};
use serde_json::json;

use super::error::OperationError;
use super::models::{ChainId, OperationResult};
use super::normalizer::normalize_text;
use super::operations::AgentOperations;
use crate::blockchain::contracts::{self, decode_string, decode_u256};
use crate::blockchain::ContractCall;
use crate::utils::{format_fhe, format_token_units};

pub const NO_AGENT_MESSAGE: &str = "You haven't joined any agents.";

impl AgentOperations {
    pub async fn get_agent_id(&self, user: Address) -> OperationResult {
        normalize_text(self.agent_id_text(user).await)
    }

    pub async fn get_stake_amount(&self, user: Address) -> OperationResult {
        normalize_text(self.stake_amount_text(user).await)
    }

    pub async fn get_claimable_reward(&self, user: Address) -> OperationResult {
        normalize_text(self.claimable_reward_text(user).await)
    }

    /// FHE token balance as JSON with raw and formatted values.
    pub async fn get_fhe_balance(&self, user: Address) -> OperationResult {
        normalize_text(self.fhe_balance_text(user).await)
    }

    /// Hub the caller's agent is currently delegated to; `0` means none.
    pub async fn get_current_hub(&self, user: Address) -> OperationResult {
        normalize_text(self.current_hub_text(user).await)
    }

    pub async fn list_hubs(&self) -> OperationResult {
        let hubs = self.relayer.list_hubs().await.and_then(|hubs| {
            serde_json::to_string(&hubs)
                .map_err(|e| OperationError::Relayer(format!("Malformed hub list: {}", e)))
        });
        normalize_text(hubs)
    }

    async fn agent_id_text(&self, user: Address) -> Result<String, OperationError> {
        let chain_id = self.active_chain().await?;
        let agent = self.resolver.resolve(user, chain_id).await?;
        Ok(if agent.exists() {
            agent.id.to_string()
        } else {
            NO_AGENT_MESSAGE.to_string()
        })
    }

    async fn stake_amount_text(&self, user: Address) -> Result<String, OperationError> {
        let chain_id = self.active_chain().await?;
        let agent_id = self.owned_agent(user, chain_id).await?;
        let agent_contract = self.config.deployment(chain_id)?.agent;
        let staked = self
            .read_u256(chain_id, &contracts::agent::stake_amount(agent_contract, agent_id))
            .await?;
        Ok(format_fhe(staked))
    }

    async fn claimable_reward_text(&self, user: Address) -> Result<String, OperationError> {
        let chain_id = self.active_chain().await?;
        let inspector = self.config.deployment(chain_id)?.dao_inspector;
        let reward = self
            .read_u256(chain_id, &contracts::inspector::user_claimable_rewards(inspector, user))
            .await?;
        Ok(format_fhe(reward))
    }

    async fn fhe_balance_text(&self, user: Address) -> Result<String, OperationError> {
        let chain_id = self.active_chain().await?;
        let token = self.config.deployment(chain_id)?.fhe_token;

        let value = self
            .read_u256(chain_id, &contracts::token::balance_of(token, user))
            .await?;
        let decimals = self
            .read_u256(chain_id, &contracts::token::decimals(token))
            .await?;
        let decimals = u32::try_from(decimals.low_u64()).unwrap_or(18);
        let raw_symbol = self
            .gateway
            .read_contract(chain_id, &contracts::token::symbol(token))
            .await?;
        let symbol = decode_string(&raw_symbol)?;

        Ok(json!({
            "address": format!("{:?}", user),
            "value": value.to_string(),
            "formatted": format_token_units(value, decimals)?,
            "symbol": symbol,
            "decimals": decimals,
        })
        .to_string())
    }

    // Without an agent this reads `currentHub(0)`.
    async fn current_hub_text(&self, user: Address) -> Result<String, OperationError> {
        let chain_id = self.active_chain().await?;
        let agent_id = self.resolver.resolve(user, chain_id).await?.id;
        let agent_contract = self.config.deployment(chain_id)?.agent;
        let hub = self
            .read_u256(chain_id, &contracts::agent::current_hub(agent_contract, agent_id))
            .await?;
        Ok(hub.to_string())
    }

    async fn owned_agent(&self, user: Address, chain_id: ChainId) -> Result<U256, OperationError> {
        let agent = self.resolver.resolve(user, chain_id).await?;
        if !agent.exists() {
            return Err(OperationError::InvalidArgument(NO_AGENT_MESSAGE.to_string()));
        }
        Ok(agent.id)
    }

    async fn read_u256(&self, chain_id: ChainId, call: &ContractCall) -> Result<U256, OperationError> {
        let raw = self.gateway.read_contract(chain_id, call).await?;
        Ok(decode_u256(&raw)?)
    }
}
