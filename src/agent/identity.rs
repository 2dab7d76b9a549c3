// src/agent/identity.rs

use std::sync::Arc;

use ethers::types::{Address, U256};

use super::error::OperationError;
use super::models::{Agent, ChainId};
use crate::blockchain::{
    contracts::{self, decode_u256},
    ChainError, ChainGateway,
};
use crate::config::Config;

/// Looks up which agent token an address holds.
///
/// Always reads fresh chain state; results are never cached across calls.
#[derive(Clone)]
pub struct AgentResolver {
    config: Arc<Config>,
    gateway: Arc<dyn ChainGateway>,
}

impl AgentResolver {
    pub fn new(config: Arc<Config>, gateway: Arc<dyn ChainGateway>) -> Self {
        Self { config, gateway }
    }

    /// An owner holds at most one active agent; the token at index 0 is it.
    pub async fn resolve(&self, owner: Address, chain_id: ChainId) -> Result<Agent, OperationError> {
        let agent_contract = self.config.deployment(chain_id)?.agent;

        let count = self
            .read_u256(chain_id, &contracts::agent::balance_of(agent_contract, owner))
            .await?;
        if count.is_zero() {
            tracing::debug!("{:?} owns no agent on chain {}", owner, chain_id);
            return Ok(Agent::none(owner, chain_id));
        }

        let id = self
            .read_u256(
                chain_id,
                &contracts::agent::token_of_owner_by_index(agent_contract, owner, U256::zero()),
            )
            .await?;
        tracing::debug!("{:?} owns agent {} on chain {}", owner, id, chain_id);

        Ok(Agent {
            id,
            owner,
            chain_id,
        })
    }

    async fn read_u256(
        &self,
        chain_id: ChainId,
        call: &crate::blockchain::ContractCall,
    ) -> Result<U256, OperationError> {
        let raw = self
            .gateway
            .read_contract(chain_id, call)
            .await
            .map_err(resolution_error)?;
        decode_u256(&raw).map_err(resolution_error)
    }
}

fn resolution_error(err: ChainError) -> OperationError {
    match err {
        ChainError::NoProvider(chain_id) => OperationError::UnsupportedChain(chain_id),
        other => OperationError::Resolution(other.to_string()),
    }
}
