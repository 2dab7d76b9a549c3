// src/agent/direct.rs

use std::sync::Arc;

use ethers::types::H256;

use super::error::OperationError;
use super::models::ChainId;
use crate::blockchain::{ChainError, ChainGateway, ContractCall};

/// Submits contract calls from the connected wallet, simulating each one
/// before it is broadcast.
#[derive(Clone)]
pub struct DirectExecutor {
    gateway: Arc<dyn ChainGateway>,
}

impl DirectExecutor {
    pub fn new(gateway: Arc<dyn ChainGateway>) -> Self {
        Self { gateway }
    }

    /// Simulate, then write. A failed simulation never reaches the network.
    pub async fn submit(&self, chain_id: ChainId, call: ContractCall) -> Result<H256, OperationError> {
        let name = call.function_name();
        let prepared = self.gateway.simulate_contract(chain_id, call).await.map_err(|e| {
            tracing::warn!("simulation of {} failed on chain {}: {}", name, chain_id, e);
            OperationError::from(e)
        })?;

        let hash = self
            .gateway
            .write_contract(chain_id, prepared)
            .await
            .map_err(broadcast_error)?;
        tracing::info!("broadcast {} on chain {}: {:?}", name, chain_id, hash);
        Ok(hash)
    }

    /// Runs `calls` in order, each through its own simulate-then-write step.
    /// Returns the hash of the last transaction; the first failure aborts
    /// the rest.
    pub async fn submit_sequence(
        &self,
        chain_id: ChainId,
        calls: Vec<ContractCall>,
    ) -> Result<H256, OperationError> {
        let mut last = None;
        for call in calls {
            last = Some(self.submit(chain_id, call).await?);
        }
        last.ok_or_else(|| OperationError::InvalidArgument("no contract calls to submit".into()))
    }
}

// Anything that fails after simulation passed is a broadcast failure; the
// original RPC text is kept so the caller can check whether it landed.
fn broadcast_error(err: ChainError) -> OperationError {
    match err {
        ChainError::NotConnected => OperationError::WalletNotConnected,
        ChainError::Rpc(msg) | ChainError::Signer(msg) => OperationError::Broadcast(msg),
        other => OperationError::Broadcast(other.to_string()),
    }
}
