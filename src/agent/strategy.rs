// src/agent/strategy.rs

use std::collections::BTreeSet;
use std::sync::Arc;

use super::models::ChainId;
use crate::config::Config;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// Sign an authorization and let the relayer pay gas.
    Relayer,
    /// Simulate then broadcast from the connected wallet.
    Direct,
}

/// Decides per chain how state changes are submitted. Every dispatcher goes
/// through this one selector.
#[derive(Clone, Debug)]
pub struct StrategySelector {
    relayer_chains: Arc<BTreeSet<ChainId>>,
}

impl StrategySelector {
    pub fn new(relayer_chains: impl IntoIterator<Item = ChainId>) -> Self {
        Self {
            relayer_chains: Arc::new(relayer_chains.into_iter().collect()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.relayer_chain_ids.iter().copied())
    }

    pub fn select(&self, chain_id: ChainId) -> ExecutionStrategy {
        if self.relayer_chains.contains(&chain_id) {
            ExecutionStrategy::Relayer
        } else {
            ExecutionStrategy::Direct
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BSC_ID, MAINNET_ID, TESTNET_ID};

    #[test]
    fn relayer_only_for_configured_chains() {
        let config = Config::default();
        let selector = StrategySelector::from_config(&config);
        for chain_id in config.supported_chains() {
            let expected = if chain_id == MAINNET_ID || chain_id == TESTNET_ID {
                ExecutionStrategy::Relayer
            } else {
                ExecutionStrategy::Direct
            };
            assert_eq!(selector.select(chain_id), expected, "chain {}", chain_id);
        }
        assert_eq!(selector.select(BSC_ID), ExecutionStrategy::Direct);
        assert_eq!(selector.select(1), ExecutionStrategy::Direct);
    }

    #[test]
    fn empty_relayer_set_means_direct_everywhere() {
        let selector = StrategySelector::new(Vec::<ChainId>::new());
        assert_eq!(selector.select(MAINNET_ID), ExecutionStrategy::Direct);
    }
}
