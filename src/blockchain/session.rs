// src/blockchain/session.rs

use std::sync::Arc;

use ethers::types::Address;
use ethers_signers::{LocalWallet, Signer};
use tokio::sync::RwLock;

#[derive(Default)]
struct SessionState {
    wallet: Option<LocalWallet>,
    chain_id: Option<u64>,
}

/// The connected wallet and the chain it is pointed at.
///
/// Shared between the chain client (which signs with it) and the tool
/// handlers (which connect, disconnect and switch chains).
#[derive(Clone, Default)]
pub struct WalletSession {
    inner: Arc<RwLock<SessionState>>,
}

impl WalletSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn connect(&self, wallet: LocalWallet, chain_id: u64) -> Address {
        let address = wallet.address();
        let mut state = self.inner.write().await;
        state.wallet = Some(wallet);
        state.chain_id = Some(chain_id);
        address
    }

    pub async fn disconnect(&self) {
        let mut state = self.inner.write().await;
        state.wallet = None;
        state.chain_id = None;
    }

    pub async fn switch_chain(&self, chain_id: u64) {
        self.inner.write().await.chain_id = Some(chain_id);
    }

    pub async fn chain_id(&self) -> Option<u64> {
        self.inner.read().await.chain_id
    }

    pub async fn address(&self) -> Option<Address> {
        self.inner.read().await.wallet.as_ref().map(|w| w.address())
    }

    /// A copy of the signer bound to `chain_id` for EIP-155 replay protection.
    pub async fn signer_for(&self, chain_id: u64) -> Option<LocalWallet> {
        self.inner
            .read()
            .await
            .wallet
            .clone()
            .map(|w| w.with_chain_id(chain_id))
    }
}
