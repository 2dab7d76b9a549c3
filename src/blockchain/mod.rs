// src/blockchain/mod.rs

pub mod contracts;
pub mod evm_client;
pub mod gateway;
pub mod session;

pub use evm_client::EvmClient;
pub use gateway::{ChainError, ChainGateway, ContractCall, PreparedCall};
pub use session::WalletSession;

// Re-export commonly used types
pub use ethers::{
    types::{Address, H256, U256},
    utils::to_checksum,
};
pub use ethers_signers::{LocalWallet, Signer};
