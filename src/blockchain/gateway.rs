// src/blockchain/gateway.rs

use async_trait::async_trait;
use ethers_core::abi::{encode, Token};
use ethers_core::types::transaction::eip712::TypedData;
use ethers_core::types::{Address, Bytes, Signature, H256, U256};
use ethers_core::utils::keccak256;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// The node rejected the call during `eth_call`/`eth_estimateGas`.
    #[error("{cause}")]
    Execution { cause: String },
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error("{0}")]
    Signer(String),
    #[error("failed to decode contract output: {0}")]
    Decode(String),
    #[error("No provider available for chain: {0}")]
    NoProvider(u64),
    #[error("Please connect a wallet first.")]
    NotConnected,
}

/// A single contract function invocation, ABI-encoded on demand.
#[derive(Clone, Debug, PartialEq)]
pub struct ContractCall {
    pub to: Address,
    /// Canonical signature, e.g. `stake(uint256,uint256)`.
    pub signature: &'static str,
    pub args: Vec<Token>,
}

impl ContractCall {
    pub fn new(to: Address, signature: &'static str, args: Vec<Token>) -> Self {
        Self { to, signature, args }
    }

    /// The bare function name, used for logs.
    pub fn function_name(&self) -> &'static str {
        self.signature.split('(').next().unwrap_or(self.signature)
    }

    pub fn selector(&self) -> [u8; 4] {
        let mut sel = [0u8; 4];
        sel.copy_from_slice(&keccak256(self.signature.as_bytes())[0..4]);
        sel
    }

    pub fn calldata(&self) -> Bytes {
        let mut out = self.selector().to_vec();
        out.extend(encode(&self.args));
        Bytes::from(out)
    }
}

/// A call that passed simulation and is ready to broadcast.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedCall {
    pub call: ContractCall,
    pub from: Address,
    pub gas: Option<U256>,
}

/// Everything the agent core needs from a chain connection.
///
/// The production implementation is [`crate::blockchain::EvmClient`]; tests
/// provide an in-memory double.
#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// `eth_call` without a sender; returns the raw ABI-encoded output.
    async fn read_contract(&self, chain_id: u64, call: &ContractCall) -> Result<Bytes, ChainError>;

    /// Dry-run `call` from the connected account against the latest state.
    async fn simulate_contract(
        &self,
        chain_id: u64,
        call: ContractCall,
    ) -> Result<PreparedCall, ChainError>;

    /// Sign and broadcast a simulated call; returns the transaction hash.
    async fn write_contract(&self, chain_id: u64, prepared: PreparedCall) -> Result<H256, ChainError>;

    /// EIP-712 signature by the connected account.
    async fn sign_typed_data(&self, chain_id: u64, data: &TypedData) -> Result<Signature, ChainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calldata_starts_with_selector() {
        let call = ContractCall::new(
            Address::zero(),
            "balanceOf(address)",
            vec![Token::Address(Address::from_low_u64_be(0xabc))],
        );
        let data = call.calldata();
        // keccak("balanceOf(address)")[..4]
        assert_eq!(&data[..4], &[0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(call.function_name(), "balanceOf");
    }
}
