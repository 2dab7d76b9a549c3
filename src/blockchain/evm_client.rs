// src/blockchain/evm_client.rs

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use ethers::{
    middleware::SignerMiddleware,
    types::{
        transaction::{eip2718::TypedTransaction, eip712::TypedData},
        Bytes, Signature, TransactionRequest, H256,
    },
};
use ethers_core::abi::{decode, ParamType, Token};
use ethers_providers::{Http, Middleware, Provider, ProviderError, RpcError};
use ethers_signers::Signer;

use super::gateway::{ChainError, ChainGateway, ContractCall, PreparedCall};
use super::session::WalletSession;

/// Selector of the standard `Error(string)` revert payload.
const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// Client for interacting with EVM-compatible blockchains
#[derive(Clone)]
pub struct EvmClient {
    providers: HashMap<u64, Arc<Provider<Http>>>,
    session: WalletSession,
}

impl EvmClient {
    /// Create a new EvmClient with the given RPC URLs
    pub fn new(rpc_urls: &HashMap<u64, String>, session: WalletSession) -> Self {
        let mut providers = HashMap::new();

        for (chain_id, url) in rpc_urls {
            match Provider::<Http>::try_from(url.as_str()) {
                Ok(provider) => {
                    providers.insert(*chain_id, Arc::new(provider));
                }
                Err(e) => tracing::warn!(
                    "Failed to create provider for chain {} at {}: {}",
                    chain_id,
                    url,
                    e
                ),
            }
        }

        Self { providers, session }
    }

    /// Get a provider for the specified chain
    fn get_provider(&self, chain_id: u64) -> Result<Arc<Provider<Http>>, ChainError> {
        self.providers
            .get(&chain_id)
            .cloned()
            .ok_or(ChainError::NoProvider(chain_id))
    }

    fn call_request(call: &ContractCall) -> TransactionRequest {
        TransactionRequest::new().to(call.to).data(call.calldata())
    }
}

#[async_trait]
impl ChainGateway for EvmClient {
    async fn read_contract(&self, chain_id: u64, call: &ContractCall) -> Result<Bytes, ChainError> {
        let provider = self.get_provider(chain_id)?;
        let tx: TypedTransaction = Self::call_request(call).into();
        tracing::debug!("eth_call {} on chain {}", call.function_name(), chain_id);
        provider.call(&tx, None).await.map_err(revert_or_rpc)
    }

    async fn simulate_contract(
        &self,
        chain_id: u64,
        call: ContractCall,
    ) -> Result<PreparedCall, ChainError> {
        let provider = self.get_provider(chain_id)?;
        let from = self.session.address().await.ok_or(ChainError::NotConnected)?;
        let tx: TypedTransaction = Self::call_request(&call).from(from).into();

        tracing::debug!("simulating {} from {:?} on chain {}", call.function_name(), from, chain_id);
        provider.call(&tx, None).await.map_err(revert_or_rpc)?;
        let gas = provider.estimate_gas(&tx, None).await.map_err(revert_or_rpc)?;

        Ok(PreparedCall {
            call,
            from,
            gas: Some(gas),
        })
    }

    async fn write_contract(&self, chain_id: u64, prepared: PreparedCall) -> Result<H256, ChainError> {
        let provider = self.get_provider(chain_id)?;
        let signer = self
            .session
            .signer_for(chain_id)
            .await
            .ok_or(ChainError::NotConnected)?;
        if signer.address() != prepared.from {
            return Err(ChainError::Signer(
                "connected account changed after simulation".into(),
            ));
        }

        let mut tx = Self::call_request(&prepared.call).from(prepared.from);
        if let Some(gas) = prepared.gas {
            tx = tx.gas(gas);
        }

        let client = SignerMiddleware::new((*provider).clone(), signer);
        let pending = client
            .send_transaction(tx, None)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;
        Ok(pending.tx_hash())
    }

    async fn sign_typed_data(&self, chain_id: u64, data: &TypedData) -> Result<Signature, ChainError> {
        let signer = self
            .session
            .signer_for(chain_id)
            .await
            .ok_or(ChainError::NotConnected)?;
        signer
            .sign_typed_data(data)
            .await
            .map_err(|e| ChainError::Signer(e.to_string()))
    }
}

/// Node-side rejections become `Execution`, transport problems stay `Rpc`.
fn revert_or_rpc(err: ProviderError) -> ChainError {
    match err.as_error_response() {
        Some(rpc) => ChainError::Execution {
            cause: revert_reason(&rpc.message, rpc.data.as_ref()),
        },
        None => ChainError::Rpc(err.to_string()),
    }
}

fn revert_reason(message: &str, data: Option<&serde_json::Value>) -> String {
    if let Some(reason) = data.and_then(|d| d.as_str()).and_then(decode_error_string) {
        return reason;
    }
    message
        .strip_prefix("execution reverted: ")
        .unwrap_or(message)
        .to_string()
}

fn decode_error_string(hex_data: &str) -> Option<String> {
    let raw: Bytes = hex_data.parse().ok()?;
    if raw.len() < 4 || raw[..4] != ERROR_STRING_SELECTOR {
        return None;
    }
    match decode(&[ParamType::String], &raw[4..]).ok()?.into_iter().next() {
        Some(Token::String(s)) => Some(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers_core::abi::encode;

    #[test]
    fn revert_reason_prefers_decoded_error_string() {
        let mut payload = ERROR_STRING_SELECTOR.to_vec();
        payload.extend(encode(&[Token::String("insufficient balance".into())]));
        let data = serde_json::json!(format!("0x{}", hex::encode(payload)));
        assert_eq!(
            revert_reason("execution reverted", Some(&data)),
            "insufficient balance"
        );
    }

    #[test]
    fn revert_reason_falls_back_to_message() {
        assert_eq!(
            revert_reason("execution reverted: not hub owner", None),
            "not hub owner"
        );
        assert_eq!(revert_reason("out of gas", None), "out of gas");
    }
}
