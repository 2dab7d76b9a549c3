// src/agent/signer.rs

use std::sync::Arc;

use ethers::types::{transaction::eip712::TypedData, Address, Bytes, U256};
use ethers::utils::to_checksum;
use serde_json::json;

use super::error::OperationError;
use super::models::{ActionPayload, ChainId, PermitAuthorization, SignedAuthorization};
use crate::blockchain::{contracts, ChainGateway};
use crate::config::ChainDeployment;
use crate::utils::unix_now;

pub const ACTION_DOMAIN_NAME: &str = "mindnetwork.xyz";
pub const PERMIT_DOMAIN_NAME: &str = "MindNetwork FHE Token";
pub const DOMAIN_VERSION: &str = "1";
/// Permits expire one hour after signing.
pub const PERMIT_VALIDITY_SECS: u64 = 3600;

/// Typed data for a relayer action. `timestamp` doubles as the nonce.
pub fn action_typed_data(
    chain_id: ChainId,
    verifying_contract: Address,
    payload: &ActionPayload,
    timestamp: u64,
) -> Result<TypedData, OperationError> {
    typed_data(json!({
        "types": {
            "EIP712Domain": domain_fields(),
            "Message": [
                { "name": "user", "type": "address" },
                { "name": "agentID", "type": "uint256" },
                { "name": "hubID", "type": "uint256" },
                { "name": "action", "type": "string" },
                { "name": "amount", "type": "uint256" },
                { "name": "timestamp", "type": "uint256" },
                { "name": "nonce", "type": "uint256" }
            ]
        },
        "primaryType": "Message",
        "domain": domain(ACTION_DOMAIN_NAME, chain_id, verifying_contract),
        "message": {
            "user": to_checksum(&payload.user, None),
            "agentID": payload.agent_id.to_string(),
            "hubID": payload.hub_id.to_string(),
            "action": payload.action,
            "amount": payload.amount.to_string(),
            "timestamp": timestamp.to_string(),
            "nonce": timestamp.to_string()
        }
    }))
}

/// Typed data for an EIP-2612 `Permit` on the FHE token.
pub fn permit_typed_data(
    chain_id: ChainId,
    token: Address,
    owner: Address,
    spender: Address,
    value: U256,
    nonce: U256,
    deadline: u64,
) -> Result<TypedData, OperationError> {
    typed_data(json!({
        "types": {
            "EIP712Domain": domain_fields(),
            "Permit": [
                { "name": "owner", "type": "address" },
                { "name": "spender", "type": "address" },
                { "name": "value", "type": "uint256" },
                { "name": "nonce", "type": "uint256" },
                { "name": "deadline", "type": "uint256" }
            ]
        },
        "primaryType": "Permit",
        "domain": domain(PERMIT_DOMAIN_NAME, chain_id, token),
        "message": {
            "owner": to_checksum(&owner, None),
            "spender": to_checksum(&spender, None),
            "value": value.to_string(),
            "nonce": nonce.to_string(),
            "deadline": deadline.to_string()
        }
    }))
}

fn domain_fields() -> serde_json::Value {
    json!([
        { "name": "name", "type": "string" },
        { "name": "version", "type": "string" },
        { "name": "chainId", "type": "uint256" },
        { "name": "verifyingContract", "type": "address" }
    ])
}

fn domain(name: &str, chain_id: ChainId, verifying_contract: Address) -> serde_json::Value {
    json!({
        "name": name,
        "version": DOMAIN_VERSION,
        "chainId": chain_id,
        "verifyingContract": to_checksum(&verifying_contract, None)
    })
}

fn typed_data(value: serde_json::Value) -> Result<TypedData, OperationError> {
    serde_json::from_value(value)
        .map_err(|e| OperationError::Signing(format!("invalid typed data: {}", e)))
}

/// Produces EIP-712 signatures through the connected wallet.
#[derive(Clone)]
pub struct ActionSigner {
    gateway: Arc<dyn ChainGateway>,
}

impl ActionSigner {
    pub fn new(gateway: Arc<dyn ChainGateway>) -> Self {
        Self { gateway }
    }

    /// Signs `payload` for the relayer. The returned timestamp and nonce are
    /// the values inside the signed message.
    pub async fn sign_action(
        &self,
        chain_id: ChainId,
        deployment: &ChainDeployment,
        payload: &ActionPayload,
    ) -> Result<SignedAuthorization, OperationError> {
        let timestamp = unix_now();
        let typed = action_typed_data(chain_id, deployment.sig_verify, payload, timestamp)?;
        let signature = self.gateway.sign_typed_data(chain_id, &typed).await?;

        tracing::debug!(
            "signed '{}' for {:?} on chain {} at {}",
            payload.action,
            payload.user,
            chain_id,
            timestamp
        );

        Ok(SignedAuthorization {
            signature: Bytes::from(signature.to_vec()),
            timestamp,
            nonce: timestamp,
        })
    }

    /// Signs a permit letting the agent contract spend `value` of `owner`'s
    /// FHE. The nonce comes from the token contract, not the clock.
    pub async fn sign_permit(
        &self,
        chain_id: ChainId,
        deployment: &ChainDeployment,
        owner: Address,
        value: U256,
    ) -> Result<PermitAuthorization, OperationError> {
        let raw = self
            .gateway
            .read_contract(chain_id, &contracts::token::nonces(deployment.fhe_token, owner))
            .await?;
        let nonce = contracts::decode_u256(&raw)?;
        let deadline = unix_now() + PERMIT_VALIDITY_SECS;
        let spender = deployment.agent;

        let typed = permit_typed_data(
            chain_id,
            deployment.fhe_token,
            owner,
            spender,
            value,
            nonce,
            deadline,
        )?;
        let signature = self.gateway.sign_typed_data(chain_id, &typed).await?;

        Ok(PermitAuthorization {
            signature: Bytes::from(signature.to_vec()),
            spender,
            value,
            deadline,
        })
    }
}
