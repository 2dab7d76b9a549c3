// src/blockchain/contracts.rs
//
// Function tables for the Agent, FHE token and DAO inspector contracts.

use ethers_core::abi::{decode, ParamType, Token};
use ethers_core::types::{Address, Bytes, U256};

use super::gateway::{ChainError, ContractCall};

pub mod agent {
    use super::*;

    pub fn balance_of(contract: Address, owner: Address) -> ContractCall {
        ContractCall::new(contract, "balanceOf(address)", vec![Token::Address(owner)])
    }

    pub fn token_of_owner_by_index(contract: Address, owner: Address, index: U256) -> ContractCall {
        ContractCall::new(
            contract,
            "tokenOfOwnerByIndex(address,uint256)",
            vec![Token::Address(owner), Token::Uint(index)],
        )
    }

    pub fn burn(contract: Address, agent_id: U256) -> ContractCall {
        ContractCall::new(contract, "burn(uint256)", vec![Token::Uint(agent_id)])
    }

    pub fn claim_reward(contract: Address, user: Address) -> ContractCall {
        ContractCall::new(contract, "claimReward(address)", vec![Token::Address(user)])
    }

    pub fn stake(contract: Address, agent_id: U256, amount: U256) -> ContractCall {
        ContractCall::new(
            contract,
            "stake(uint256,uint256)",
            vec![Token::Uint(agent_id), Token::Uint(amount)],
        )
    }

    pub fn unstake(contract: Address, agent_id: U256, amount: U256) -> ContractCall {
        ContractCall::new(
            contract,
            "unstake(uint256,uint256)",
            vec![Token::Uint(agent_id), Token::Uint(amount)],
        )
    }

    pub fn delegate(
        contract: Address,
        agent_id: U256,
        hub_id: U256,
        delegate_sig: &Bytes,
        sig_ts: U256,
    ) -> ContractCall {
        ContractCall::new(
            contract,
            "delegate(uint256,uint256,bytes,uint256)",
            vec![
                Token::Uint(agent_id),
                Token::Uint(hub_id),
                Token::Bytes(delegate_sig.to_vec()),
                Token::Uint(sig_ts),
            ],
        )
    }

    pub fn switch_hub(
        contract: Address,
        agent_id: U256,
        hub_id: U256,
        delegate_sig: &Bytes,
        sig_ts: U256,
    ) -> ContractCall {
        ContractCall::new(
            contract,
            "switchHub(uint256,uint256,bytes,uint256)",
            vec![
                Token::Uint(agent_id),
                Token::Uint(hub_id),
                Token::Bytes(delegate_sig.to_vec()),
                Token::Uint(sig_ts),
            ],
        )
    }

    pub fn exit_current_hub(contract: Address, agent_id: U256) -> ContractCall {
        ContractCall::new(contract, "exitCurrentHub(uint256)", vec![Token::Uint(agent_id)])
    }

    pub fn current_hub(contract: Address, agent_id: U256) -> ContractCall {
        ContractCall::new(contract, "currentHub(uint256)", vec![Token::Uint(agent_id)])
    }

    pub fn stake_amount(contract: Address, agent_id: U256) -> ContractCall {
        ContractCall::new(contract, "stakeAmount(uint256)", vec![Token::Uint(agent_id)])
    }
}

pub mod token {
    use super::*;

    pub fn approve(token: Address, spender: Address, amount: U256) -> ContractCall {
        ContractCall::new(
            token,
            "approve(address,uint256)",
            vec![Token::Address(spender), Token::Uint(amount)],
        )
    }

    /// EIP-2612 permit nonce of `owner`.
    pub fn nonces(token: Address, owner: Address) -> ContractCall {
        ContractCall::new(token, "nonces(address)", vec![Token::Address(owner)])
    }

    pub fn balance_of(token: Address, owner: Address) -> ContractCall {
        ContractCall::new(token, "balanceOf(address)", vec![Token::Address(owner)])
    }

    pub fn decimals(token: Address) -> ContractCall {
        ContractCall::new(token, "decimals()", vec![])
    }

    pub fn symbol(token: Address) -> ContractCall {
        ContractCall::new(token, "symbol()", vec![])
    }
}

pub mod inspector {
    use super::*;

    pub fn user_claimable_rewards(contract: Address, user: Address) -> ContractCall {
        ContractCall::new(
            contract,
            "getUserClaimableRewards(address)",
            vec![Token::Address(user)],
        )
    }
}

pub fn decode_u256(raw: &Bytes) -> Result<U256, ChainError> {
    match decode(&[ParamType::Uint(256)], raw)
        .map_err(|e| ChainError::Decode(e.to_string()))?
        .into_iter()
        .next()
    {
        Some(Token::Uint(n)) => Ok(n),
        other => Err(ChainError::Decode(format!("expected uint256, got {:?}", other))),
    }
}

pub fn decode_string(raw: &Bytes) -> Result<String, ChainError> {
    if let Ok(tokens) = decode(&[ParamType::String], raw) {
        if let Some(Token::String(s)) = tokens.into_iter().next() {
            return Ok(s);
        }
    }
    // Some tokens return bytes32 symbols
    if let Ok(tokens) = decode(&[ParamType::FixedBytes(32)], raw) {
        if let Some(Token::FixedBytes(b)) = tokens.into_iter().next() {
            let trimmed: Vec<u8> = b.into_iter().take_while(|c| *c != 0).collect();
            return String::from_utf8(trimmed).map_err(|e| ChainError::Decode(e.to_string()));
        }
    }
    Err(ChainError::Decode("expected string".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers_core::abi::encode;

    #[test]
    fn hub_calls_carry_the_delegate_signature_as_dynamic_bytes() {
        let sig = Bytes::from(vec![0xde, 0xad]);
        let call = agent::delegate(Address::zero(), U256::from(3), U256::from(7), &sig, U256::from(1_700_000_000u64));
        assert_eq!(call.function_name(), "delegate");
        assert_eq!(call.args[2], Token::Bytes(vec![0xde, 0xad]));
    }

    #[test]
    fn decodes_uint_and_string_outputs() {
        let raw = Bytes::from(encode(&[Token::Uint(U256::from(42))]));
        assert_eq!(decode_u256(&raw).unwrap(), U256::from(42));

        let raw = Bytes::from(encode(&[Token::String("FHE".into())]));
        assert_eq!(decode_string(&raw).unwrap(), "FHE");

        let mut padded = [0u8; 32];
        padded[..3].copy_from_slice(b"FHE");
        let raw = Bytes::from(encode(&[Token::FixedBytes(padded.to_vec())]));
        assert_eq!(decode_string(&raw).unwrap(), "FHE");
    }

    #[test]
    fn empty_output_is_a_decode_error() {
        assert!(matches!(decode_u256(&Bytes::new()), Err(ChainError::Decode(_))));
    }
}
