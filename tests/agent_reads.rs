//! Agent resolution and the read-only tools

mod common;

use ethers::abi::Token;
use ethers::types::U256;

use common::{connected_state, user, MockGateway};
use mind_agent_mcp_server::config::{BSC_ID, MAINNET_ID};

const NO_RELAYER: &str = "http://127.0.0.1:1";

#[tokio::test]
async fn test_resolver_stops_after_zero_balance() {
    let gateway = MockGateway::new();
    gateway.with_agent(0);
    let state = connected_state(gateway.clone(), NO_RELAYER, MAINNET_ID).await;

    let agent = state.operations.resolver().resolve(user(), MAINNET_ID).await.unwrap();

    assert!(!agent.exists());
    assert_eq!(agent.id, U256::zero());
    assert_eq!(gateway.read_signatures(), vec!["balanceOf(address)"]);
}

#[tokio::test]
async fn test_resolver_reads_first_owned_token() {
    let gateway = MockGateway::new();
    gateway.with_agent(17);
    let state = connected_state(gateway.clone(), NO_RELAYER, MAINNET_ID).await;

    let agent = state.operations.resolver().resolve(user(), MAINNET_ID).await.unwrap();
    assert_eq!(agent.id, U256::from(17));
    assert_eq!(agent.owner, user());

    let reads = gateway.reads.lock().unwrap().clone();
    assert_eq!(
        reads[1].args,
        vec![Token::Address(user()), Token::Uint(U256::zero())]
    );
}

#[tokio::test]
async fn test_resolver_is_idempotent() {
    let gateway = MockGateway::new();
    gateway.with_agent(9);
    let state = connected_state(gateway.clone(), NO_RELAYER, BSC_ID).await;
    let resolver = state.operations.resolver();

    let first = resolver.resolve(user(), BSC_ID).await.unwrap();
    let second = resolver.resolve(user(), BSC_ID).await.unwrap();
    assert_eq!(first, second);
    // No caching: both calls hit the chain
    assert_eq!(gateway.read_signatures().len(), 4);
}

#[tokio::test]
async fn test_resolution_failure_is_reported() {
    // No responses configured, so the balance read fails
    let gateway = MockGateway::new();
    let state = connected_state(gateway.clone(), NO_RELAYER, MAINNET_ID).await;

    let result = state.operations.burn(user()).await;
    assert!(!result.is_success());
    assert!(result.text.contains("balanceOf(address)"), "{}", result.text);
    assert!(gateway.signed_payloads().is_empty());
}

#[tokio::test]
async fn test_get_agent_id_messages() {
    let gateway = MockGateway::new();
    gateway.with_agent(0);
    let state = connected_state(gateway.clone(), NO_RELAYER, MAINNET_ID).await;
    let result = state.operations.get_agent_id(user()).await;
    assert!(result.is_success());
    assert_eq!(result.text, "You haven't joined any agents.");

    gateway.with_agent(21);
    assert_eq!(state.operations.get_agent_id(user()).await.text, "21");
}

#[tokio::test]
async fn test_stake_amount_and_rewards_are_formatted_in_fhe() {
    let gateway = MockGateway::new();
    gateway.with_agent(3);
    gateway.respond("stakeAmount(uint256)", Token::Uint(U256::exp10(17) * 15));
    gateway.respond("getUserClaimableRewards(address)", Token::Uint(U256::exp10(18) * 2));
    let state = connected_state(gateway.clone(), NO_RELAYER, MAINNET_ID).await;

    assert_eq!(state.operations.get_stake_amount(user()).await.text, "1.5 FHE");
    assert_eq!(state.operations.get_claimable_reward(user()).await.text, "2 FHE");
}

#[tokio::test]
async fn test_stake_amount_without_agent_is_an_error() {
    let gateway = MockGateway::new();
    gateway.with_agent(0);
    let state = connected_state(gateway.clone(), NO_RELAYER, MAINNET_ID).await;

    let result = state.operations.get_stake_amount(user()).await;
    assert!(!result.is_success());
    assert_eq!(result.text, "You haven't joined any agents.");
}

#[tokio::test]
async fn test_fhe_balance_reports_value_and_metadata() {
    let gateway = MockGateway::new();
    gateway.respond("balanceOf(address)", Token::Uint(U256::exp10(18) * 3));
    gateway.respond_uint("decimals()", 18);
    gateway.respond("symbol()", Token::String("FHE".into()));
    let state = connected_state(gateway.clone(), NO_RELAYER, MAINNET_ID).await;

    let result = state.operations.get_fhe_balance(user()).await;
    let balance: serde_json::Value = serde_json::from_str(&result.text).unwrap();
    assert_eq!(balance["value"], "3000000000000000000");
    assert_eq!(balance["formatted"], "3");
    assert_eq!(balance["symbol"], "FHE");
    assert_eq!(balance["decimals"], 18);
}

#[tokio::test]
async fn test_current_hub_without_agent_reads_hub_zero() {
    let gateway = MockGateway::new();
    gateway.with_agent(0);
    gateway.respond_uint("currentHub(uint256)", 0);
    let state = connected_state(gateway.clone(), NO_RELAYER, MAINNET_ID).await;

    let result = state.operations.get_current_hub(user()).await;

    assert!(result.is_success(), "{}", result.text);
    assert_eq!(result.text, "0");
    let reads = gateway.reads.lock().unwrap().clone();
    assert_eq!(reads.last().unwrap().signature, "currentHub(uint256)");
    assert_eq!(reads.last().unwrap().args, vec![Token::Uint(U256::zero())]);
}
