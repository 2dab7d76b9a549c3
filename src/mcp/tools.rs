// src/mcp/tools.rs
//
// Tool catalogue returned by `tools/list`.

use serde_json::{json, Value};

fn address_only(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "address": { "type": "string", "description": description }
        },
        "required": ["address"],
        "additionalProperties": false
    })
}

fn no_arguments() -> Value {
    json!({ "type": "object", "properties": {}, "additionalProperties": false })
}

fn amount_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "address": { "type": "string", "description": "Agent owner address (0x...)." },
            "amount": {
                "type": ["number", "string"],
                "description": description
            }
        },
        "required": ["address", "amount"],
        "additionalProperties": false
    })
}

fn hub_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "address": { "type": "string", "description": "Agent owner address (0x...)." },
            "hubId": { "type": "number", "description": description },
            "needSign": {
                "type": "boolean",
                "description": "Set when the hub requires a verification signature before joining."
            }
        },
        "required": ["address", "hubId"],
        "additionalProperties": false
    })
}

/// Every tool this server exposes, with its input schema.
pub fn tool_definitions() -> Value {
    json!([
        // Wallet session
        {
            "name": "connectWallet",
            "description": "Connect a local wallet. With private_key the key is used directly (and stored encrypted when master_password is given); without it the stored session is unlocked.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "private_key": { "type": "string", "description": "Hex private key of the wallet to connect." },
                    "wallet_name": { "type": "string", "description": "Name to store the session under (default 'default')." },
                    "master_password": { "type": "string", "description": "Password sealing the stored session." },
                    "chain_id": { "type": ["number", "string"], "description": "Chain to select after connecting." }
                },
                "additionalProperties": false
            }
        },
        {
            "name": "disconnectWallet",
            "description": "Disconnect the wallet and forget the stored session.",
            "inputSchema": no_arguments()
        },
        {
            "name": "getAccountInfo",
            "description": "Show the connected address, chain id and connection status.",
            "inputSchema": no_arguments()
        },
        {
            "name": "get-chain-id",
            "description": "Get the active chain id.",
            "inputSchema": no_arguments()
        },
        {
            "name": "get-chains",
            "description": "List the configured chains and how agent actions are executed on each.",
            "inputSchema": no_arguments()
        },
        {
            "name": "switchChain",
            "description": "Switch the active chain.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "chainId": { "type": ["number", "string"], "description": "Target chain id, e.g. 228 or 192940." }
                },
                "required": ["chainId"],
                "additionalProperties": false
            }
        },
        // Agent reads
        {
            "name": "getAgentId",
            "description": "Get the agent id owned by an address.",
            "inputSchema": address_only("Address to look up.")
        },
        {
            "name": "getStakeAmount",
            "description": "Get the amount of FHE staked in the address's agent.",
            "inputSchema": address_only("Agent owner address.")
        },
        {
            "name": "getClaimableReward",
            "description": "Get the FHE rewards the address can claim.",
            "inputSchema": address_only("Address to check.")
        },
        {
            "name": "getFheBalance",
            "description": "Get the FHE token balance of an address.",
            "inputSchema": address_only("Address to check.")
        },
        {
            "name": "listHubs",
            "description": "List the available training hubs.",
            "inputSchema": no_arguments()
        },
        {
            "name": "getCurrentHub",
            "description": "Get the hub where the agent is currently training.",
            "inputSchema": address_only("Agent owner address.")
        },
        // Agent actions
        {
            "name": "burn",
            "description": "Destroy the address's agent.",
            "inputSchema": address_only("Agent owner address.")
        },
        {
            "name": "claimReward",
            "description": "Claim earned FHE rewards from hub training.",
            "inputSchema": address_only("Address to claim rewards for.")
        },
        {
            "name": "stakeFHE",
            "description": "Stake FHE to create or fund an agent.",
            "inputSchema": amount_schema("Amount of FHE to stake, in whole tokens.")
        },
        {
            "name": "unstakeFHE",
            "description": "Unstake part of the FHE held by the agent.",
            "inputSchema": amount_schema("Amount of FHE to unstake, in whole tokens.")
        },
        {
            "name": "trainInHub",
            "description": "Start training in a selected hub (if idle).",
            "inputSchema": hub_schema("Hub to train in.")
        },
        {
            "name": "switchHub",
            "description": "Exit the current hub and start training in another.",
            "inputSchema": hub_schema("Hub to switch to.")
        },
        {
            "name": "exitHub",
            "description": "Stop training in the current hub.",
            "inputSchema": address_only("Agent owner address.")
        }
    ])
}
