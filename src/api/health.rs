use axum::{extract::State, response::IntoResponse, Json};
use ethers::utils::to_checksum;
use serde_json::json;

use crate::AppState;

pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let chain_id = state.session.chain_id().await;
    let address = state.session.address().await;
    Json(json!({
        "status": "ok",
        "chainId": chain_id,
        "strategy": chain_id.map(|id| format!("{:?}", state.operations.strategy().select(id)).to_lowercase()),
        "wallet": address.map(|a| to_checksum(&a, None)),
    }))
}
