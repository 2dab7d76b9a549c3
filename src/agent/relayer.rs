// src/agent/relayer.rs

use std::time::Duration;

use anyhow::Context;
use ethers::types::{Address, Bytes, U256};
use ethers::utils::to_checksum;
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::OperationError;
use super::models::{
    ActionPayload, AgentAction, ChainId, DelegateSignature, PermitAuthorization,
    SignedAuthorization,
};
use crate::config::Config;

/// `{ code, message?, data }` wrapper every relayer response uses.
#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct RelayerJob {
    id: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DelegateFields {
    delegate_sig: String,
    delegate_sig_ts: u64,
    chain_id: ChainId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PermitFields {
    permit_signature: String,
    permit_spender: String,
    permit_deadline: u64,
}

/// POST body for `/relayer/agent/{chainId}/{action}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayerRequest {
    user: String,
    agent_id: u64,
    hub_id: u64,
    action: &'static str,
    signature: String,
    timestamp: u64,
    nonce: u64,
    /// Decimal wei string; 256-bit integers do not survive JSON numbers.
    amount: String,
    #[serde(flatten)]
    delegate: Option<DelegateFields>,
    #[serde(flatten)]
    permit: Option<PermitFields>,
}

/// One signed action ready for the relayer.
pub struct RelayerSubmission<'a> {
    pub action: AgentAction,
    pub payload: &'a ActionPayload,
    pub auth: &'a SignedAuthorization,
    pub delegate: Option<&'a DelegateSignature>,
    pub permit: Option<&'a PermitAuthorization>,
}

/// HTTP client for the relayer backend.
#[derive(Clone)]
pub struct RelayerClient {
    http: Client,
    base_url: String,
    version: String,
}

impl RelayerClient {
    pub fn new(base_url: &str, version: &str, timeout: Duration) -> anyhow::Result<Self> {
        url::Url::parse(base_url).with_context(|| format!("invalid relayer base URL '{}'", base_url))?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build relayer HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            version: version.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(
            &config.relayer_base_url,
            &config.relayer_api_version,
            Duration::from_secs(config.relayer_timeout_secs),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, OperationError> {
        self.send(self.http.get(self.url(path))).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, OperationError> {
        self.send(self.http.post(self.url(path)).json(body)).await
    }

    /// Sends the request and unwraps the envelope. A non-zero `code` fails
    /// regardless of the HTTP status.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, OperationError> {
        let response = request
            .header("Version", &self.version)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        let envelope: Envelope = serde_json::from_str(&body).map_err(|_| {
            OperationError::Relayer(format!("Unexpected relayer response ({}): {}", status, body))
        })?;
        if envelope.code != 0 {
            let message = envelope
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "Unknown Error".to_string());
            tracing::warn!("relayer rejected request with code {}: {}", envelope.code, message);
            return Err(OperationError::Relayer(message));
        }

        serde_json::from_value(envelope.data)
            .map_err(|e| OperationError::Relayer(format!("Malformed relayer data: {}", e)))
    }

    /// Submits a signed action and returns the relayer job id.
    pub async fn submit(
        &self,
        chain_id: ChainId,
        submission: RelayerSubmission<'_>,
    ) -> Result<u64, OperationError> {
        let RelayerSubmission {
            action,
            payload,
            auth,
            delegate,
            permit,
        } = submission;

        let body = RelayerRequest {
            user: to_checksum(&payload.user, None),
            agent_id: json_u64(payload.agent_id, "agentId")?,
            hub_id: json_u64(payload.hub_id, "hubId")?,
            action: payload.action,
            signature: hex_bytes(&auth.signature),
            timestamp: auth.timestamp,
            nonce: auth.nonce,
            amount: payload.amount.to_string(),
            delegate: delegate.map(|d| DelegateFields {
                delegate_sig: hex_bytes(&d.signature),
                delegate_sig_ts: d.sig_ts,
                chain_id,
            }),
            permit: permit.map(|p| PermitFields {
                permit_signature: hex_bytes(&p.signature),
                permit_spender: to_checksum(&p.spender, None),
                permit_deadline: p.deadline,
            }),
        };

        let path = format!("/relayer/agent/{}/{}", chain_id, action.relayer_endpoint());
        tracing::debug!("POST {} {}", path, serde_json::to_string(&body).unwrap_or_default());
        let job: RelayerJob = self.post(&path, &body).await?;
        tracing::info!("relayer accepted '{}' as job {}", action.label(), job.id);
        Ok(job.id)
    }

    /// Asks the hub-verification service for a delegate signature.
    pub async fn verify_hub(
        &self,
        chain_id: ChainId,
        agent_id: U256,
        hub_id: U256,
        sig_ts: u64,
        agent_contract: Address,
    ) -> Result<Bytes, OperationError> {
        let body = json!({
            "tokenId": json_u64(agent_id, "tokenId")?,
            "hubId": json_u64(hub_id, "hubId")?,
            "sigTs": sig_ts,
            "address": to_checksum(&agent_contract, None),
            "chainId": chain_id,
        });
        let signature: String = self.post("/hub/verify", &body).await?;
        signature
            .parse::<Bytes>()
            .map_err(|e| OperationError::Relayer(format!("Invalid hub signature: {}", e)))
    }

    pub async fn list_hubs(&self) -> Result<Value, OperationError> {
        self.get("/hub/list").await
    }
}

fn transport_error(err: reqwest::Error) -> OperationError {
    if err.is_connect() {
        tracing::warn!("relayer unreachable: {}", err);
        OperationError::Connectivity
    } else {
        OperationError::Transport(err.to_string())
    }
}

fn json_u64(value: U256, field: &str) -> Result<u64, OperationError> {
    if value.bits() > 64 {
        return Err(OperationError::InvalidArgument(format!(
            "{} {} does not fit the relayer API",
            field, value
        )));
    }
    Ok(value.as_u64())
}

fn hex_bytes(bytes: &Bytes) -> String {
    format!("0x{}", hex::encode(bytes.as_ref()))
}
