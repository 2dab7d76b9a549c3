// src/agent/normalizer.rs

use serde_json::json;

use super::error::OperationError;
use super::models::{OperationResult, Submission};

/// Single point where submissions and failures become tool output.
pub fn normalize(outcome: Result<Submission, OperationError>) -> OperationResult {
    match outcome {
        Ok(Submission::RelayerJob(id)) => OperationResult::success(id.to_string()),
        Ok(Submission::Transaction(hash)) => {
            OperationResult::success(json!({ "hash": hash }).to_string())
        }
        Err(err) => failure(err),
    }
}

/// Normalizes read-only tools, which already produce their display text.
pub fn normalize_text(outcome: Result<String, OperationError>) -> OperationResult {
    match outcome {
        Ok(text) => OperationResult::success(text),
        Err(err) => failure(err),
    }
}

fn failure(err: OperationError) -> OperationResult {
    let text = match err {
        OperationError::Execution { cause } => cause,
        other => other.to_string(),
    };
    tracing::warn!("operation failed: {}", text);
    OperationResult::failure(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::models::ResultStatus;
    use ethers::types::H256;

    #[test]
    fn relayer_job_is_plain_decimal_text() {
        let result = normalize(Ok(Submission::RelayerJob(42)));
        assert_eq!(result.text, "42");
        assert_eq!(result.status, ResultStatus::Success);
    }

    #[test]
    fn transaction_hash_is_wrapped_in_json() {
        let hash = H256::repeat_byte(0x11);
        let result = normalize(Ok(Submission::Transaction(hash)));
        let parsed: serde_json::Value = serde_json::from_str(&result.text).unwrap();
        assert_eq!(parsed["hash"], json!(format!("{:?}", hash)));
    }

    #[test]
    fn failures_keep_the_message_and_flag_the_status() {
        let result = normalize(Err(OperationError::Relayer("bad nonce".into())));
        assert_eq!(result.text, "bad nonce");
        assert!(!result.is_success());

        let tool = result.to_tool_result();
        assert_eq!(tool["isError"], json!(true));
        assert_eq!(tool["content"][0]["type"], json!("text"));
        assert_eq!(tool["content"][0]["text"], json!("bad nonce"));
    }
}
