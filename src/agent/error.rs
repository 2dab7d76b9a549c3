// src/agent/error.rs

use thiserror::Error;

use crate::blockchain::gateway::ChainError;

/// Text surfaced when the relayer cannot be reached at all.
pub const CONNECTIVITY_MESSAGE: &str = "Please check your network connectivity !";

/// Everything that can stop an agent operation.
///
/// The `Display` text of each variant is exactly what the caller sees in the
/// tool result, so variants that wrap upstream messages print them verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    #[error("Please specify a chain ID.")]
    MissingChain,
    #[error("Chain {0} is not configured for agent operations.")]
    UnsupportedChain(u64),
    #[error("Please connect a wallet first.")]
    WalletNotConnected,
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    Resolution(String),
    /// Simulation reverted; `cause` is the revert reason from the node.
    #[error("{cause}")]
    Execution { cause: String },
    /// The call simulated fine but broadcasting failed. The transaction may
    /// or may not have reached the mempool.
    #[error("{0}")]
    Broadcast(String),
    #[error("{0}")]
    Signing(String),
    /// Relayer answered with a non-zero envelope code.
    #[error("{0}")]
    Relayer(String),
    #[error("Please check your network connectivity !")]
    Connectivity,
    #[error("{0}")]
    Transport(String),
}

impl From<ChainError> for OperationError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::Execution { cause } => OperationError::Execution { cause },
            ChainError::NotConnected => OperationError::WalletNotConnected,
            ChainError::NoProvider(chain_id) => OperationError::UnsupportedChain(chain_id),
            ChainError::Signer(msg) => OperationError::Signing(msg),
            other => OperationError::Resolution(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_errors_display_their_cause_only() {
        let err = OperationError::from(ChainError::Execution {
            cause: "insufficient balance".into(),
        });
        assert_eq!(err.to_string(), "insufficient balance");
    }

    #[test]
    fn connectivity_text_is_fixed() {
        assert_eq!(OperationError::Connectivity.to_string(), CONNECTIVITY_MESSAGE);
    }
}
