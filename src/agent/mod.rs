// src/agent/mod.rs

pub mod direct;
pub mod error;
pub mod identity;
pub mod models;
pub mod normalizer;
pub mod operations;
pub mod queries;
pub mod relayer;
pub mod signer;
pub mod strategy;

pub use error::OperationError;
pub use models::{Agent, AgentAction, ChainId, OperationResult, ResultStatus, Submission};
pub use operations::AgentOperations;
pub use relayer::RelayerClient;
pub use strategy::{ExecutionStrategy, StrategySelector};
