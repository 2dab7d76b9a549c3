// src/agent/operations.rs

use std::sync::Arc;

use ethers::types::{Address, U256};

use super::direct::DirectExecutor;
use super::error::OperationError;
use super::identity::AgentResolver;
use super::models::{
    ActionPayload, Agent, AgentAction, ChainId, DelegateSignature, OperationResult, Submission,
};
use super::normalizer::normalize;
use super::relayer::{RelayerClient, RelayerSubmission};
use super::signer::ActionSigner;
use super::strategy::{ExecutionStrategy, StrategySelector};
use crate::blockchain::{contracts, ChainGateway, WalletSession};
use crate::config::{ChainDeployment, Config};
use crate::utils::{parse_amount, unix_now};

/// Arguments of one state-changing call.
#[derive(Clone, Debug)]
struct ActionRequest {
    action: AgentAction,
    user: Address,
    hub_id: u64,
    amount: U256,
    need_sign: bool,
}

impl ActionRequest {
    fn new(action: AgentAction, user: Address) -> Self {
        Self {
            action,
            user,
            hub_id: 0,
            amount: U256::zero(),
            need_sign: false,
        }
    }
}

/// Entry points for every agent tool.
///
/// Each state-changing method follows the same path: active chain, strategy,
/// agent lookup, optional hub pre-signature, then either the relayer or the
/// direct branch, and finally [`normalize`].
#[derive(Clone)]
pub struct AgentOperations {
    pub(super) config: Arc<Config>,
    pub(super) session: WalletSession,
    pub(super) gateway: Arc<dyn ChainGateway>,
    pub(super) strategy: StrategySelector,
    pub(super) resolver: AgentResolver,
    pub(super) signer: ActionSigner,
    pub(super) relayer: RelayerClient,
    pub(super) direct: DirectExecutor,
}

impl AgentOperations {
    pub fn new(
        config: Arc<Config>,
        session: WalletSession,
        gateway: Arc<dyn ChainGateway>,
        relayer: RelayerClient,
    ) -> Self {
        Self {
            strategy: StrategySelector::from_config(&config),
            resolver: AgentResolver::new(config.clone(), gateway.clone()),
            signer: ActionSigner::new(gateway.clone()),
            direct: DirectExecutor::new(gateway.clone()),
            config,
            session,
            gateway,
            relayer,
        }
    }

    pub fn strategy(&self) -> &StrategySelector {
        &self.strategy
    }

    pub fn resolver(&self) -> &AgentResolver {
        &self.resolver
    }

    pub fn relayer(&self) -> &RelayerClient {
        &self.relayer
    }

    pub async fn burn(&self, user: Address) -> OperationResult {
        normalize(self.execute(ActionRequest::new(AgentAction::Burn, user)).await)
    }

    pub async fn claim_reward(&self, user: Address) -> OperationResult {
        normalize(self.execute(ActionRequest::new(AgentAction::ClaimReward, user)).await)
    }

    /// `amount` is in whole FHE and scaled to 18 decimals.
    pub async fn stake(&self, user: Address, amount: &str) -> OperationResult {
        normalize(self.execute_with_amount(AgentAction::Stake, user, amount).await)
    }

    pub async fn unstake(&self, user: Address, amount: &str) -> OperationResult {
        normalize(self.execute_with_amount(AgentAction::Unstake, user, amount).await)
    }

    pub async fn train_in_hub(&self, user: Address, hub_id: u64, need_sign: bool) -> OperationResult {
        normalize(self.execute_hub(AgentAction::TrainInHub, user, hub_id, need_sign).await)
    }

    pub async fn switch_hub(&self, user: Address, hub_id: u64, need_sign: bool) -> OperationResult {
        normalize(self.execute_hub(AgentAction::SwitchHub, user, hub_id, need_sign).await)
    }

    pub async fn exit_hub(&self, user: Address) -> OperationResult {
        normalize(self.execute(ActionRequest::new(AgentAction::ExitHub, user)).await)
    }

    pub(super) async fn active_chain(&self) -> Result<ChainId, OperationError> {
        self.session.chain_id().await.ok_or(OperationError::MissingChain)
    }

    async fn execute_with_amount(
        &self,
        action: AgentAction,
        user: Address,
        amount: &str,
    ) -> Result<Submission, OperationError> {
        let amount = parse_amount(amount)?;
        self.execute(ActionRequest {
            amount,
            ..ActionRequest::new(action, user)
        })
        .await
    }

    async fn execute_hub(
        &self,
        action: AgentAction,
        user: Address,
        hub_id: u64,
        need_sign: bool,
    ) -> Result<Submission, OperationError> {
        self.execute(ActionRequest {
            hub_id,
            need_sign,
            ..ActionRequest::new(action, user)
        })
        .await
    }

    async fn execute(&self, request: ActionRequest) -> Result<Submission, OperationError> {
        let chain_id = self.active_chain().await?;
        let deployment = self.config.deployment(chain_id)?;
        let strategy = self.strategy.select(chain_id);
        tracing::info!(
            "{} for {:?} on chain {} via {:?}",
            request.action.label(),
            request.user,
            chain_id,
            strategy
        );

        let agent = if request.action.targets_agent() {
            self.resolver.resolve(request.user, chain_id).await?
        } else {
            Agent::none(request.user, chain_id)
        };

        let delegate = if request.action.requires_delegate_signature() {
            Some(
                self.delegate_signature(chain_id, deployment, agent.id, request.hub_id, request.need_sign)
                    .await?,
            )
        } else {
            None
        };

        match strategy {
            ExecutionStrategy::Relayer => {
                self.submit_via_relayer(chain_id, deployment, &request, &agent, delegate.as_ref())
                    .await
            }
            ExecutionStrategy::Direct => {
                self.submit_direct(chain_id, deployment, &request, &agent, delegate.as_ref())
                    .await
            }
        }
    }

    async fn delegate_signature(
        &self,
        chain_id: ChainId,
        deployment: &ChainDeployment,
        agent_id: U256,
        hub_id: u64,
        need_sign: bool,
    ) -> Result<DelegateSignature, OperationError> {
        let sig_ts = unix_now();
        if !need_sign {
            return Ok(DelegateSignature::placeholder(sig_ts));
        }
        let signature = self
            .relayer
            .verify_hub(chain_id, agent_id, U256::from(hub_id), sig_ts, deployment.agent)
            .await?;
        Ok(DelegateSignature { signature, sig_ts })
    }

    async fn submit_via_relayer(
        &self,
        chain_id: ChainId,
        deployment: &ChainDeployment,
        request: &ActionRequest,
        agent: &Agent,
        delegate: Option<&DelegateSignature>,
    ) -> Result<Submission, OperationError> {
        let payload = ActionPayload {
            user: request.user,
            hub_id: U256::from(request.hub_id),
            agent_id: agent.id,
            action: request.action.label(),
            amount: request.amount,
        };

        let permit = if request.action == AgentAction::Stake {
            Some(
                self.signer
                    .sign_permit(chain_id, deployment, request.user, request.amount)
                    .await?,
            )
        } else {
            None
        };

        let auth = self.signer.sign_action(chain_id, deployment, &payload).await?;

        let job_id = self
            .relayer
            .submit(
                chain_id,
                RelayerSubmission {
                    action: request.action,
                    payload: &payload,
                    auth: &auth,
                    delegate,
                    permit: permit.as_ref(),
                },
            )
            .await?;
        Ok(Submission::RelayerJob(job_id))
    }

    async fn submit_direct(
        &self,
        chain_id: ChainId,
        deployment: &ChainDeployment,
        request: &ActionRequest,
        agent: &Agent,
        delegate: Option<&DelegateSignature>,
    ) -> Result<Submission, OperationError> {
        use contracts::{agent as agent_fns, token};

        let contract = deployment.agent;
        let hub_id = U256::from(request.hub_id);
        let calls = match request.action {
            AgentAction::Burn => vec![agent_fns::burn(contract, agent.id)],
            AgentAction::ClaimReward => vec![agent_fns::claim_reward(contract, request.user)],
            AgentAction::Stake => vec![
                token::approve(deployment.fhe_token, contract, request.amount),
                agent_fns::stake(contract, agent.id, request.amount),
            ],
            AgentAction::Unstake => vec![agent_fns::unstake(contract, agent.id, request.amount)],
            AgentAction::TrainInHub => {
                let sig = required_delegate(delegate)?;
                vec![agent_fns::delegate(
                    contract,
                    agent.id,
                    hub_id,
                    &sig.signature,
                    U256::from(sig.sig_ts),
                )]
            }
            AgentAction::SwitchHub => {
                let sig = required_delegate(delegate)?;
                vec![agent_fns::switch_hub(
                    contract,
                    agent.id,
                    hub_id,
                    &sig.signature,
                    U256::from(sig.sig_ts),
                )]
            }
            AgentAction::ExitHub => vec![agent_fns::exit_current_hub(contract, agent.id)],
        };

        let hash = self.direct.submit_sequence(chain_id, calls).await?;
        Ok(Submission::Transaction(hash))
    }
}

fn required_delegate(delegate: Option<&DelegateSignature>) -> Result<&DelegateSignature, OperationError> {
    delegate.ok_or_else(|| OperationError::InvalidArgument("missing hub delegate signature".into()))
}
