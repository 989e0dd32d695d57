//! The deposit orchestrator: approve A, approve B, deposit, assign agent,
//! analyze, finalize. Each step waits on its gateway call before the next
//! one may start.

pub mod events;
pub mod steps;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use alloy::primitives::utils::parse_units;
use alloy::primitives::{Address, U256};
use thiserror::Error;
use tokio::sync::{Mutex, broadcast};

use crate::backend::{Backend, BackendError};
use crate::chain::{ChainAction, ChainError, ChainGateway, Receipt, TokenSlot};
use crate::config::AgentDirectory;
use crate::model::{AgentRunResponse, AnalyzeResponse, ApiAgent, DepositId, Strategy};

pub use events::FlowEvent;
pub use steps::{StepError, StepKind, StepMachine, StepStatus};

/// Pool tokens use 18 decimals.
pub const TOKEN_DECIMALS: u8 = 18;
pub const DEFAULT_LOCK_DAYS: u64 = 30;
const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("a step is already in progress")]
    Busy,

    #[error("deposit flow already completed")]
    Complete,

    #[error("deposit flow was closed")]
    Closed,

    #[error("`{step}` is blocked: {reason}")]
    Blocked { step: StepKind, reason: String },

    #[error("invalid amount '{value}': {reason}")]
    InvalidAmount { value: String, reason: String },

    #[error("lock period of {days} days is out of range")]
    InvalidLockPeriod { days: u64 },

    #[error(transparent)]
    Step(#[from] StepError),

    #[error("`{step}` failed: {source}")]
    Chain {
        step: StepKind,
        #[source]
        source: ChainError,
    },

    #[error("`{step}` failed: {source}")]
    Backend {
        step: StepKind,
        #[source]
        source: BackendError,
    },

    /// The flow was closed while the step's call was outstanding. The call
    /// itself was not cancelled; its outcome is simply not applied.
    #[error("flow closed while `{step}` was in flight; outcome ignored")]
    Detached { step: StepKind },
}

/// User input for one deposit flow.
#[derive(Debug, Clone)]
pub struct DepositParams {
    /// Token A amount as a decimal string, e.g. `"100"` or `"0.5"`.
    pub amount0: String,
    pub amount1: String,
    pub strategy: Option<Strategy>,
    /// Agent picked from the roster. Its strategy overrides `strategy`.
    pub agent: Option<ApiAgent>,
    pub lock_days: u64,
}

impl Default for DepositParams {
    fn default() -> Self {
        DepositParams {
            amount0: "100".into(),
            amount1: "100".into(),
            strategy: None,
            agent: None,
            lock_days: DEFAULT_LOCK_DAYS,
        }
    }
}

/// Returned by a successful [`DepositFlow::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub completed: StepKind,
    pub next: Option<StepKind>,
}

/// Point-in-time view for presentation.
#[derive(Debug, Clone)]
pub struct FlowSnapshot {
    pub current: Option<StepKind>,
    pub statuses: [StepStatus; 6],
    pub pending: bool,
    pub closed: bool,
    pub last_error: Option<String>,
    pub deposit_id: Option<DepositId>,
    pub analysis: Option<AnalyzeResponse>,
    pub run: Option<AgentRunResponse>,
}

#[derive(Debug, Default)]
struct FlowState {
    steps: StepMachine,
    pending: bool,
    last_error: Option<String>,
    deposit_id: Option<DepositId>,
    analysis: Option<AnalyzeResponse>,
    run: Option<AgentRunResponse>,
}

enum StepOutput {
    Confirmed(Receipt),
    Deposited { receipt: Receipt, deposit_id: DepositId },
    Analyzed(AnalyzeResponse),
    Ran(AgentRunResponse),
}

/// Inputs a step needs, read under the lock before the call goes out.
enum StepInput {
    None,
    Deposit(Strategy),
    Assign { deposit_id: DepositId, agent: Address },
    Analyze(Strategy),
}

pub struct DepositFlow {
    chain: Arc<dyn ChainGateway>,
    backend: Arc<dyn Backend>,
    /// Liquidity-agent contract, the spender of both approvals.
    spender: Address,
    agents: AgentDirectory,
    amount0: U256,
    amount1: U256,
    strategy: Option<Strategy>,
    selected_agent: Option<ApiAgent>,
    lock_seconds: u64,
    state: Mutex<FlowState>,
    closed: AtomicBool,
    events: broadcast::Sender<FlowEvent>,
}

impl DepositFlow {
    /// Open a fresh flow: step 0 active, nothing captured. Amounts are
    /// validated here so a bad input never reaches a gateway.
    pub fn new(
        chain: Arc<dyn ChainGateway>,
        backend: Arc<dyn Backend>,
        spender: Address,
        agents: AgentDirectory,
        params: DepositParams,
    ) -> Result<Self, FlowError> {
        let amount0 = parse_amount(&params.amount0)?;
        let amount1 = parse_amount(&params.amount1)?;
        let strategy = params
            .agent
            .as_ref()
            .map(|a| a.strategy)
            .or(params.strategy);
        let lock_seconds = params
            .lock_days
            .checked_mul(SECONDS_PER_DAY)
            .ok_or(FlowError::InvalidLockPeriod {
                days: params.lock_days,
            })?;
        let (events, _) = broadcast::channel(64);

        Ok(DepositFlow {
            chain,
            backend,
            spender,
            agents,
            amount0,
            amount1,
            strategy,
            selected_agent: params.agent,
            lock_seconds,
            state: Mutex::new(FlowState::default()),
            closed: AtomicBool::new(false),
            events,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FlowEvent> {
        self.events.subscribe()
    }

    pub fn strategy(&self) -> Option<Strategy> {
        self.strategy
    }

    pub async fn snapshot(&self) -> FlowSnapshot {
        let state = self.state.lock().await;
        FlowSnapshot {
            current: state.steps.current(),
            statuses: state.steps.statuses(),
            pending: state.pending,
            closed: self.is_closed(),
            last_error: state.last_error.clone(),
            deposit_id: state.deposit_id,
            analysis: state.analysis.clone(),
            run: state.run.clone(),
        }
    }

    pub async fn deposit_id(&self) -> Option<DepositId> {
        self.state.lock().await.deposit_id
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Stop reacting. Anything already broadcast keeps going on-chain; its
    /// outcome is dropped. Safe to call from a signal handler.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.emit(FlowEvent::Closed);
        }
    }

    /// Analyze a strategy without touching step state.
    pub async fn preview(&self, strategy: Strategy) -> Result<AnalyzeResponse, BackendError> {
        self.backend.analyze(strategy).await
    }

    /// Run the current step. Rejected while another call is outstanding,
    /// after completion and after close.
    pub async fn advance(&self) -> Result<StepReport, FlowError> {
        let (step, input) = {
            let mut state = self.state.lock().await;
            if self.is_closed() {
                return Err(FlowError::Closed);
            }
            if state.pending {
                return Err(FlowError::Busy);
            }
            let step = state.steps.current().ok_or(FlowError::Complete)?;
            let input = self.step_input(step, &state)?;

            state.steps.rearm(step)?;
            state.pending = true;
            state.last_error = None;
            (step, input)
        };

        self.emit(FlowEvent::StepStarted { step });
        let result = self.run_step(step, input).await;

        let mut state = self.state.lock().await;
        state.pending = false;
        if self.is_closed() {
            tracing::info!(%step, "flow closed before the step resolved; ignoring outcome");
            return Err(FlowError::Detached { step });
        }

        match result {
            Ok(output) => {
                match output {
                    StepOutput::Confirmed(receipt) => {
                        tracing::info!(%step, tx_hash = %receipt.tx_hash, "step confirmed");
                    }
                    StepOutput::Deposited { receipt, deposit_id } => {
                        tracing::info!(%step, tx_hash = %receipt.tx_hash, %deposit_id, "deposit confirmed");
                        if state.deposit_id.is_none() {
                            state.deposit_id = Some(deposit_id);
                            self.emit(FlowEvent::DepositIdCaptured { deposit_id });
                        }
                    }
                    StepOutput::Analyzed(analysis) => state.analysis = Some(analysis),
                    StepOutput::Ran(run) => state.run = Some(run),
                }

                let next = state.steps.complete(step)?;
                self.emit(FlowEvent::StepCompleted { step });
                if next.is_none() {
                    if let Some(deposit_id) = state.deposit_id {
                        self.emit(FlowEvent::Completed { deposit_id });
                    }
                }
                Ok(StepReport {
                    completed: step,
                    next,
                })
            }
            Err(err) => {
                state.steps.fail(step)?;
                let message = err.to_string();
                state.last_error = Some(message.clone());
                self.emit(FlowEvent::StepFailed { step, message });
                Err(err)
            }
        }
    }

    fn step_input(&self, step: StepKind, state: &FlowState) -> Result<StepInput, FlowError> {
        let blocked = |reason: &str| FlowError::Blocked {
            step,
            reason: reason.to_string(),
        };

        match step {
            StepKind::Deposit => {
                let strategy = self.strategy.ok_or_else(|| blocked("no strategy chosen"))?;
                Ok(StepInput::Deposit(strategy))
            }
            StepKind::AssignAgent => {
                let deposit_id = state
                    .deposit_id
                    .ok_or_else(|| blocked("no deposit id was captured"))?;
                let strategy = self.strategy.ok_or_else(|| blocked("no strategy chosen"))?;
                let agent = match &self.selected_agent {
                    Some(agent) => agent
                        .address
                        .parse::<Address>()
                        .map_err(|_| blocked(&format!("agent address '{}' is invalid", agent.address)))?,
                    None => self
                        .agents
                        .address_for(strategy)
                        .ok_or_else(|| blocked(&format!("no agent configured for {strategy}")))?,
                };
                Ok(StepInput::Assign { deposit_id, agent })
            }
            StepKind::Analyze => {
                let strategy = self.strategy.ok_or_else(|| blocked("no strategy chosen"))?;
                Ok(StepInput::Analyze(strategy))
            }
            _ => Ok(StepInput::None),
        }
    }

    async fn run_step(&self, step: StepKind, input: StepInput) -> Result<StepOutput, FlowError> {
        let chain_err = |source: ChainError| FlowError::Chain { step, source };
        let backend_err = |source: BackendError| FlowError::Backend { step, source };

        // A close that lands before the call goes out must stop it; one that
        // lands after only drops the outcome.
        self.ensure_open(step)?;
        match (step, input) {
            (StepKind::ApproveTokenA, _) => self
                .submit(ChainAction::Approve {
                    token: TokenSlot::A,
                    spender: self.spender,
                    amount: self.amount0,
                })
                .await
                .map(StepOutput::Confirmed)
                .map_err(chain_err),
            (StepKind::ApproveTokenB, _) => self
                .submit(ChainAction::Approve {
                    token: TokenSlot::B,
                    spender: self.spender,
                    amount: self.amount1,
                })
                .await
                .map(StepOutput::Confirmed)
                .map_err(chain_err),
            (StepKind::Deposit, StepInput::Deposit(strategy)) => {
                // The write does not return the new id, so it is inferred from
                // the counter read right before broadcasting.
                let deposit_id = self.chain.next_deposit_id().await.map_err(chain_err)?;
                tracing::info!(%deposit_id, "snapshotted next deposit id");
                self.ensure_open(step)?;
                let receipt = self
                    .submit(ChainAction::Deposit {
                        amount0: self.amount0,
                        amount1: self.amount1,
                        strategy,
                        lock_seconds: self.lock_seconds,
                    })
                    .await
                    .map_err(chain_err)?;
                Ok(StepOutput::Deposited {
                    receipt,
                    deposit_id,
                })
            }
            (StepKind::AssignAgent, StepInput::Assign { deposit_id, agent }) => self
                .submit(ChainAction::AssignAgent { deposit_id, agent })
                .await
                .map(StepOutput::Confirmed)
                .map_err(chain_err),
            (StepKind::Analyze, StepInput::Analyze(strategy)) => self
                .backend
                .analyze(strategy)
                .await
                .map(StepOutput::Analyzed)
                .map_err(backend_err),
            (StepKind::Finalize, _) => self
                .backend
                .run_agent()
                .await
                .map(StepOutput::Ran)
                .map_err(backend_err),
            (step, _) => Err(FlowError::Blocked {
                step,
                reason: "missing step input".into(),
            }),
        }
    }

    fn ensure_open(&self, step: StepKind) -> Result<(), FlowError> {
        if self.is_closed() {
            tracing::info!(%step, "flow closed before the call went out; not sending");
            return Err(FlowError::Detached { step });
        }
        Ok(())
    }

    async fn submit(&self, action: ChainAction) -> Result<Receipt, ChainError> {
        tracing::info!(action = %action, "submitting");
        self.chain.submit_and_confirm(&action).await
    }

    fn emit(&self, event: FlowEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

/// Parse a human decimal amount into 18-decimal token units.
pub fn parse_amount(value: &str) -> Result<U256, FlowError> {
    let invalid = |reason: &str| FlowError::InvalidAmount {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid("empty"));
    }
    if trimmed.starts_with('-') {
        return Err(invalid("negative"));
    }
    parse_units(trimmed, TOKEN_DECIMALS)
        .map(|units| units.get_absolute())
        .map_err(|e| invalid(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(
            parse_amount("100").unwrap(),
            U256::from(100u64) * U256::from(10u64).pow(U256::from(18u64))
        );
        assert_eq!(
            parse_amount("0.5").unwrap(),
            U256::from(500_000_000_000_000_000u64)
        );
        assert!(matches!(parse_amount(""), Err(FlowError::InvalidAmount { .. })));
        assert!(matches!(parse_amount("-1"), Err(FlowError::InvalidAmount { .. })));
        assert!(matches!(parse_amount("ten"), Err(FlowError::InvalidAmount { .. })));
    }
}
