//! Two-phase rebalance: stage a position, then confirm to fire the backend
//! call. At most one call per position is in flight.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::backend::{Backend, BackendError};
use crate::model::{DepositId, Position, RebalanceResponse};
use crate::positions::PositionRegistry;

#[derive(Debug, Error)]
pub enum RebalanceError {
    #[error("no position staged for rebalance")]
    NothingStaged,

    #[error("deposit #{0} is already being rebalanced")]
    AlreadyProcessing(DepositId),

    #[error("rebalance failed: {0}")]
    Backend(#[from] BackendError),
}

#[derive(Debug, Clone)]
pub struct RebalanceOutcome {
    pub result: RebalanceResponse,
    /// Fresh position list, if the refetch after the rebalance succeeded.
    pub positions: Option<Vec<Position>>,
}

#[derive(Debug, Default)]
struct RebalanceState {
    staged: Option<DepositId>,
    in_flight: HashSet<DepositId>,
    last_result: Option<RebalanceResponse>,
    last_error: Option<String>,
}

pub struct RebalanceFlow {
    backend: Arc<dyn Backend>,
    registry: Option<Arc<PositionRegistry>>,
    state: Mutex<RebalanceState>,
}

impl RebalanceFlow {
    /// `registry`, when given, is refetched after every successful rebalance.
    pub fn new(backend: Arc<dyn Backend>, registry: Option<Arc<PositionRegistry>>) -> Self {
        RebalanceFlow {
            backend,
            registry,
            state: Mutex::new(RebalanceState::default()),
        }
    }

    /// Select a position for confirmation. No network call.
    pub async fn request_rebalance(&self, deposit_id: DepositId) {
        let mut state = self.state.lock().await;
        state.staged = Some(deposit_id);
        state.last_error = None;
    }

    /// Drop the staged selection. No network call.
    pub async fn cancel_rebalance(&self) {
        self.state.lock().await.staged = None;
    }

    pub async fn staged(&self) -> Option<DepositId> {
        self.state.lock().await.staged
    }

    pub async fn is_processing(&self, deposit_id: DepositId) -> bool {
        self.state.lock().await.in_flight.contains(&deposit_id)
    }

    pub async fn last_result(&self) -> Option<RebalanceResponse> {
        self.state.lock().await.last_result.clone()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.lock().await.last_error.clone()
    }

    /// Fire exactly one rebalance for the staged position.
    ///
    /// On failure the selection stays staged so the caller can retry, and
    /// the registry is not refetched.
    pub async fn confirm_rebalance(&self) -> Result<RebalanceOutcome, RebalanceError> {
        let deposit_id = {
            let mut state = self.state.lock().await;
            let id = state.staged.ok_or(RebalanceError::NothingStaged)?;
            if !state.in_flight.insert(id) {
                return Err(RebalanceError::AlreadyProcessing(id));
            }
            id
        };

        tracing::info!(%deposit_id, "rebalancing");
        let result = self.backend.rebalance(deposit_id).await;

        {
            let mut state = self.state.lock().await;
            state.in_flight.remove(&deposit_id);
            match &result {
                Ok(response) => {
                    state.last_result = Some(response.clone());
                    state.last_error = None;
                    if state.staged == Some(deposit_id) {
                        state.staged = None;
                    }
                }
                Err(e) => {
                    tracing::warn!(%deposit_id, error = %e, "rebalance failed");
                    state.last_error = Some(e.to_string());
                }
            }
        }

        let result = result?;
        let positions = match &self.registry {
            Some(registry) => match registry.refetch().await {
                Ok(positions) => Some(positions),
                Err(e) => {
                    tracing::warn!(error = %e, "refetch after rebalance failed");
                    None
                }
            },
            None => None,
        };

        Ok(RebalanceOutcome { result, positions })
    }
}
