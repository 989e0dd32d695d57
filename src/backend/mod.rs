//! Backend action gateway: the remote agent API.

pub mod http;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{
    AgentRunResponse, AgentsResponse, AnalyzeResponse, DepositId, RebalanceResponse, Strategy,
};

pub use http::HttpBackend;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Non-2xx response. `message` is the server's own message when the body
    /// carried one.
    #[error("backend returned {status}{}", message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status { status: u16, message: Option<String> },

    #[error("backend request timed out")]
    Timeout,

    #[error("backend request failed: {0}")]
    Transport(String),

    #[error("unexpected backend response: {0}")]
    Decode(String),
}

/// One request/response per operation. Implementations never retry; that is
/// the caller's decision.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `GET /agents/all`
    async fn list_agents(&self) -> Result<AgentsResponse, BackendError>;

    /// `POST /analyze` with `{ strategy }`
    async fn analyze(&self, strategy: Strategy) -> Result<AnalyzeResponse, BackendError>;

    /// `POST /rebalance/{deposit_id}`
    async fn rebalance(&self, deposit_id: DepositId) -> Result<RebalanceResponse, BackendError>;

    /// `POST /agent/run`
    async fn run_agent(&self) -> Result<AgentRunResponse, BackendError>;
}
