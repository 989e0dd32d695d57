pub mod agent;
pub mod deposit;
pub mod responses;
pub mod strategy;

pub use agent::{AgentsResponse, ApiAgent, StrategyConfig};
pub use deposit::{Deposit, DepositId, DepositStatus, Position};
pub use responses::{AgentRunResponse, AnalyzeResponse, RebalanceResponse};
pub use strategy::Strategy;
