use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::strategy::Strategy;

/// Strategy tuning the backend attaches to every agent and analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StrategyConfig {
    pub tick_range_multiplier: f64,
    /// Fraction, e.g. `0.005` for 0.5%.
    pub max_slippage: f64,
    pub rebalance_threshold: f64,
    #[serde(default)]
    pub description: String,
}

/// An AI agent as listed by `GET /agents/all`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiAgent {
    pub agent_id: u64,
    pub domain: String,
    pub address: String,
    pub strategy: Strategy,
    pub strategy_config: StrategyConfig,
    #[serde(default)]
    pub authorized: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AgentsResponse {
    pub agents: Vec<ApiAgent>,
}

impl AgentsResponse {
    pub fn find(&self, agent_id: u64) -> Option<&ApiAgent> {
        self.agents.iter().find(|a| a.agent_id == agent_id)
    }
}
