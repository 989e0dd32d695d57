//! Response contracts of the remote agent backend.
//!
//! The client treats every number in here as opaque: tick bounds, prices and
//! confidence are displayed, never recomputed.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::agent::StrategyConfig;

// ── Analyze ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PoolInfo {
    pub tick: i32,
    pub price: f64,
    /// Raw liquidity, kept as the decimal string the backend sends.
    #[serde(default)]
    pub liquidity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub action: String,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub reason: String,
    /// Percentage, 0-100.
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub strategy: String,
    pub strategy_config: StrategyConfig,
    pub pool: PoolInfo,
    pub recommendation: Recommendation,
    #[serde(default)]
    pub agent_address: String,
}

// ── Agent run ───────────────────────────────────────────────────────

/// Body of `POST /agent/run`. The endpoint's payload varies between
/// deployments, so every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentRunResponse {
    pub agent_id: u64,
    pub agent_domain: String,
    pub agent_address: String,
    pub deposit_id: u64,
    pub pool: Option<PoolInfo>,
    pub status: String,
    pub action: String,
    pub reason: String,
    pub confidence: f64,
    pub tx_hashes: Vec<String>,
    pub message: String,
    pub timestamp: u64,
}

// ── Rebalance ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PoolTick {
    pub tick: i32,
    pub price: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedDeposit {
    pub amount0_remaining: String,
    pub amount1_remaining: String,
    #[serde(default)]
    pub position_token_ids: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PositionTx {
    pub position_id: u64,
    pub tx_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceTransactions {
    /// One close transaction per retired position.
    #[serde(default)]
    pub close: Vec<PositionTx>,
    pub mint: PositionTx,
    pub validation_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceResponse {
    pub deposit_id: u64,
    #[serde(default)]
    pub strategy: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub previous_positions: Vec<u64>,
    pub new_position: u64,
    pub new_tick_lower: i32,
    pub new_tick_upper: i32,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub pool: PoolTick,
    #[serde(default)]
    pub updated_deposit: UpdatedDeposit,
    /// Not every backend deployment reports the transaction bundle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactions: Option<RebalanceTransactions>,
}
