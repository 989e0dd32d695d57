use schemars::schema_for;
use serde_json::json;

use crate::model::{AgentRunResponse, AgentsResponse, AnalyzeResponse, RebalanceResponse};

/// JSON Schema for every backend response the client decodes, keyed by
/// endpoint.
pub fn get_schema_json() -> serde_json::Value {
    json!({
        "GET /agents/all": schema_for!(AgentsResponse),
        "POST /analyze": schema_for!(AnalyzeResponse),
        "POST /rebalance/{depositId}": schema_for!(RebalanceResponse),
        "POST /agent/run": schema_for!(AgentRunResponse),
    })
}

/// Generate and print the backend response schemas.
pub fn run() -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&get_schema_json())?;
    println!("{json}");
    Ok(())
}
