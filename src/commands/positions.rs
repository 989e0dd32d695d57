use std::sync::Arc;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use liqu_flow::model::Position;
use liqu_flow::positions::PositionRegistry;

use super::Overrides;

pub fn run(overrides: &Overrides, owner: Option<&str>) -> Result<()> {
    let config = super::load_config(overrides)?;
    let gateway = super::gateway(&config, true)?;

    let owner: Address = match owner {
        Some(addr) => addr.parse().with_context(|| format!("invalid owner '{addr}'"))?,
        None => gateway
            .signer_address()
            .context("no owner: pass --owner or set LIQU_PRIVATE_KEY")?,
    };

    let registry = PositionRegistry::new(Arc::new(gateway));
    let positions = super::runtime()?
        .block_on(registry.list_positions(owner))
        .context("loading positions")?;

    println!("Positions of {owner}: {}", positions.len());
    for position in &positions {
        print_position(position);
    }
    Ok(())
}

pub fn print_position(position: &Position) {
    let d = &position.deposit;
    let now = Utc::now().timestamp().max(0) as u64;
    let agent = if d.is_assigned() {
        d.assigned_agent.to_string()
    } else {
        "unassigned".to_string()
    };
    let lock = if d.is_locked(now) {
        format!("locked until {}", format_ts(d.lock_until))
    } else {
        "unlocked".to_string()
    };

    println!();
    println!("  Deposit #{} ({:?}, {})", position.deposit_id, d.status, d.strategy);
    println!("    Amounts:   {} / {}", d.amount0_remaining, d.amount1_remaining);
    println!("    Agent:     {agent}");
    println!("    Lock:      {lock}");
    if !d.position_token_ids.is_empty() {
        let ids: Vec<String> = d.position_token_ids.iter().map(|id| id.to_string()).collect();
        println!("    Positions: {}", ids.join(", "));
    }
}

fn format_ts(ts: u64) -> String {
    DateTime::<Utc>::from_timestamp(ts as i64, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| ts.to_string())
}
