use std::sync::Arc;

use alloy::primitives::U256;
use anyhow::{Context, Result};
use liqu_flow::backend::HttpBackend;
use liqu_flow::config::Config;
use liqu_flow::model::RebalanceResponse;
use liqu_flow::positions::PositionRegistry;
use liqu_flow::rebalance::RebalanceFlow;

use super::Overrides;
use super::positions::print_position;

pub fn run(overrides: &Overrides, deposit_id: u64, yes: bool) -> Result<()> {
    let config = super::load_config(overrides)?;
    super::runtime()?.block_on(run_async(&config, U256::from(deposit_id), yes))
}

async fn run_async(config: &Config, deposit_id: U256, yes: bool) -> Result<()> {
    let backend = Arc::new(HttpBackend::new(&config.backend).context("building backend client")?);
    let gateway = super::gateway(config, true)?;
    let owner = gateway.signer_address();
    let registry = Arc::new(PositionRegistry::new(Arc::new(gateway)));

    // Listing first lets the registry refetch the same owner afterwards.
    if let Some(owner) = owner {
        let positions = registry.list_positions(owner).await.context("loading positions")?;
        match positions.iter().find(|p| p.deposit_id == deposit_id) {
            Some(position) => print_position(position),
            None => println!("Deposit #{deposit_id} is not owned by {owner}."),
        }
        println!();
    }

    let flow = RebalanceFlow::new(backend, owner.map(|_| registry));
    flow.request_rebalance(deposit_id).await;

    if !yes && !super::ask(&format!("Rebalance deposit #{deposit_id}?")) {
        flow.cancel_rebalance().await;
        println!("Cancelled.");
        return Ok(());
    }

    println!("Rebalancing deposit #{deposit_id}...");
    let outcome = flow
        .confirm_rebalance()
        .await
        .with_context(|| format!("rebalancing deposit #{deposit_id}"))?;

    print_result(&outcome.result);
    if let Some(position) = outcome
        .positions
        .as_deref()
        .and_then(|ps| ps.iter().find(|p| p.deposit_id == deposit_id))
    {
        println!("\nUpdated deposit:");
        print_position(position);
    }
    Ok(())
}

fn print_result(r: &RebalanceResponse) {
    println!("Action:       {}", r.action);
    println!("Closed:       {:?}", r.previous_positions);
    println!("New position: #{}", r.new_position);
    println!("Range:        [{}, {}]", r.new_tick_lower, r.new_tick_upper);
    println!("Pool:         tick {} price {:.6}", r.pool.tick, r.pool.price);
    if !r.reason.is_empty() {
        println!("Reason:       {}", r.reason);
    }
    if let Some(txs) = &r.transactions {
        for close in &txs.close {
            println!("  close #{} tx {}", close.position_id, close.tx_hash);
        }
        println!("  mint  #{} tx {}", txs.mint.position_id, txs.mint.tx_hash);
        println!("  validation {}", txs.validation_hash);
    }
}
