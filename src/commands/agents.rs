use anyhow::{Context, Result};
use liqu_flow::backend::Backend;
use liqu_flow::model::{AnalyzeResponse, Strategy};

use super::Overrides;

pub fn list(overrides: &Overrides) -> Result<()> {
    let backend = super::backend(overrides)?;
    let resp = super::runtime()?
        .block_on(backend.list_agents())
        .context("listing agents")?;

    if resp.agents.is_empty() {
        println!("No agents registered.");
        return Ok(());
    }

    println!("{:<4} {:<28} {:<14} {:<44} AUTH", "ID", "DOMAIN", "STRATEGY", "ADDRESS");
    for agent in &resp.agents {
        println!(
            "{:<4} {:<28} {:<14} {:<44} {}",
            agent.agent_id,
            agent.domain,
            agent.strategy,
            agent.address,
            if agent.authorized { "yes" } else { "no" },
        );
    }
    Ok(())
}

pub fn analyze(overrides: &Overrides, strategy: Strategy) -> Result<()> {
    let backend = super::backend(overrides)?;
    let analysis = super::runtime()?
        .block_on(backend.analyze(strategy))
        .with_context(|| format!("analyzing {strategy}"))?;
    print_analysis(&analysis);
    Ok(())
}

pub fn print_analysis(analysis: &AnalyzeResponse) {
    let rec = &analysis.recommendation;
    println!("Strategy:   {}", analysis.strategy);
    println!(
        "Pool:       tick {} price {:.6} liquidity {}",
        analysis.pool.tick, analysis.pool.price, analysis.pool.liquidity
    );
    println!("Action:     {}", rec.action);
    println!("Range:      [{}, {}]", rec.tick_lower, rec.tick_upper);
    println!("Confidence: {}%", rec.confidence);
    println!("Reason:     {}", rec.reason);
    if !analysis.agent_address.is_empty() {
        println!("Agent:      {}", analysis.agent_address);
    }
}
