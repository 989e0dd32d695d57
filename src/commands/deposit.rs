use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use liqu_flow::backend::{Backend, HttpBackend};
use liqu_flow::config::Config;
use liqu_flow::deposit::events::log_events;
use liqu_flow::deposit::{DepositFlow, DepositParams, FlowError, FlowSnapshot, StepKind};
use liqu_flow::model::Strategy;

use super::Overrides;

pub struct DepositArgs {
    pub amount0: String,
    pub amount1: String,
    pub strategy: Strategy,
    pub agent_id: Option<u64>,
    pub lock_days: u64,
    pub yes: bool,
}

pub fn run(overrides: &Overrides, args: &DepositArgs) -> Result<()> {
    let config = super::load_config(overrides)?;
    super::runtime()?.block_on(run_async(&config, args))
}

async fn run_async(config: &Config, args: &DepositArgs) -> Result<()> {
    let backend = Arc::new(HttpBackend::new(&config.backend).context("building backend client")?);

    let agent = match args.agent_id {
        Some(id) => {
            let roster = backend.list_agents().await.context("listing agents")?;
            Some(
                roster
                    .find(id)
                    .cloned()
                    .with_context(|| format!("agent #{id} is not registered"))?,
            )
        }
        None => None,
    };

    let interrupted = Arc::new(AtomicBool::new(false));
    let gateway = Arc::new(super::interruptible_gateway(
        config,
        args.yes,
        interrupted.clone(),
    )?);
    let spender = gateway.agent_contract();
    let flow = Arc::new(
        DepositFlow::new(
            gateway,
            backend,
            spender,
            config.agents.clone(),
            DepositParams {
                amount0: args.amount0.clone(),
                amount1: args.amount1.clone(),
                strategy: Some(args.strategy),
                agent: agent.clone(),
                lock_days: args.lock_days,
            },
        )
        .context("invalid deposit parameters")?,
    );

    tokio::spawn(log_events(flow.subscribe()));
    {
        let flow = flow.clone();
        ctrlc::set_handler(move || {
            interrupted.store(true, Ordering::SeqCst);
            flow.close();
        })
        .context("installing Ctrl-C handler")?;
    }

    println!("=== liqu-flow deposit ===");
    println!("Amounts:  {} A / {} B", args.amount0, args.amount1);
    println!(
        "Strategy: {}",
        flow.strategy().map(|s| s.to_string()).unwrap_or_default()
    );
    if let Some(agent) = &agent {
        println!("Agent:    #{} {} ({})", agent.agent_id, agent.domain, agent.address);
    }
    println!("Lock:     {} days", args.lock_days);
    println!();

    loop {
        let Some(step) = flow.snapshot().await.current else {
            break;
        };
        let spinner = args.yes.then(|| spinner(step)).transpose()?;
        if spinner.is_none() {
            println!("── {} ──", step.title());
        }

        let result = flow.advance().await;
        if let Some(pb) = &spinner {
            pb.finish_and_clear();
        }

        match result {
            Ok(report) => println!("  done: {}", report.completed.title()),
            Err(FlowError::Closed | FlowError::Detached { .. }) => {
                println!("\nFlow closed. Transactions already broadcast still settle on-chain.");
                return Ok(());
            }
            Err(e) => {
                eprintln!("  ERROR: {e}");
                if args.yes || !super::ask("  Retry this step?") {
                    anyhow::bail!("deposit flow stopped at '{}'", step.title());
                }
            }
        }
    }

    print_summary(&flow.snapshot().await);
    Ok(())
}

fn spinner(step: StepKind) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("  {spinner} {msg} ({elapsed})")?);
    pb.set_message(step.title());
    pb.enable_steady_tick(Duration::from_millis(120));
    Ok(pb)
}

fn print_summary(snapshot: &FlowSnapshot) {
    println!();
    println!("── Deposit complete ──");
    if let Some(id) = snapshot.deposit_id {
        println!("Deposit ID: {id}");
    }
    if let Some(analysis) = &snapshot.analysis {
        let rec = &analysis.recommendation;
        println!(
            "Range:      [{}, {}] ({}% confidence)",
            rec.tick_lower, rec.tick_upper, rec.confidence
        );
        println!("Reason:     {}", rec.reason);
    }
    if let Some(run) = &snapshot.run {
        if !run.status.is_empty() {
            println!("Agent run:  {}", run.status);
        }
        for hash in &run.tx_hashes {
            println!("  tx {hash}");
        }
    }
}
