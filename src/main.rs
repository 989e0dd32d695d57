use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;

fn main() -> anyhow::Result<()> {
    // Logs on stderr; stdout is the command's output.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "liqu_flow=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = cli::Cli::parse();
    let overrides = commands::Overrides {
        rpc_url: cli.rpc_url,
        backend_url: cli.backend_url,
    };

    match cli.command {
        cli::Command::Schema => liqu_flow::schema::run(),
        cli::Command::EnsName { name } => commands::ens::run(&name),
        cli::Command::Serve { host, port } => commands::ens::serve(&host, port),
        cli::Command::Agents => commands::agents::list(&overrides),
        cli::Command::Analyze { strategy } => commands::agents::analyze(&overrides, strategy),
        cli::Command::Positions { owner } => commands::positions::run(&overrides, owner.as_deref()),
        cli::Command::Deposit {
            amount0,
            amount1,
            strategy,
            agent_id,
            lock_days,
            yes,
        } => commands::deposit::run(&overrides, &commands::deposit::DepositArgs {
            amount0,
            amount1,
            strategy,
            agent_id,
            lock_days,
            yes,
        }),
        cli::Command::Rebalance { deposit_id, yes } => {
            commands::rebalance::run(&overrides, deposit_id, yes)
        }
        cli::Command::Faucet { token, to } => {
            commands::faucet::run(&overrides, token.into(), to.as_deref())
        }
    }
}
