use clap::{Parser, Subcommand, ValueEnum};

use liqu_flow::chain::TokenSlot;
use liqu_flow::model::Strategy;

/// Liquidity-agent client: deposit into managed Uniswap v4 positions,
/// inspect them, and trigger AI-agent rebalances.
#[derive(Parser)]
#[command(name = "liqu-flow", version, about)]
pub struct Cli {
    /// Chain RPC endpoint (overrides LIQU_RPC_URL)
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// Agent backend base URL (overrides LIQU_BACKEND_URL)
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TokenArg {
    A,
    B,
}

impl From<TokenArg> for TokenSlot {
    fn from(t: TokenArg) -> Self {
        match t {
            TokenArg::A => TokenSlot::A,
            TokenArg::B => TokenSlot::B,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// List the AI agents registered with the backend
    Agents,

    /// Ask the backend for a range recommendation
    Analyze {
        /// conservative, balanced or degen (or 0/1/2)
        #[arg(long, default_value = "conservative")]
        strategy: Strategy,
    },

    /// List deposits owned by an address
    Positions {
        /// Owner address (default: the configured signer)
        #[arg(long)]
        owner: Option<String>,
    },

    /// Run the six-step deposit flow
    Deposit {
        /// Token A amount, in whole tokens
        #[arg(long, default_value = "100")]
        amount0: String,

        /// Token B amount, in whole tokens
        #[arg(long, default_value = "100")]
        amount1: String,

        #[arg(long, default_value = "conservative")]
        strategy: Strategy,

        /// Pick a specific agent from the roster; its strategy wins
        #[arg(long)]
        agent_id: Option<u64>,

        #[arg(long, default_value = "30")]
        lock_days: u64,

        /// Sign every transaction without asking, stop on the first failure
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Rebalance one deposit through its assigned agent
    Rebalance {
        deposit_id: u64,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Mint 1000 test tokens
    Faucet {
        #[arg(long, value_enum)]
        token: TokenArg,

        /// Recipient (default: the configured signer)
        #[arg(long)]
        to: Option<String>,
    },

    /// Show the ENS name an agent label would claim
    EnsName {
        name: String,
    },

    /// Serve the ENS claim endpoint over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, default_value = "8080")]
        port: u16,
    },

    /// Output the JSON schema of the backend responses
    Schema,
}
