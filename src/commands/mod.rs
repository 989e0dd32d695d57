pub mod agents;
pub mod deposit;
pub mod ens;
pub mod faucet;
pub mod positions;
pub mod rebalance;

use std::io::{BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use liqu_flow::backend::HttpBackend;
use liqu_flow::chain::evm::EvmGateway;
use liqu_flow::chain::{AutoApprove, ChainAction, SigningPrompt};
use liqu_flow::config::{BackendConfig, Config};

/// Global flags that win over the environment.
pub struct Overrides {
    pub rpc_url: Option<String>,
    pub backend_url: Option<String>,
}

impl Overrides {
    fn apply_backend(&self, backend: &mut BackendConfig) {
        if let Some(url) = &self.backend_url {
            backend.base_url = url.clone();
        }
    }
}

pub fn load_config(overrides: &Overrides) -> Result<Config> {
    let mut config = Config::from_env().context("loading configuration")?;
    if let Some(url) = &overrides.rpc_url {
        config.chain.rpc_url = url.clone();
    }
    overrides.apply_backend(&mut config.backend);
    Ok(config)
}

pub fn backend(overrides: &Overrides) -> Result<HttpBackend> {
    let mut config = BackendConfig::from_env().context("loading backend configuration")?;
    overrides.apply_backend(&mut config);
    HttpBackend::new(&config).context("building backend client")
}

/// `yes` skips the per-transaction prompt.
pub fn gateway(config: &Config, yes: bool) -> Result<EvmGateway> {
    interruptible_gateway(config, yes, Arc::new(AtomicBool::new(false)))
}

/// Like [`gateway`], but once `cancelled` is set every prompt answers no,
/// including one the user was already typing into.
pub fn interruptible_gateway(
    config: &Config,
    yes: bool,
    cancelled: Arc<AtomicBool>,
) -> Result<EvmGateway> {
    let prompt: Arc<dyn SigningPrompt> = if yes {
        Arc::new(AutoApprove)
    } else {
        Arc::new(TerminalPrompt { cancelled })
    };
    EvmGateway::new(&config.chain, prompt)
}

pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("creating tokio runtime")
}

/// Ask a yes/no question on stdin. Anything but `y`/`yes` is a no.
pub fn ask(question: &str) -> bool {
    print!("{question} [y/N] ");
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line) {
        Ok(_) => matches!(line.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

/// Stands in for the wallet's signing dialog.
pub struct TerminalPrompt {
    cancelled: Arc<AtomicBool>,
}

impl SigningPrompt for TerminalPrompt {
    fn confirm(&self, action: &ChainAction) -> bool {
        if self.cancelled.load(Ordering::SeqCst) {
            return false;
        }
        let approved = ask(&format!("  Sign {action}?"));
        // Ctrl-C while the read was blocked.
        approved && !self.cancelled.load(Ordering::SeqCst)
    }
}
