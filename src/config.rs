use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::{Address, address};
use thiserror::Error;

use crate::model::Strategy;

pub const DEFAULT_RPC_URL: &str = "https://sepolia.unichain.org";
/// Unichain Sepolia.
pub const DEFAULT_CHAIN_ID: u64 = 1301;
pub const DEFAULT_BACKEND_URL: &str = "https://backend-agent-seven.vercel.app/api";
pub const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_ENS_BASE_DOMAIN: &str = "liqu.finance.eth";
pub const EXPLORER_TX_URL: &str = "https://unichain-sepolia.blockscout.com/tx";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} env var not set")]
    Missing(&'static str),

    #[error("{var} is not a valid {expected}: '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Which `getDeposit` ABI the deployed liquidity-agent contract exposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AbiLayout {
    /// Returns a single `Deposit` struct.
    #[default]
    Struct,
    /// Returns nine flat outputs.
    Flat,
}

impl FromStr for AbiLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "struct" => Ok(AbiLayout::Struct),
            "flat" | "tuple" => Ok(AbiLayout::Flat),
            other => Err(format!("unknown ABI layout '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    /// Hex private key. Only required for writes.
    pub private_key: Option<String>,
    pub agent_contract: Address,
    pub token_a: Address,
    pub token_b: Address,
    pub abi_layout: AbiLayout,
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    /// Caller-side bound on every backend request.
    pub timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS),
        }
    }
}

impl BackendConfig {
    /// Backend settings alone, for commands that never touch the chain.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|key: &str| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout_secs = match get("LIQU_BACKEND_TIMEOUT_SECS") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                var: "LIQU_BACKEND_TIMEOUT_SECS",
                expected: "number of seconds",
                value: v,
            })?,
            None => DEFAULT_BACKEND_TIMEOUT_SECS,
        };

        Ok(BackendConfig {
            base_url: get("LIQU_BACKEND_URL").unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// `ENS_BASE_DOMAIN`, or the default parent domain.
pub fn ens_base_domain<F>(lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup("ENS_BASE_DOMAIN")
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ENS_BASE_DOMAIN.to_string())
}

/// Default agent contract per strategy, used when the user picked a strategy
/// without selecting a specific agent from the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDirectory {
    addresses: HashMap<Strategy, Address>,
}

impl Default for AgentDirectory {
    fn default() -> Self {
        AgentDirectory {
            addresses: HashMap::from([
                (Strategy::Conservative, address!("5b6A404F8958E7e10028301549e61435925725Bf")),
                (Strategy::Balanced, address!("6c52aAD1Cbb66C0f666b62b36261d2f2205A8607")),
                (Strategy::Degen, address!("5B20B5a4Bba73bC6363fBE90E6b2Ab4fFF5C820e")),
            ]),
        }
    }
}

impl AgentDirectory {
    pub fn address_for(&self, strategy: Strategy) -> Option<Address> {
        self.addresses.get(&strategy).copied()
    }

    pub fn set(&mut self, strategy: Strategy, agent: Address) {
        self.addresses.insert(strategy, agent);
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub chain: ChainConfig,
    pub backend: BackendConfig,
    pub agents: AgentDirectory,
    pub ens_base_domain: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary key lookup (the process environment in
    /// production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let chain_id = match get("LIQU_CHAIN_ID") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                var: "LIQU_CHAIN_ID",
                expected: "chain id",
                value: v,
            })?,
            None => DEFAULT_CHAIN_ID,
        };

        let abi_layout = match get("LIQU_ABI_LAYOUT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                var: "LIQU_ABI_LAYOUT",
                expected: "ABI layout (struct|flat)",
                value: v,
            })?,
            None => AbiLayout::default(),
        };

        let chain = ChainConfig {
            rpc_url: get("LIQU_RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_string()),
            chain_id,
            private_key: get("LIQU_PRIVATE_KEY"),
            agent_contract: required_address(&get, "LIQU_AGENT_CONTRACT")?,
            token_a: required_address(&get, "LIQU_TOKEN_A")?,
            token_b: required_address(&get, "LIQU_TOKEN_B")?,
            abi_layout,
        };

        let backend = BackendConfig::from_lookup(&lookup)?;

        let mut agents = AgentDirectory::default();
        for (strategy, var) in [
            (Strategy::Conservative, "LIQU_AGENT_CONSERVATIVE"),
            (Strategy::Balanced, "LIQU_AGENT_BALANCED"),
            (Strategy::Degen, "LIQU_AGENT_DEGEN"),
        ] {
            if let Some(v) = get(var) {
                agents.set(strategy, parse_address(var, v)?);
            }
        }

        Ok(Config {
            chain,
            backend,
            agents,
            ens_base_domain: ens_base_domain(&lookup),
        })
    }
}

fn required_address<F>(get: &F, var: &'static str) -> Result<Address, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = get(var).ok_or(ConfigError::Missing(var))?;
    parse_address(var, value)
}

fn parse_address(var: &'static str, value: String) -> Result<Address, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        expected: "address",
        value,
    })
}
