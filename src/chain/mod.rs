//! Chain action gateway: submit a write and await its receipt as a single
//! awaitable, plus the read-only views of the liquidity-agent contract.

pub mod evm;

use std::collections::BTreeMap;
use std::fmt;

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use thiserror::Error;

use crate::model::{DepositId, Strategy};

// ── Actions ─────────────────────────────────────────────────────────

/// Which of the two pool tokens an action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenSlot {
    A,
    B,
}

impl fmt::Display for TokenSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSlot::A => f.write_str("token A"),
            TokenSlot::B => f.write_str("token B"),
        }
    }
}

/// A state-changing contract call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainAction {
    Approve {
        token: TokenSlot,
        spender: Address,
        amount: U256,
    },
    Deposit {
        amount0: U256,
        amount1: U256,
        strategy: Strategy,
        lock_seconds: u64,
    },
    AssignAgent {
        deposit_id: DepositId,
        agent: Address,
    },
    MintFaucet {
        token: TokenSlot,
        to: Address,
        amount: U256,
    },
}

impl ChainAction {
    pub fn label(&self) -> &'static str {
        match self {
            ChainAction::Approve { .. } => "approve",
            ChainAction::Deposit { .. } => "deposit",
            ChainAction::AssignAgent { .. } => "assignAgent",
            ChainAction::MintFaucet { .. } => "mint",
        }
    }
}

impl fmt::Display for ChainAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainAction::Approve { token, spender, amount } => {
                write!(f, "approve {amount} of {token} for {spender}")
            }
            ChainAction::Deposit {
                amount0,
                amount1,
                strategy,
                lock_seconds,
            } => write!(
                f,
                "deposit {amount0} / {amount1} ({strategy}, locked {lock_seconds}s)"
            ),
            ChainAction::AssignAgent { deposit_id, agent } => {
                write!(f, "assign agent {agent} to deposit #{deposit_id}")
            }
            ChainAction::MintFaucet { token, to, amount } => {
                write!(f, "mint {amount} of {token} to {to}")
            }
        }
    }
}

/// Confirmation receipt of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("transaction signing was rejected by the user")]
    UserRejected,

    #[error("transaction submission failed: {0}")]
    SubmissionFailed(String),

    #[error("execution reverted: {reason}")]
    ExecutionReverted { reason: String },

    #[error("transaction {tx_hash} was broadcast but not confirmed: {message}")]
    Unconfirmed { tx_hash: B256, message: String },

    #[error("contract read `{call}` failed: {message}")]
    Read { call: &'static str, message: String },
}

/// Map a raw provider/wallet error message onto the gateway taxonomy.
///
/// Wallet rejections come back as EIP-1193 code 4001 or a "user rejected /
/// denied" message; reverts surface during gas estimation before anything is
/// broadcast. Everything else is a submission failure.
pub fn classify_submit_error(message: &str) -> ChainError {
    let lower = message.to_lowercase();
    if lower.contains("4001") || lower.contains("user rejected") || lower.contains("user denied")
    {
        ChainError::UserRejected
    } else if lower.contains("revert") {
        ChainError::ExecutionReverted {
            reason: message.to_string(),
        }
    } else {
        ChainError::SubmissionFailed(message.to_string())
    }
}

// ── Raw deposit encodings ───────────────────────────────────────────

/// One decoded value of a `getDeposit` return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Address(Address),
    Uint(U256),
    UintArray(Vec<U256>),
}

/// `getDeposit` output before normalization. Struct-layout ABIs decode into
/// named fields, legacy flat ABIs into a positional tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawDeposit {
    Positional(Vec<RawValue>),
    Named(BTreeMap<String, RawValue>),
}

// ── Gateway trait ───────────────────────────────────────────────────

#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Broadcast exactly one transaction for `action` and wait until it is
    /// mined. Never retries.
    async fn submit_and_confirm(&self, action: &ChainAction) -> Result<Receipt, ChainError>;

    /// The contract's `nextDepositId()` counter.
    async fn next_deposit_id(&self) -> Result<DepositId, ChainError>;

    async fn user_deposits(&self, owner: Address) -> Result<Vec<DepositId>, ChainError>;

    async fn get_deposit(&self, id: DepositId) -> Result<RawDeposit, ChainError>;
}

/// Consulted before every broadcast. Returning `false` aborts the action
/// with [`ChainError::UserRejected`].
pub trait SigningPrompt: Send + Sync {
    fn confirm(&self, action: &ChainAction) -> bool;
}

/// Signs everything without asking.
pub struct AutoApprove;

impl SigningPrompt for AutoApprove {
    fn confirm(&self, _action: &ChainAction) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_wallet_rejection() {
        assert_eq!(
            classify_submit_error("server returned an error response: error code 4001: User rejected the request."),
            ChainError::UserRejected
        );
        assert_eq!(
            classify_submit_error("MetaMask Tx Signature: User denied transaction signature."),
            ChainError::UserRejected
        );
    }

    #[test]
    fn test_classify_revert_keeps_reason_verbatim() {
        let msg = "execution reverted: ERC20: insufficient allowance";
        assert_eq!(
            classify_submit_error(msg),
            ChainError::ExecutionReverted {
                reason: msg.to_string()
            }
        );
    }

    #[test]
    fn test_classify_transport_failure() {
        assert!(matches!(
            classify_submit_error("error sending request for url (https://sepolia.unichain.org/)"),
            ChainError::SubmissionFailed(_)
        ));
    }
}
