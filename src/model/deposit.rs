use alloy::primitives::{Address, U256};
use serde::Serialize;

use super::strategy::Strategy;

/// Identifier the liquidity-agent contract assigns to a deposit.
pub type DepositId = U256;

/// Lifecycle of a deposit on the contract. Transitions only move forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepositStatus {
    #[default]
    Active,
    Processing,
    Closed,
}

impl DepositStatus {
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(DepositStatus::Active),
            1 => Some(DepositStatus::Processing),
            2 => Some(DepositStatus::Closed),
            _ => None,
        }
    }
}

/// Canonical client-side mirror of an on-chain deposit record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Deposit {
    pub owner: Address,
    pub amount0_remaining: U256,
    pub amount1_remaining: U256,
    pub deposit_time: u64,
    pub lock_until: u64,
    pub strategy: Strategy,
    /// Zero address while no agent is assigned.
    pub assigned_agent: Address,
    pub status: DepositStatus,
    /// Minted CLMM position NFTs. Empty until the finalize step; membership
    /// changes on rebalance.
    pub position_token_ids: Vec<U256>,
}

impl Deposit {
    pub fn is_assigned(&self) -> bool {
        self.assigned_agent != Address::ZERO
    }

    /// Whether funds are still time-locked at unix time `now`.
    pub fn is_locked(&self, now: u64) -> bool {
        now < self.lock_until
    }
}

/// A deposit together with its id, as listed for one owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Position {
    pub deposit_id: DepositId,
    pub deposit: Deposit,
}
