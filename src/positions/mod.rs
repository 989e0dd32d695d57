//! Read-only view of an owner's deposits.

pub mod normalize;

use std::sync::Arc;

use alloy::primitives::Address;
use futures::future::join_all;
use tokio::sync::Mutex;

use crate::chain::{ChainError, ChainGateway};
use crate::model::Position;

pub use normalize::normalize_deposit;

pub struct PositionRegistry {
    chain: Arc<dyn ChainGateway>,
    last_owner: Mutex<Option<Address>>,
}

impl PositionRegistry {
    pub fn new(chain: Arc<dyn ChainGateway>) -> Self {
        PositionRegistry {
            chain,
            last_owner: Mutex::new(None),
        }
    }

    /// Two-phase read: the owner's deposit ids, then every record in one
    /// concurrent batch. Records that fail to load are left out of the
    /// result; only a failure to read the id list is returned as an error.
    pub async fn list_positions(&self, owner: Address) -> Result<Vec<Position>, ChainError> {
        *self.last_owner.lock().await = Some(owner);

        let ids = self.chain.user_deposits(owner).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let records = join_all(ids.iter().map(|id| self.chain.get_deposit(*id))).await;

        let mut positions = Vec::with_capacity(ids.len());
        for (deposit_id, record) in ids.into_iter().zip(records) {
            match record {
                Ok(raw) => positions.push(Position {
                    deposit_id,
                    deposit: normalize_deposit(&raw),
                }),
                Err(e) => {
                    tracing::warn!(%deposit_id, error = %e, "skipping deposit that failed to load");
                }
            }
        }

        tracing::debug!(%owner, count = positions.len(), "positions loaded");
        Ok(positions)
    }

    /// Re-run [`list_positions`](Self::list_positions) for the last owner.
    /// Returns an empty list if nothing was listed yet.
    pub async fn refetch(&self) -> Result<Vec<Position>, ChainError> {
        let owner = *self.last_owner.lock().await;
        match owner {
            Some(owner) => self.list_positions(owner).await,
            None => Ok(Vec::new()),
        }
    }
}
