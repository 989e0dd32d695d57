use alloy::primitives::{Address, B256, U256};
use thiserror::Error;

use crate::chain::{ChainAction, ChainError, ChainGateway, Receipt, TokenSlot};
use crate::config::EXPLORER_TX_URL;

/// Whole tokens minted per faucet request.
pub const FAUCET_AMOUNT: u64 = 1000;

/// `FAUCET_AMOUNT` in 18-decimal units.
pub fn faucet_amount() -> U256 {
    U256::from(FAUCET_AMOUNT) * U256::from(10u64).pow(U256::from(18u64))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FaucetError {
    /// Nothing was sent.
    #[error("connect a wallet first: recipient is the zero address")]
    ZeroRecipient,

    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// Mint test tokens to `to`.
pub async fn mint_faucet(
    chain: &dyn ChainGateway,
    token: TokenSlot,
    to: Address,
) -> Result<Receipt, FaucetError> {
    if to == Address::ZERO {
        return Err(FaucetError::ZeroRecipient);
    }

    let action = ChainAction::MintFaucet {
        token,
        to,
        amount: faucet_amount(),
    };
    tracing::info!(%token, %to, "minting faucet tokens");
    Ok(chain.submit_and_confirm(&action).await?)
}

/// `0x1234...abcd`
pub fn short_hash(hash: &B256) -> String {
    let s = format!("{hash}");
    format!("{}...{}", &s[..6], &s[s.len() - 4..])
}

pub fn explorer_link(hash: &B256) -> String {
    format!("{EXPLORER_TX_URL}/{hash}")
}
