use alloy::primitives::Address;
use anyhow::{Context, Result};
use liqu_flow::chain::TokenSlot;
use liqu_flow::faucet;

use super::Overrides;

pub fn run(overrides: &Overrides, token: TokenSlot, to: Option<&str>) -> Result<()> {
    let config = super::load_config(overrides)?;
    let gateway = super::gateway(&config, true)?;

    let to: Address = match to {
        Some(addr) => addr.parse().with_context(|| format!("invalid recipient '{addr}'"))?,
        None => gateway
            .signer_address()
            .context("no recipient: pass --to or set LIQU_PRIVATE_KEY")?,
    };

    println!("Minting {} {token} to {to}...", faucet::FAUCET_AMOUNT);
    let receipt = super::runtime()?
        .block_on(faucet::mint_faucet(&gateway, token, to))
        .context("faucet mint")?;

    println!("Minted. tx {}", faucet::short_hash(&receipt.tx_hash));
    println!("  {}", faucet::explorer_link(&receipt.tx_hash));
    Ok(())
}
