
use std::sync::atomic::Ordering;

use alloy::primitives::Address;

use liqu_flow::chain::{ChainAction, ChainError, TokenSlot};
use liqu_flow::faucet::{FaucetError, faucet_amount, mint_faucet};

use mock_common::*;

#[tokio::test]
async fn test_zero_recipient_never_submits() {
    let chain = MockChain::new();

    let err = mint_faucet(&chain, TokenSlot::A, Address::ZERO)
        .await
        .unwrap_err();
    assert_eq!(err, FaucetError::ZeroRecipient);
    assert!(err.to_string().contains("connect a wallet"));
    assert_eq!(chain.submits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_mint_goes_to_recipient() {
    let chain = MockChain::new();

    mint_faucet(&chain, TokenSlot::B, OWNER).await.unwrap();
    assert_eq!(
        chain.submitted(),
        vec![ChainAction::MintFaucet {
            token: TokenSlot::B,
            to: OWNER,
            amount: faucet_amount(),
        }]
    );
}

#[tokio::test]
async fn test_chain_failure_passes_through() {
    let chain = MockChain::new();
    chain.fail_next("mint", ChainError::UserRejected);

    assert_eq!(
        mint_faucet(&chain, TokenSlot::A, OWNER).await.unwrap_err(),
        FaucetError::Chain(ChainError::UserRejected)
    );
}
