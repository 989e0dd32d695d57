use std::collections::BTreeMap;
use std::sync::Arc;

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use alloy::sol_types::SolCall;
use async_trait::async_trait;

use crate::config::{AbiLayout, ChainConfig};
use crate::model::DepositId;

use super::{
    ChainAction, ChainError, ChainGateway, RawDeposit, RawValue, Receipt, SigningPrompt,
    TokenSlot, classify_submit_error,
};

// ── Contract interfaces ─────────────────────────────────────────────

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract IFaucetToken {
        function approve(address spender, uint256 amount) external returns (bool);
        function mint(address to, uint256 amount) external;
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract ICLMMLiquidityAgent {
        struct Deposit {
            address user;
            uint256 amount0Remaining;
            uint256 amount1Remaining;
            uint256 depositTime;
            uint256 lockUntil;
            uint8 strategy;
            address assignedAgent;
            uint8 status;
            uint256[] positionTokenIds;
        }

        function deposit(uint256 amount0, uint256 amount1, uint8 strategy, uint256 lockPeriod) external returns (uint256);
        function assignAgent(uint256 depositId, address agent) external;
        function nextDepositId() external view returns (uint256);
        function getUserDeposits(address user) external view returns (uint256[] memory);
        function getDeposit(uint256 depositId) external view returns (Deposit memory);
    }
}

// Deployments predating the Deposit struct return the record as a flat tuple.
sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract ILegacyLiquidityAgent {
        function getDeposit(uint256 depositId) external view returns (
            address user,
            uint256 amount0Remaining,
            uint256 amount1Remaining,
            uint256 depositTime,
            uint256 lockUntil,
            uint8 strategy,
            address assignedAgent,
            uint8 status,
            uint256[] positionTokenIds
        );
    }
}

// ── Gateway ─────────────────────────────────────────────────────────

/// [`ChainGateway`] over a JSON-RPC endpoint, signing locally.
pub struct EvmGateway {
    provider: DynProvider,
    signer_address: Option<Address>,
    /// Every transaction is signed for this chain, so a node on another
    /// network rejects it instead of replaying it there.
    chain_id: u64,
    agent_contract: Address,
    token_a: Address,
    token_b: Address,
    abi_layout: AbiLayout,
    prompt: Arc<dyn SigningPrompt>,
}

impl EvmGateway {
    pub fn new(config: &ChainConfig, prompt: Arc<dyn SigningPrompt>) -> anyhow::Result<Self> {
        let url = config
            .rpc_url
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid RPC URL '{}': {e}", config.rpc_url))?;

        let (provider, signer_address) = match &config.private_key {
            Some(key) => {
                let signer: PrivateKeySigner = key
                    .parse()
                    .map_err(|e| anyhow::anyhow!("Invalid private key: {e}"))?;
                let address = signer.address();
                let wallet = EthereumWallet::from(signer);
                let provider = ProviderBuilder::new()
                    .wallet(wallet)
                    .connect_http(url)
                    .erased();
                (provider, Some(address))
            }
            None => (ProviderBuilder::new().connect_http(url).erased(), None),
        };

        Ok(EvmGateway {
            provider,
            signer_address,
            chain_id: config.chain_id,
            agent_contract: config.agent_contract,
            token_a: config.token_a,
            token_b: config.token_b,
            abi_layout: config.abi_layout,
            prompt,
        })
    }

    /// Address of the configured signing key, if any.
    pub fn signer_address(&self) -> Option<Address> {
        self.signer_address
    }

    pub fn agent_contract(&self) -> Address {
        self.agent_contract
    }

    fn token(&self, slot: TokenSlot) -> Address {
        match slot {
            TokenSlot::A => self.token_a,
            TokenSlot::B => self.token_b,
        }
    }

    fn build_request(&self, action: &ChainAction) -> TransactionRequest {
        let (to, input) = match action {
            ChainAction::Approve {
                token,
                spender,
                amount,
            } => (
                self.token(*token),
                IFaucetToken::approveCall {
                    spender: *spender,
                    amount: *amount,
                }
                .abi_encode(),
            ),
            ChainAction::MintFaucet { token, to, amount } => (
                self.token(*token),
                IFaucetToken::mintCall {
                    to: *to,
                    amount: *amount,
                }
                .abi_encode(),
            ),
            ChainAction::Deposit {
                amount0,
                amount1,
                strategy,
                lock_seconds,
            } => (
                self.agent_contract,
                ICLMMLiquidityAgent::depositCall {
                    amount0: *amount0,
                    amount1: *amount1,
                    strategy: strategy.index(),
                    lockPeriod: U256::from(*lock_seconds),
                }
                .abi_encode(),
            ),
            ChainAction::AssignAgent { deposit_id, agent } => (
                self.agent_contract,
                ICLMMLiquidityAgent::assignAgentCall {
                    depositId: *deposit_id,
                    agent: *agent,
                }
                .abi_encode(),
            ),
        };

        TransactionRequest::default()
            .with_to(to)
            .with_input(input)
            .with_chain_id(self.chain_id)
    }
}

#[async_trait]
impl ChainGateway for EvmGateway {
    async fn submit_and_confirm(&self, action: &ChainAction) -> Result<Receipt, ChainError> {
        let Some(from) = self.signer_address else {
            return Err(ChainError::SubmissionFailed(
                "no signing key configured (set LIQU_PRIVATE_KEY)".into(),
            ));
        };

        if !self.prompt.confirm(action) {
            return Err(ChainError::UserRejected);
        }

        let label = action.label();
        let request = self.build_request(action).with_from(from);

        // First suspension: the node accepts (or refuses) the transaction.
        let pending = self
            .provider
            .send_transaction(request)
            .await
            .map_err(|e| classify_submit_error(&e.to_string()))?;
        let tx_hash = *pending.tx_hash();
        tracing::info!(%tx_hash, action = label, "transaction broadcast");

        // Second suspension: block inclusion.
        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ChainError::Unconfirmed {
                tx_hash,
                message: e.to_string(),
            })?;

        if !receipt.status() {
            return Err(ChainError::ExecutionReverted {
                reason: format!(
                    "{label} tx reverted (hash: {:?}, gas_used: {})",
                    receipt.transaction_hash, receipt.gas_used
                ),
            });
        }

        tracing::info!(
            %tx_hash,
            action = label,
            block = ?receipt.block_number,
            "transaction confirmed"
        );

        Ok(Receipt {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        })
    }

    async fn next_deposit_id(&self) -> Result<DepositId, ChainError> {
        let agent = ICLMMLiquidityAgent::new(self.agent_contract, &self.provider);
        agent
            .nextDepositId()
            .call()
            .await
            .map_err(|e| read_error("nextDepositId", e))
    }

    async fn user_deposits(&self, owner: Address) -> Result<Vec<DepositId>, ChainError> {
        let agent = ICLMMLiquidityAgent::new(self.agent_contract, &self.provider);
        agent
            .getUserDeposits(owner)
            .call()
            .await
            .map_err(|e| read_error("getUserDeposits", e))
    }

    async fn get_deposit(&self, id: DepositId) -> Result<RawDeposit, ChainError> {
        match self.abi_layout {
            AbiLayout::Struct => {
                let agent = ICLMMLiquidityAgent::new(self.agent_contract, &self.provider);
                let d = agent
                    .getDeposit(id)
                    .call()
                    .await
                    .map_err(|e| read_error("getDeposit", e))?;

                let fields = BTreeMap::from([
                    ("user".to_string(), RawValue::Address(d.user)),
                    ("amount0Remaining".to_string(), RawValue::Uint(d.amount0Remaining)),
                    ("amount1Remaining".to_string(), RawValue::Uint(d.amount1Remaining)),
                    ("depositTime".to_string(), RawValue::Uint(d.depositTime)),
                    ("lockUntil".to_string(), RawValue::Uint(d.lockUntil)),
                    ("strategy".to_string(), RawValue::Uint(U256::from(d.strategy))),
                    ("assignedAgent".to_string(), RawValue::Address(d.assignedAgent)),
                    ("status".to_string(), RawValue::Uint(U256::from(d.status))),
                    ("positionTokenIds".to_string(), RawValue::UintArray(d.positionTokenIds)),
                ]);
                Ok(RawDeposit::Named(fields))
            }
            AbiLayout::Flat => {
                let agent = ILegacyLiquidityAgent::new(self.agent_contract, &self.provider);
                let r = agent
                    .getDeposit(id)
                    .call()
                    .await
                    .map_err(|e| read_error("getDeposit", e))?;

                Ok(RawDeposit::Positional(vec![
                    RawValue::Address(r.user),
                    RawValue::Uint(r.amount0Remaining),
                    RawValue::Uint(r.amount1Remaining),
                    RawValue::Uint(r.depositTime),
                    RawValue::Uint(r.lockUntil),
                    RawValue::Uint(U256::from(r.strategy)),
                    RawValue::Address(r.assignedAgent),
                    RawValue::Uint(U256::from(r.status)),
                    RawValue::UintArray(r.positionTokenIds),
                ]))
            }
        }
    }
}

fn read_error(call: &'static str, err: impl std::fmt::Display) -> ChainError {
    ChainError::Read {
        call,
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;
    use crate::chain::AutoApprove;
    use crate::model::Strategy;

    fn gateway(chain_id: u64) -> EvmGateway {
        let config = ChainConfig {
            rpc_url: "http://127.0.0.1:8545".into(),
            chain_id,
            private_key: None,
            agent_contract: address!("2222222222222222222222222222222222222222"),
            token_a: address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"),
            token_b: address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"),
            abi_layout: AbiLayout::Struct,
        };
        EvmGateway::new(&config, Arc::new(AutoApprove)).unwrap()
    }

    #[test]
    fn test_requests_carry_configured_chain_id() {
        let gw = gateway(1301);
        let approve = gw.build_request(&ChainAction::Approve {
            token: TokenSlot::B,
            spender: gw.agent_contract(),
            amount: U256::from(5u64),
        });
        assert_eq!(approve.chain_id, Some(1301));
        assert_eq!(approve.to, Some(gw.token_b.into()));

        let deposit = gateway(10).build_request(&ChainAction::Deposit {
            amount0: U256::from(1u64),
            amount1: U256::from(1u64),
            strategy: Strategy::Degen,
            lock_seconds: 86_400,
        });
        assert_eq!(deposit.chain_id, Some(10));
    }
}
