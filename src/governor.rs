//! The governor gateway: the one port through which the submitter touches
//! the chain. Tests script a mock; real runs go through JSON-RPC.

use crate::abi;
use crate::domain::types::Proposal;
use crate::errors::ProposeError;
use crate::rpc::HttpRpcClient;
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use log::debug;

pub const PROPOSAL_COUNT_SIGNATURE: &str = "proposalCount()";

#[async_trait]
pub trait GovernorGateway: Send + Sync {
    fn governor_address(&self) -> Address;

    /// Current value of the governor's proposal counter.
    async fn proposal_count(&self) -> Result<u64, ProposeError>;

    /// Submit the `propose` transaction. Returns the transaction hash; the
    /// proposal id is not returned by the contract and must be derived from
    /// the counter afterwards.
    async fn send_propose(&self, proposal: &Proposal) -> Result<String, ProposeError>;

    /// Confirmation count for a submitted transaction, or `None` while it is
    /// still pending.
    async fn tx_confirmations(&self, tx_hash: &str) -> Result<Option<u64>, ProposeError>;
}

pub struct HttpGovernorGateway {
    rpc: HttpRpcClient,
    governor: Address,
    deployer: Address,
    gas_premium_pct: u64,
}

impl HttpGovernorGateway {
    pub fn new(
        rpc: HttpRpcClient,
        governor: Address,
        deployer: Address,
        gas_premium_pct: u64,
    ) -> Self {
        Self {
            rpc,
            governor,
            deployer,
            gas_premium_pct,
        }
    }
}

#[async_trait]
impl GovernorGateway for HttpGovernorGateway {
    fn governor_address(&self) -> Address {
        self.governor
    }

    async fn proposal_count(&self) -> Result<u64, ProposeError> {
        let data = abi::selector(PROPOSAL_COUNT_SIGNATURE).to_vec();
        let returned = self.rpc.eth_call(&self.governor, &data).await?;
        decode_count(&returned)
    }

    async fn send_propose(&self, proposal: &Proposal) -> Result<String, ProposeError> {
        let (targets, call_datas, signatures) = proposal.as_triple();
        let data = abi::encode_propose(&targets, &call_datas, &signatures, &proposal.description);
        let base_gas_price = self.rpc.eth_gas_price().await?;
        let gas_price = premium_gas_price(base_gas_price, self.gas_premium_pct)?;
        debug!("gas price {base_gas_price} marked up to {gas_price}");
        self.rpc
            .eth_send_transaction(&self.deployer, &self.governor, &data, gas_price)
            .await
    }

    async fn tx_confirmations(&self, tx_hash: &str) -> Result<Option<u64>, ProposeError> {
        let Some(mined_block) = self.rpc.eth_transaction_block(tx_hash).await? else {
            return Ok(None);
        };
        let latest = self.rpc.eth_block_number().await?;
        // The inclusion block itself counts as the first confirmation.
        Ok(Some(latest.saturating_sub(mined_block).saturating_add(1)))
    }
}

/// Mark the node's gas price up by a configured percentage, the way the
/// original operational tooling padded its transactions.
pub fn premium_gas_price(base: U256, premium_pct: u64) -> Result<U256, ProposeError> {
    100u64
        .checked_add(premium_pct)
        .and_then(|multiplier| base.checked_mul(U256::from(multiplier)))
        .map(|scaled| scaled / U256::from(100u64))
        .ok_or_else(|| ProposeError::Rpc("gas price markup overflowed".to_string()))
}

/// `proposalCount()` returns one uint256 word.
fn decode_count(returned: &[u8]) -> Result<u64, ProposeError> {
    if returned.len() != 32 {
        return Err(ProposeError::Rpc(format!(
            "proposalCount returned {} bytes, expected 32",
            returned.len()
        )));
    }
    let value = U256::from_be_slice(returned);
    u64::try_from(value)
        .map_err(|_| ProposeError::Rpc(format!("proposal count {value} does not fit in u64")))
}
