//! Contract descriptor: the address and ABI of the prediction market contract.

use ethers::{abi::Abi, contract::Contract, providers::Middleware, types::Address};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::sync::Arc;

/// The descriptor shipped with the crate.
const BUNDLED: &str = include_str!("../blockchain.json");

static BUNDLED_DESCRIPTOR: OnceCell<ContractDescriptor> = OnceCell::new();

#[derive(thiserror::Error, Debug)]
pub enum DescriptorError {
    #[error("malformed contract descriptor: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Pairs a deployed contract address with its interface description.
///
/// Accepts the `blockchain.json` layout (`pmContractAddress`, `pmContractABI`) as well as the
/// plain `address` / `abi` keys.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContractDescriptor {
    #[serde(rename = "pmContractAddress", alias = "address")]
    pub address: Address,
    #[serde(rename = "pmContractABI", alias = "abi")]
    pub abi: Abi,
}

impl ContractDescriptor {
    pub fn from_json(json: &str) -> Result<Self, DescriptorError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Returns the bundled descriptor, parsing it on first use.
    pub fn bundled() -> Result<&'static Self, DescriptorError> {
        BUNDLED_DESCRIPTOR.get_or_try_init(|| Self::from_json(BUNDLED))
    }

    /// Binds the contract to `client`, which sends calls on behalf of its default sender.
    pub fn bind<M: Middleware>(&self, client: Arc<M>) -> Contract<M> {
        Contract::new(self.address, self.abi.clone(), client)
    }
}
