//! The injected wallet capability and the identities obtained from it.

use crate::error::ConnectError;
use ethers::{
    providers::{JsonRpcClient, Middleware, Provider, ProviderError},
    types::{Address, Chain, U256},
};
use std::{fmt, sync::Arc};
use tracing::debug;

/// A wallet capability injected into the page, such as `window.ethereum`.
///
/// Presence is probed on every call to [`detect`](InjectedWallet::detect); implementations must
/// not cache a missing capability.
pub trait InjectedWallet {
    type Transport: JsonRpcClient + Clone + 'static;

    /// Returns a transport over the injected capability, or `None` if no wallet is present.
    fn detect(&self) -> Option<Self::Transport>;
}

/// An authorized account together with a client that sends on its behalf.
#[derive(Debug, Clone)]
pub struct Signer<T: JsonRpcClient> {
    address: Address,
    client: Arc<Provider<T>>,
}

impl<T: JsonRpcClient> Signer<T> {
    pub fn address(&self) -> Address {
        self.address
    }

    /// The checksummed hex form of the address.
    pub fn address_string(&self) -> String {
        ethers::utils::to_checksum(&self.address, None)
    }

    /// The provider client whose default sender is this account.
    pub fn client(&self) -> Arc<Provider<T>> {
        Arc::clone(&self.client)
    }
}

/// Asks the wallet for an account, prompting the user if the page is not yet authorized.
pub async fn request_signer<T>(provider: &Provider<T>) -> Result<Signer<T>, ConnectError>
where
    T: JsonRpcClient + Clone,
{
    let accounts: Vec<Address> = provider.request("eth_requestAccounts", ()).await?;
    debug!(count = accounts.len(), "wallet returned accounts");
    let address = accounts.first().copied().ok_or(ConnectError::NoAccounts)?;
    Ok(Signer { address, client: Arc::new(provider.clone().with_sender(address)) })
}

/// The chain the wallet is connected to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    pub chain_id: u64,
    pub name: String,
}

impl Network {
    pub fn from_chain_id(chain_id: u64) -> Self {
        let name = Chain::try_from(chain_id)
            .map(|chain| chain.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        Self { chain_id, name }
    }

    pub fn chain(&self) -> Option<Chain> {
        Chain::try_from(self.chain_id).ok()
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.chain_id)
    }
}

pub async fn query_network<T: JsonRpcClient>(provider: &Provider<T>) -> Result<Network, ConnectError> {
    let chain_id = provider.get_chainid().await?;
    if chain_id > U256::from(u64::MAX) {
        return Err(ProviderError::CustomError(format!("chain id {chain_id} does not fit in u64")).into())
    }
    Ok(Network::from_chain_id(chain_id.as_u64()))
}
