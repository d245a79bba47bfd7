//! The wallet connect action and the component state it drives.

use crate::{
    descriptor::ContractDescriptor,
    error::ConnectError,
    wallet::{query_network, request_signer, InjectedWallet, Network, Signer},
};
use ethers::{
    contract::Contract,
    providers::{JsonRpcClient, Provider},
};
use tracing::{debug, info, warn};

/// Label of the button that triggers [`ConnectWallet::connect`].
pub const CONNECT_LABEL: &str = "Connect Wallet";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectState {
    #[default]
    Idle,
    Connecting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Write failures other than a missing wallet to the Error State and clear it on success.
    /// When unset, only a missing wallet writes the Error State.
    pub surface_failures: bool,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self { surface_failures: true }
    }
}

/// Everything obtained by a successful connect.
pub struct Connection<T: JsonRpcClient> {
    pub signer: Signer<T>,
    pub contract: Contract<Provider<T>>,
    pub network: Network,
}

impl<T: JsonRpcClient> Connection<T> {
    /// Short `0x1234...abcd` form of the signer address.
    pub fn display_address(&self) -> String {
        let address = self.signer.address_string();
        format!("{}...{}", &address[..6], &address[address.len() - 4..])
    }
}

/// Connect-wallet component: owns the Error State and the last successful [`Connection`].
pub struct ConnectWallet<T: JsonRpcClient> {
    descriptor: ContractDescriptor,
    options: ConnectOptions,
    state: ConnectState,
    error: Option<String>,
    connection: Option<Connection<T>>,
}

impl<T> ConnectWallet<T>
where
    T: JsonRpcClient + Clone + 'static,
{
    pub fn new(descriptor: ContractDescriptor) -> Self {
        Self::with_options(descriptor, ConnectOptions::default())
    }

    pub fn with_options(descriptor: ContractDescriptor, options: ConnectOptions) -> Self {
        Self { descriptor, options, state: ConnectState::Idle, error: None, connection: None }
    }

    pub fn descriptor(&self) -> &ContractDescriptor {
        &self.descriptor
    }

    pub fn state(&self) -> ConnectState {
        self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn connection(&self) -> Option<&Connection<T>> {
        self.connection.as_ref()
    }

    /// Detects the wallet, requests a signer, binds the contract and reads the network.
    ///
    /// Any previous connection is dropped first. A missing wallet always sets the Error State.
    /// With [`ConnectOptions::surface_failures`] enabled, other failures set it too and a
    /// success clears it; otherwise neither touches it.
    pub async fn connect<W>(&mut self, wallet: &W) -> Result<&Connection<T>, ConnectError>
    where
        W: InjectedWallet<Transport = T>,
    {
        self.state = ConnectState::Connecting;
        self.connection = None;

        let outcome = self.establish(wallet).await;
        self.state = ConnectState::Idle;

        match outcome {
            Ok(connection) => {
                info!(
                    address = %connection.signer.address_string(),
                    network = %connection.network,
                    "wallet connected"
                );
                if self.options.surface_failures {
                    self.error = None;
                }
                Ok(&*self.connection.insert(connection))
            }
            Err(err) => {
                self.record_failure(&err);
                Err(err)
            }
        }
    }

    async fn establish<W>(&self, wallet: &W) -> Result<Connection<T>, ConnectError>
    where
        W: InjectedWallet<Transport = T>,
    {
        let transport = wallet.detect().ok_or(ConnectError::NotInstalled)?;
        let provider = Provider::new(transport);

        let signer = request_signer(&provider).await?;
        debug!(address = ?signer.address(), "obtained signer");

        let contract = self.descriptor.bind(signer.client());
        debug!(contract = ?contract.address(), "bound contract");

        let network = query_network(&provider).await?;
        Ok(Connection { signer, contract, network })
    }

    fn record_failure(&mut self, err: &ConnectError) {
        match err {
            ConnectError::NotInstalled => {
                warn!("no injected wallet found");
                self.error = Some(err.user_message().to_string());
            }
            _ if self.options.surface_failures => {
                warn!(%err, "wallet connection failed");
                self.error = Some(err.user_message().to_string());
            }
            _ => debug!(%err, "wallet connection failed, error state left unchanged"),
        }
    }
}
