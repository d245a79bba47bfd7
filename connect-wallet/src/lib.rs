//! Connects a browser wallet extension and binds the prediction market contract.
//!
//! The connect flow lives in [`ConnectWallet`] and runs against any [`InjectedWallet`]; in the
//! browser that is [`provider::BrowserWallet`], an EIP-1193 transport over `window.ethereum`,
//! and [`ui::ConnectWalletButton`] renders the button for it.

pub mod connect;
pub mod descriptor;
pub mod error;
pub mod utils;
pub mod wallet;

#[cfg(target_arch = "wasm32")]
pub mod provider;
#[cfg(target_arch = "wasm32")]
pub mod ui;

pub use connect::{ConnectOptions, ConnectState, ConnectWallet, Connection, CONNECT_LABEL};
pub use descriptor::{ContractDescriptor, DescriptorError};
pub use error::{ConnectError, NOT_INSTALLED_MESSAGE};
pub use wallet::{InjectedWallet, Network, Signer};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    utils::set_panic_hook();
    utils::init_logging();
    tracing::debug!("connect-wallet module loaded");
}
