#![cfg(not(target_arch = "wasm32"))]

use connect_wallet::{
    ConnectError, ConnectOptions, ConnectState, ConnectWallet, ContractDescriptor, InjectedWallet,
    NOT_INSTALLED_MESSAGE,
};
use ethers::{
    providers::{JsonRpcError, Middleware, MockProvider, MockResponse},
    types::{Address, U256},
};
use std::{
    cell::{Cell, RefCell},
    sync::Arc,
};

/// A wallet whose presence can be toggled between attempts.
#[derive(Default)]
struct TestWallet {
    transport: RefCell<Option<MockProvider>>,
    probes: Cell<usize>,
}

impl TestWallet {
    fn missing() -> Self {
        Self::default()
    }

    fn installed(mock: &MockProvider) -> Self {
        let wallet = Self::default();
        wallet.install(mock);
        wallet
    }

    fn install(&self, mock: &MockProvider) {
        *self.transport.borrow_mut() = Some(mock.clone());
    }
}

impl InjectedWallet for TestWallet {
    type Transport = MockProvider;

    fn detect(&self) -> Option<MockProvider> {
        self.probes.set(self.probes.get() + 1);
        self.transport.borrow().clone()
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn descriptor() -> ContractDescriptor {
    ContractDescriptor::bundled().unwrap().clone()
}

fn account(n: u64) -> Address {
    Address::from_low_u64_be(n)
}

/// Queues the answers of one successful connect. Responses are served last-in first-out.
fn approve(mock: &MockProvider, accounts: Vec<Address>, chain_id: u64) {
    mock.push::<U256, _>(U256::from(chain_id)).unwrap();
    mock.push::<Vec<Address>, _>(accounts).unwrap();
}

fn reject(mock: &MockProvider) {
    mock.push_response(MockResponse::Error(JsonRpcError {
        code: 4001,
        message: "User rejected the request.".to_string(),
        data: None,
    }));
}

#[tokio::test]
async fn missing_wallet_sets_error_state() {
    init_tracing();
    let wallet = TestWallet::missing();
    let mut component = ConnectWallet::new(descriptor());

    let err = component.connect(&wallet).await.err().unwrap();

    assert!(matches!(err, ConnectError::NotInstalled));
    assert_eq!(component.error(), Some(NOT_INSTALLED_MESSAGE));
    assert!(component.connection().is_none());
    assert_eq!(component.state(), ConnectState::Idle);
}

#[tokio::test]
async fn missing_wallet_is_reported_even_when_failures_are_suppressed() {
    let wallet = TestWallet::missing();
    let options = ConnectOptions { surface_failures: false };
    let mut component = ConnectWallet::with_options(descriptor(), options);

    assert!(component.connect(&wallet).await.is_err());
    assert_eq!(component.error(), Some("Metamask is not installed."));
}

#[tokio::test]
async fn connects_when_every_step_succeeds() {
    init_tracing();
    let mock = MockProvider::new();
    approve(&mock, vec![account(7), account(8)], 1);
    let wallet = TestWallet::installed(&mock);
    let mut component = ConnectWallet::new(descriptor());

    let connection = component.connect(&wallet).await.unwrap();
    assert_eq!(connection.signer.address(), account(7));
    assert_eq!(connection.network.chain_id, 1);
    assert_eq!(connection.network.name, "mainnet");

    assert_eq!(component.error(), None);
    assert_eq!(component.state(), ConnectState::Idle);
    mock.assert_request("eth_requestAccounts", ()).unwrap();
    mock.assert_request("eth_chainId", ()).unwrap();
}

#[tokio::test]
async fn contract_uses_descriptor_and_signer_of_the_invocation() {
    let mock = MockProvider::new();
    approve(&mock, vec![account(42)], 31337);
    let wallet = TestWallet::installed(&mock);
    let descriptor = descriptor();
    let mut component = ConnectWallet::new(descriptor.clone());

    let connection = component.connect(&wallet).await.unwrap();

    assert_eq!(connection.contract.address(), descriptor.address);
    assert_eq!(connection.contract.abi(), &descriptor.abi);
    assert!(Arc::ptr_eq(&connection.contract.client(), &connection.signer.client()));
    assert_eq!(connection.contract.client().default_sender(), Some(account(42)));
}

#[tokio::test]
async fn reconnecting_does_not_reuse_the_previous_signer() {
    let mock = MockProvider::new();
    let wallet = TestWallet::installed(&mock);
    let mut component = ConnectWallet::new(descriptor());

    approve(&mock, vec![account(1)], 1);
    component.connect(&wallet).await.unwrap();

    approve(&mock, vec![account(2)], 5);
    let connection = component.connect(&wallet).await.unwrap();
    assert_eq!(connection.signer.address(), account(2));
    assert_eq!(connection.contract.client().default_sender(), Some(account(2)));
    assert_eq!(connection.network.chain_id, 5);
}

#[tokio::test]
async fn rejection_is_surfaced_by_default() {
    let mock = MockProvider::new();
    reject(&mock);
    let wallet = TestWallet::installed(&mock);
    let mut component = ConnectWallet::new(descriptor());

    let err = component.connect(&wallet).await.err().unwrap();

    assert!(err.is_rejection());
    assert_eq!(component.error(), Some("Wallet connection was rejected."));
    assert!(component.connection().is_none());
    // no network query after a failed signer request
    mock.assert_request("eth_requestAccounts", ()).unwrap();
    assert!(mock.assert_request("eth_chainId", ()).is_err());
}

#[tokio::test]
async fn rejection_leaves_error_state_untouched_when_suppressed() {
    let mock = MockProvider::new();
    reject(&mock);
    let wallet = TestWallet::installed(&mock);
    let options = ConnectOptions { surface_failures: false };
    let mut component = ConnectWallet::with_options(descriptor(), options);

    let err = component.connect(&wallet).await.err().unwrap();

    assert!(err.is_rejection());
    assert_eq!(component.error(), None);
    assert_eq!(component.state(), ConnectState::Idle);
}

#[tokio::test]
async fn empty_account_list_is_a_failure() {
    let mock = MockProvider::new();
    mock.push::<Vec<Address>, _>(Vec::new()).unwrap();
    let wallet = TestWallet::installed(&mock);
    let mut component = ConnectWallet::new(descriptor());

    let err = component.connect(&wallet).await.err().unwrap();

    assert!(matches!(err, ConnectError::NoAccounts));
    assert_eq!(component.error(), Some("Failed to connect wallet."));
}

#[tokio::test]
async fn network_failure_discards_the_connection() {
    let mock = MockProvider::new();
    mock.push_response(MockResponse::Error(JsonRpcError {
        code: -32603,
        message: "Internal JSON-RPC error.".to_string(),
        data: None,
    }));
    mock.push::<Vec<Address>, _>(vec![account(3)]).unwrap();
    let wallet = TestWallet::installed(&mock);
    let mut component = ConnectWallet::new(descriptor());

    let err = component.connect(&wallet).await.err().unwrap();

    assert!(matches!(err, ConnectError::Provider(_)));
    assert!(component.connection().is_none());
}

#[tokio::test]
async fn retry_after_missing_wallet_probes_again() {
    let wallet = TestWallet::missing();
    let mut component = ConnectWallet::new(descriptor());
    assert!(component.connect(&wallet).await.is_err());
    assert_eq!(wallet.probes.get(), 1);

    let mock = MockProvider::new();
    approve(&mock, vec![account(9)], 1);
    wallet.install(&mock);

    let connection = component.connect(&wallet).await.unwrap();
    assert_eq!(connection.signer.address(), account(9));
    assert_eq!(wallet.probes.get(), 2);
    assert_eq!(component.error(), None);
}

#[tokio::test]
async fn display_address_is_shortened() {
    let mock = MockProvider::new();
    let address: Address = "0x5FbDB2315678afecb367f032d93F642f64180aa3".parse().unwrap();
    approve(&mock, vec![address], 1);
    let wallet = TestWallet::installed(&mock);
    let mut component = ConnectWallet::new(descriptor());

    let connection = component.connect(&wallet).await.unwrap();
    assert_eq!(connection.signer.address_string(), "0x5FbDB2315678afecb367f032d93F642f64180aa3");
    assert_eq!(connection.display_address(), "0x5FbD...0aa3");
}

#[tokio::test]
async fn success_keeps_error_state_when_failures_are_suppressed() {
    let wallet = TestWallet::missing();
    let options = ConnectOptions { surface_failures: false };
    let mut component = ConnectWallet::with_options(descriptor(), options);
    assert!(component.connect(&wallet).await.is_err());
    assert_eq!(component.error(), Some(NOT_INSTALLED_MESSAGE));

    let mock = MockProvider::new();
    approve(&mock, vec![account(4)], 1);
    wallet.install(&mock);

    let connection = component.connect(&wallet).await.unwrap();
    assert_eq!(connection.signer.address(), account(4));
    assert_eq!(component.error(), Some(NOT_INSTALLED_MESSAGE));
}

#[tokio::test]
async fn chain_id_wider_than_u64_is_rejected() {
    let mock = MockProvider::new();
    mock.push::<U256, _>(U256::from(u64::MAX) + 1).unwrap();
    mock.push::<Vec<Address>, _>(vec![account(5)]).unwrap();
    let wallet = TestWallet::installed(&mock);
    let mut component = ConnectWallet::new(descriptor());

    let err = component.connect(&wallet).await.err().unwrap();

    assert!(matches!(err, ConnectError::Provider(_)));
    assert!(err.to_string().contains("does not fit in u64"));
    assert_eq!(component.error(), Some("Failed to connect wallet."));
    assert!(component.connection().is_none());
}

#[tokio::test]
async fn largest_u64_chain_id_is_kept_whole() {
    let mock = MockProvider::new();
    approve(&mock, vec![account(6)], u64::MAX);
    let wallet = TestWallet::installed(&mock);
    let mut component = ConnectWallet::new(descriptor());

    let connection = component.connect(&wallet).await.unwrap();
    assert_eq!(connection.network.chain_id, u64::MAX);
    assert_eq!(connection.network.name, "unknown");
}
