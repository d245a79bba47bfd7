use ethers::providers::{ProviderError, RpcError};

/// EIP-1193 error code sent by the wallet when the user rejects a request.
pub const USER_REJECTED_REQUEST: i64 = 4001;

/// Error State message shown when no wallet extension is injected.
pub const NOT_INSTALLED_MESSAGE: &str = "Metamask is not installed.";

#[derive(thiserror::Error, Debug)]
pub enum ConnectError {
    #[error("{}", NOT_INSTALLED_MESSAGE)]
    NotInstalled,
    #[error("user rejected the request: {0}")]
    Rejected(String),
    #[error("wallet returned no accounts")]
    NoAccounts,
    #[error(transparent)]
    Provider(ProviderError),
}

impl ConnectError {
    /// The message written to the Error State for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            ConnectError::NotInstalled => NOT_INSTALLED_MESSAGE,
            ConnectError::Rejected(_) => "Wallet connection was rejected.",
            ConnectError::NoAccounts | ConnectError::Provider(_) => "Failed to connect wallet.",
        }
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, ConnectError::Rejected(_))
    }
}

impl From<ProviderError> for ConnectError {
    fn from(err: ProviderError) -> Self {
        let rejected = err
            .as_error_response()
            .filter(|rpc| rpc.code == USER_REJECTED_REQUEST)
            .map(|rpc| rpc.message.clone());
        match rejected {
            Some(message) => ConnectError::Rejected(message),
            None => ConnectError::Provider(err),
        }
    }
}
