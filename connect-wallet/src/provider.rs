use crate::wallet::InjectedWallet;
use async_trait::async_trait;
use ethers::providers::{
    JsonRpcClient, JsonRpcError, ProviderError as EthersProviderError, RpcError,
};
use js_sys::{Function, Promise, Reflect};
use serde::{
    de::{DeserializeOwned, Error},
    Serialize,
};
use std::fmt::Debug;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::Window;

#[derive(thiserror::Error, Debug)]
pub enum EIP1193Error {
    #[error("rpc error: {0}")]
    RPC(JsonRpcError),
    #[error("deserialize error: {0}")]
    Deserialize(serde_json::Error),
    #[error("JS value error: {0}")]
    JsValueError(String),
}

impl From<JsValue> for EIP1193Error {
    /// Wallet errors are objects carrying a numeric `code`; anything else is kept as text.
    fn from(js: JsValue) -> Self {
        let field = |name: &str| Reflect::get(&js, &JsValue::from(name)).ok();
        match field("code").and_then(|code| code.as_f64()) {
            Some(code) => Self::RPC(JsonRpcError {
                code: code as i64,
                message: field("message").and_then(|m| m.as_string()).unwrap_or_default(),
                data: None,
            }),
            None => Self::JsValueError(format!("{:?}", js)),
        }
    }
}

impl From<EIP1193Error> for EthersProviderError {
    fn from(err: EIP1193Error) -> Self {
        match err {
            EIP1193Error::Deserialize(err) => EthersProviderError::SerdeJson(err),
            err => EthersProviderError::JsonRpcClientError(Box::new(err)),
        }
    }
}

impl RpcError for EIP1193Error {
    fn as_error_response(&self) -> Option<&JsonRpcError> {
        if let EIP1193Error::RPC(err) = self {
            Some(err)
        } else {
            None
        }
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        if let EIP1193Error::Deserialize(err) = self {
            Some(err)
        } else {
            None
        }
    }
}

/// JSON-RPC transport over the `window.ethereum` object.
#[derive(Debug, PartialEq, Clone)]
pub struct EIP1193 {
    this: JsValue,
    request: Function,
}

// TODO: Implement a threadsafe solution
// for now, we will just use single thread in WASM context
unsafe impl Send for EIP1193 {}
unsafe impl Sync for EIP1193 {}

impl EIP1193 {
    pub fn new(win: &Window) -> Result<Self, EIP1193Error> {
        let provider =
            win.get("ethereum").ok_or(EIP1193Error::JsValueError("missing provider".to_owned()))?;
        let request = Reflect::get(&provider, &JsValue::from("request"))?;
        if !request.is_function() {
            return Err(EIP1193Error::JsValueError("provider has no request method".to_owned()))
        }
        Ok(Self { request: request.into(), this: provider.into() })
    }
}

#[derive(Serialize, Debug)]
struct RequestMethod<T: Serialize + Debug> {
    pub method: String,
    pub params: Option<T>,
}

fn parse_js<T: for<'de> serde::Deserialize<'de>>(data: JsValue) -> Result<T, EIP1193Error> {
    serde_wasm_bindgen::from_value(data).map_err(|err| {
        EIP1193Error::Deserialize(serde_json::Error::custom(&format!(
            "failed to parse js value: {:?}",
            err
        )))
    })
}

fn to_deserialize_error(err: impl Error) -> EIP1193Error {
    EIP1193Error::Deserialize(serde_json::Error::custom(err.to_string()))
}

#[async_trait(?Send)]
impl JsonRpcClient for EIP1193 {
    type Error = EIP1193Error;

    async fn request<T, R>(&self, method: &str, params: T) -> Result<R, Self::Error>
    where
        T: Debug + Serialize + Send + Sync,
        R: DeserializeOwned + Send,
    {
        tracing::trace!(method, ?params, "eip-1193 request");
        let arg = RequestMethod { method: method.to_string(), params: Some(params) };
        let promise = self.request.call1(
            &self.this,
            &serde_wasm_bindgen::to_value(&arg).map_err(to_deserialize_error)?,
        )?;
        let parsed = parse_js(JsFuture::from(Promise::from(promise)).await?)?;
        Ok(parsed)
    }
}

/// The wallet injected into the current browser window.
#[derive(Debug, Clone)]
pub struct BrowserWallet {
    window: Option<Window>,
}

impl BrowserWallet {
    pub fn current() -> Self {
        Self { window: web_sys::window() }
    }
}

impl InjectedWallet for BrowserWallet {
    type Transport = EIP1193;

    fn detect(&self) -> Option<EIP1193> {
        let window = self.window.as_ref()?;
        match EIP1193::new(window) {
            Ok(transport) => Some(transport),
            Err(err) => {
                tracing::debug!(%err, "no usable window.ethereum");
                None
            }
        }
    }
}
