//! The "Connect Wallet" button rendered into the page.

use crate::{
    connect::{ConnectState, ConnectWallet, CONNECT_LABEL},
    descriptor::ContractDescriptor,
    provider::{BrowserWallet, EIP1193},
};
use futures::lock::Mutex;
use js_sys::Promise;
use std::{cell::RefCell, rc::Rc};
use tracing::warn;
use wasm_bindgen::{prelude::*, JsCast};
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use web_sys::{Element, HtmlButtonElement, HtmlElement};

type Component = Rc<Mutex<ConnectWallet<EIP1193>>>;

/// What the last finished connect left behind, readable while another connect holds the lock.
#[derive(Debug, Clone, Default)]
struct Snapshot {
    error: Option<String>,
    address: Option<String>,
    chain_id: Option<u64>,
}

impl Snapshot {
    fn of(component: &ConnectWallet<EIP1193>) -> Self {
        let connection = component.connection();
        Self {
            error: component.error().map(str::to_owned),
            address: connection.map(|connection| connection.signer.address_string()),
            chain_id: connection.map(|connection| connection.network.chain_id),
        }
    }
}

#[derive(Clone)]
struct View {
    button: HtmlButtonElement,
    message: HtmlElement,
}

impl View {
    fn render(&self, component: &ConnectWallet<EIP1193>) {
        self.button.set_disabled(component.state() == ConnectState::Connecting);
        match component.error() {
            Some(text) => {
                self.message.set_text_content(Some(text));
                self.message.set_hidden(false);
            }
            None => {
                self.message.set_text_content(None);
                self.message.set_hidden(true);
            }
        }
    }
}

async fn run_connect(
    component: Component,
    snapshot: Rc<RefCell<Snapshot>>,
    view: Option<View>,
) -> Result<String, JsValue> {
    if let Some(view) = &view {
        view.button.set_disabled(true);
    }
    let mut component = component.lock().await;
    let result = component
        .connect(&BrowserWallet::current())
        .await
        .map(|connection| connection.signer.address_string())
        .map_err(|err| JsValue::from_str(&err.to_string()));
    *snapshot.borrow_mut() = Snapshot::of(&component);
    if let Some(view) = &view {
        view.render(&component);
    }
    result
}

#[wasm_bindgen]
pub struct ConnectWalletButton {
    component: Component,
    snapshot: Rc<RefCell<Snapshot>>,
    view: Rc<RefCell<Option<View>>>,
}

#[wasm_bindgen]
impl ConnectWalletButton {
    /// Creates the component bound to the bundled contract descriptor.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<ConnectWalletButton, JsValue> {
        let descriptor = ContractDescriptor::bundled()
            .map_err(|err| JsValue::from_str(&err.to_string()))?
            .clone();
        Ok(Self {
            component: Rc::new(Mutex::new(ConnectWallet::new(descriptor))),
            snapshot: Rc::new(RefCell::new(Snapshot::default())),
            view: Rc::new(RefCell::new(None)),
        })
    }

    #[wasm_bindgen(getter)]
    pub fn label(&self) -> String {
        CONNECT_LABEL.to_string()
    }

    /// Renders the button and its error line as the last child of `parent`.
    pub fn mount(&self, parent: &Element) -> Result<(), JsValue> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let root = document.create_element("div")?;
        root.set_class_name("ConnectWallet");
        let button: HtmlButtonElement = document.create_element("button")?.dyn_into()?;
        button.set_text_content(Some(CONNECT_LABEL));
        let message: HtmlElement = document.create_element("p")?.dyn_into()?;
        message.set_class_name("ConnectWallet-error");
        message.set_hidden(true);
        root.append_child(&button)?;
        root.append_child(&message)?;
        parent.append_child(&root)?;

        let view = View { button, message };
        let component = Rc::clone(&self.component);
        let snapshot = Rc::clone(&self.snapshot);
        let click_view = view.clone();
        let on_click = Closure::<dyn FnMut()>::new(move || {
            let component = Rc::clone(&component);
            let snapshot = Rc::clone(&snapshot);
            let view = click_view.clone();
            spawn_local(async move {
                if let Err(err) = run_connect(component, snapshot, Some(view)).await {
                    warn!(?err, "connect from button failed");
                }
            });
        });
        view.button.set_onclick(Some(on_click.as_ref().unchecked_ref()));
        // the handler lives as long as the button
        on_click.forget();

        *self.view.borrow_mut() = Some(view);
        Ok(())
    }

    /// Runs the connect action; resolves to the signer address or rejects with the failure.
    pub fn connect(&self) -> Promise {
        let component = Rc::clone(&self.component);
        let snapshot = Rc::clone(&self.snapshot);
        let view = self.view.borrow().clone();
        future_to_promise(async move {
            run_connect(component, snapshot, view).await.map(JsValue::from)
        })
    }

    /// The Error State left by the last finished connect.
    #[wasm_bindgen(getter)]
    pub fn error(&self) -> Option<String> {
        self.snapshot.borrow().error.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn address(&self) -> Option<String> {
        self.snapshot.borrow().address.clone()
    }

    #[wasm_bindgen(getter, js_name = chainId)]
    pub fn chain_id(&self) -> Option<u64> {
        self.snapshot.borrow().chain_id
    }
}
