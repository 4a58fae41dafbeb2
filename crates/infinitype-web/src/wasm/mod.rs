#![forbid(unsafe_code)]

//! `wasm-bindgen` exports: `boot` and the `WebBridge` handle.

mod ports;
mod storage;
mod subscription;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use infinitype_bridge::channel::CORPUS_CHANGED_PORT;
use infinitype_bridge::guard::{borrow_mut, contain_with};
use infinitype_bridge::{
    BridgeError, CompositionEvent, InboundMessage, InputBridge, KeyEvent, Modifiers,
    PendingBridge,
};
use js_sys::{Function, JSON, Object, Reflect};
use tracing::{debug, info};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, Event, KeyboardEvent};

use crate::convert::{corpus_index_from_f64, corpus_index_to_f64};
use crate::options::WebOptions;

use ports::{InboundSubscription, PortChannel};
use storage::LocalStorageBackend;
use subscription::Subscription;

type WebInputBridge = InputBridge<PortChannel, LocalStorageBackend>;

/// State shared by every listener.
struct Shared {
    bridge: RefCell<WebInputBridge>,
    /// `corpusChanged` that arrived while another handler held the bridge
    /// (a port `send` can synchronously run core subscriptions). Latest wins.
    deferred_corpus: Cell<Option<i64>>,
}

impl Shared {
    fn with_bridge<T>(
        &self,
        handler: &'static str,
        f: impl FnOnce(&mut WebInputBridge) -> infinitype_bridge::Result<T>,
    ) -> Option<T> {
        let out = contain_with(
            handler,
            || {
                let mut bridge = borrow_mut(&self.bridge, handler)?;
                f(&mut *bridge)
            },
            report_to_console,
        );
        self.flush_deferred_corpus();
        out
    }

    fn flush_deferred_corpus(&self) {
        let Some(index) = self.deferred_corpus.take() else {
            return;
        };
        debug!(index, "flushing deferred corpus change");
        contain_with(
            CORPUS_CHANGED_PORT,
            || {
                borrow_mut(&self.bridge, CORPUS_CHANGED_PORT)?
                    .handle_inbound(InboundMessage::CorpusChanged(index))
            },
            report_to_console,
        );
    }
}

pub(crate) fn describe_js(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{value:?}")
}

fn report_to_console(err: &BridgeError) {
    web_sys::console::warn_1(&JsValue::from_str(&format!("infinitype: {err}")));
}

fn bridge_error_to_js(err: BridgeError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

fn install_panic_hook() {
    use std::sync::Once;
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            web_sys::console::error_1(&JsValue::from_str(&format!("infinitype: {info}")));
        }));
    });
}

fn parse_options(options: &JsValue) -> Result<WebOptions, BridgeError> {
    if options.is_null() || options.is_undefined() {
        return Ok(WebOptions::default());
    }
    let json = JSON::stringify(options)
        .map_err(|err| BridgeError::port("options", describe_js(&err)))?;
    WebOptions::from_json(json.as_string().as_deref())
}

fn startup_flags_object(corpus: i64) -> Result<Object, JsValue> {
    let flags = Object::new();
    Reflect::set(
        &flags,
        &JsValue::from_str("corpus"),
        &JsValue::from_f64(corpus_index_to_f64(corpus)),
    )?;
    Ok(flags)
}

fn element_value(element: &Element) -> infinitype_bridge::Result<String> {
    let value = Reflect::get(element, &JsValue::from_str("value"))
        .map_err(|err| BridgeError::port("element", describe_js(&err)))?;
    Ok(value.as_string().unwrap_or_default())
}

fn key_event_from_dom(event: &KeyboardEvent) -> KeyEvent {
    let mods = Modifiers::from_flags(
        event.shift_key(),
        event.alt_key(),
        event.ctrl_key(),
        event.meta_key(),
    );
    KeyEvent::new(event.key(), mods).with_composing(event.is_composing())
}

fn keydown_handler(shared: Rc<Shared>) -> impl FnMut(Event) + 'static {
    move |event: Event| {
        let Some(keyboard) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        let key = key_event_from_dom(keyboard);
        shared.with_bridge("keydown", |bridge| {
            let classification = bridge.classify_keydown(&key);
            // Prevent before forwarding so a failing port still suppresses
            // the browser default.
            if classification.prevents_default() {
                event.prevent_default();
            }
            bridge.forward(&classification)
        });
    }
}

#[derive(Clone, Copy)]
enum CompositionPhase {
    Start,
    Update,
    End,
}

impl CompositionPhase {
    const fn event_type(self) -> &'static str {
        match self {
            Self::Start => "compositionstart",
            Self::Update => "compositionupdate",
            Self::End => "compositionend",
        }
    }
}

fn composition_handler(
    shared: Rc<Shared>,
    input: Element,
    phase: CompositionPhase,
) -> impl FnMut(Event) + 'static {
    move |event: Event| {
        shared.with_bridge(phase.event_type(), |bridge| {
            let (composition, value) = match phase {
                CompositionPhase::Start => (CompositionEvent::Start, String::new()),
                CompositionPhase::Update => {
                    let data = event
                        .dyn_ref::<web_sys::CompositionEvent>()
                        .and_then(web_sys::CompositionEvent::data)
                        .unwrap_or_default();
                    (CompositionEvent::Update(data.into()), String::new())
                }
                CompositionPhase::End => (CompositionEvent::End, element_value(&input)?),
            };
            bridge.handle_composition(&composition, &value)
        });
    }
}

fn corpus_changed_handler(shared: Rc<Shared>) -> impl FnMut(JsValue) + 'static {
    move |value: JsValue| {
        let index = contain_with(
            CORPUS_CHANGED_PORT,
            || {
                let n = value.as_f64().ok_or_else(|| {
                    BridgeError::port(CORPUS_CHANGED_PORT, "index must be a number")
                })?;
                corpus_index_from_f64(n)
            },
            report_to_console,
        );
        let Some(index) = index else {
            return;
        };

        if shared.bridge.try_borrow_mut().is_err() {
            debug!(index, "corpus change during dispatch; deferring");
            shared.deferred_corpus.set(Some(index));
            return;
        }
        shared.with_bridge(CORPUS_CHANGED_PORT, |bridge| {
            bridge.handle_inbound(InboundMessage::CorpusChanged(index))
        });
    }
}

/// Live bridge handle. Keep it for the lifetime of the page: dropping or
/// freeing it removes every listener.
#[wasm_bindgen]
pub struct WebBridge {
    shared: Rc<Shared>,
    listeners: Vec<Subscription>,
    corpus_changed: InboundSubscription,
    corpus: i64,
}

#[wasm_bindgen]
impl WebBridge {
    /// Corpus index the core was started with.
    #[wasm_bindgen(getter)]
    pub fn corpus(&self) -> f64 {
        corpus_index_to_f64(self.corpus)
    }

    /// Whether an IME composition session is open.
    #[wasm_bindgen(getter)]
    pub fn composing(&self) -> bool {
        self.shared
            .bridge
            .try_borrow()
            .is_ok_and(|bridge| bridge.is_composing())
    }

    /// Whether the DOM listeners are currently registered.
    #[wasm_bindgen(getter)]
    pub fn attached(&self) -> bool {
        self.listeners.iter().all(Subscription::is_attached)
    }

    /// Remove every listener and port subscription.
    pub fn detach(&mut self) {
        for listener in &mut self.listeners {
            listener.detach();
        }
        self.corpus_changed.cancel();
        info!("input bridge detached");
    }
}

/// Start the application core and wire the input bridge to it.
///
/// `init` receives the startup flags (`{ corpus }`) and must return the
/// application object exposing `ports`. See [`WebOptions`] for `options`.
#[wasm_bindgen]
pub fn boot(init: &Function, options: JsValue) -> Result<WebBridge, JsValue> {
    install_panic_hook();
    let options = parse_options(&options).map_err(bridge_error_to_js)?;

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("window has no document"))?;
    let input = document
        .get_element_by_id(&options.input_element_id)
        .ok_or_else(|| {
            bridge_error_to_js(BridgeError::MissingElement(options.input_element_id.clone()))
        })?;

    let pending = PendingBridge::new(options.bridge, LocalStorageBackend::from_window(&window));
    let corpus = pending.flags().corpus;
    let app = init.call1(&JsValue::NULL, &startup_flags_object(corpus)?)?;
    let ports = Reflect::get(&app, &JsValue::from_str("ports"))?;

    let channel = PortChannel::from_ports(&ports).map_err(bridge_error_to_js)?;
    let shared = Rc::new(Shared {
        bridge: RefCell::new(pending.connect(channel)),
        deferred_corpus: Cell::new(None),
    });
    let corpus_changed = InboundSubscription::subscribe(
        &ports,
        CORPUS_CHANGED_PORT,
        corpus_changed_handler(Rc::clone(&shared)),
    )
    .map_err(bridge_error_to_js)?;

    let mut listeners = vec![Subscription::new(
        document.as_ref(),
        "keydown",
        keydown_handler(Rc::clone(&shared)),
    )];
    for phase in [
        CompositionPhase::Start,
        CompositionPhase::Update,
        CompositionPhase::End,
    ] {
        listeners.push(Subscription::new(
            input.as_ref(),
            phase.event_type(),
            composition_handler(Rc::clone(&shared), input.clone(), phase),
        ));
    }
    for listener in &mut listeners {
        listener.attach()?;
    }

    info!(
        corpus,
        input = %options.input_element_id,
        "input bridge attached"
    );
    Ok(WebBridge {
        shared,
        listeners,
        corpus_changed,
        corpus,
    })
}
