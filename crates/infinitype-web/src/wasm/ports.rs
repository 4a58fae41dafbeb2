#![forbid(unsafe_code)]

//! The application core's message ports.
//!
//! Ports follow the Elm convention: `app.ports.<name>` is an object with
//! `send(value)` for inbound-to-core ports and `subscribe(fn)` /
//! `unsubscribe(fn)` for ports the core writes to.

use infinitype_bridge::channel::{COMMAND_PORT, COMPOSING_INPUT_PORT, ON_CHANGE_PORT};
use infinitype_bridge::{BridgeError, MessageChannel, OutboundMessage, Result};
use js_sys::{Function, Reflect};
use tracing::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::describe_js;

#[derive(Debug, Clone)]
struct Port {
    name: &'static str,
    object: JsValue,
}

impl Port {
    fn lookup(ports: &JsValue, name: &'static str) -> Result<Self> {
        let object = Reflect::get(ports, &JsValue::from_str(name))
            .map_err(|err| BridgeError::port(name, describe_js(&err)))?;
        if object.is_null() || object.is_undefined() {
            return Err(BridgeError::port(name, "not exposed by the application"));
        }
        Ok(Self { name, object })
    }

    fn method(&self, method: &str) -> Result<Function> {
        Reflect::get(&self.object, &JsValue::from_str(method))
            .map_err(|err| BridgeError::port(self.name, describe_js(&err)))?
            .dyn_into::<Function>()
            .map_err(|_| BridgeError::port(self.name, format!("{method} is not a function")))
    }

    fn call(&self, method: &str, arg: &JsValue) -> Result<()> {
        self.method(method)?
            .call1(&self.object, arg)
            .map(drop)
            .map_err(|err| BridgeError::port(self.name, describe_js(&err)))
    }
}

/// Outbound ports, resolved once at boot.
#[derive(Debug, Clone)]
pub struct PortChannel {
    command: Port,
    composing_input: Port,
    on_change: Port,
}

impl PortChannel {
    pub fn from_ports(ports: &JsValue) -> Result<Self> {
        let channel = Self {
            command: Port::lookup(ports, COMMAND_PORT)?,
            composing_input: Port::lookup(ports, COMPOSING_INPUT_PORT)?,
            on_change: Port::lookup(ports, ON_CHANGE_PORT)?,
        };
        // Fail at boot rather than on the first keystroke.
        for port in [&channel.command, &channel.composing_input, &channel.on_change] {
            port.method("send")?;
        }
        Ok(channel)
    }
}

impl MessageChannel for PortChannel {
    fn send(&mut self, message: OutboundMessage) -> Result<()> {
        match message {
            OutboundMessage::Command(key) => self.command.call("send", &JsValue::from_str(&key)),
            OutboundMessage::ComposingInput(active) => self
                .composing_input
                .call("send", &JsValue::from_bool(active)),
            OutboundMessage::OnChange(text) => {
                self.on_change.call("send", &JsValue::from_str(&text))
            }
        }
    }
}

/// A callback registered on a core-to-bridge port.
pub struct InboundSubscription {
    port: Port,
    callback: Closure<dyn FnMut(JsValue)>,
    active: bool,
}

impl InboundSubscription {
    pub fn subscribe(
        ports: &JsValue,
        name: &'static str,
        handler: impl FnMut(JsValue) + 'static,
    ) -> Result<Self> {
        let port = Port::lookup(ports, name)?;
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(JsValue)>);
        port.call("subscribe", callback.as_ref())?;
        Ok(Self {
            port,
            callback,
            active: true,
        })
    }

    /// Stop receiving messages. Ports without `unsubscribe` keep the
    /// callback alive, so it stays owned here either way.
    pub fn cancel(&mut self) {
        if !self.active {
            return;
        }
        if let Err(err) = self.port.call("unsubscribe", self.callback.as_ref()) {
            debug!(port = self.port.name, error = %err, "unsubscribe failed; keeping callback alive");
        }
        self.active = false;
    }
}

impl Drop for InboundSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
