#![forbid(unsafe_code)]

//! Message protocol between the bridge and the application core.
//!
//! Three outbound shapes and one inbound shape, each bound to a named port.
//! What the core does with a message is its own business; the bridge's
//! obligation ends at delivery.

use std::fmt;

use crate::error::Result;

pub const COMMAND_PORT: &str = "command";
pub const COMPOSING_INPUT_PORT: &str = "composingInput";
pub const ON_CHANGE_PORT: &str = "onChange";
pub const CORPUS_CHANGED_PORT: &str = "corpusChanged";

/// Bridge to core.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OutboundMessage {
    /// A classified key intent, e.g. `"p"` or `"Tab"`.
    Command(Box<str>),
    /// Composition session boundary.
    ComposingInput(bool),
    /// Final element value after a composition session closes.
    OnChange(Box<str>),
}

impl OutboundMessage {
    #[must_use]
    pub const fn port(&self) -> &'static str {
        match self {
            Self::Command(_) => COMMAND_PORT,
            Self::ComposingInput(_) => COMPOSING_INPUT_PORT,
            Self::OnChange(_) => ON_CHANGE_PORT,
        }
    }
}

impl fmt::Display for OutboundMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command(key) => write!(f, "{COMMAND_PORT}({key:?})"),
            Self::ComposingInput(active) => write!(f, "{COMPOSING_INPUT_PORT}({active})"),
            Self::OnChange(text) => write!(f, "{ON_CHANGE_PORT}({text:?})"),
        }
    }
}

/// Core to bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InboundMessage {
    /// The user picked a different corpus.
    CorpusChanged(i64),
}

impl InboundMessage {
    #[must_use]
    pub const fn port(&self) -> &'static str {
        match self {
            Self::CorpusChanged(_) => CORPUS_CHANGED_PORT,
        }
    }
}

/// Outbound half of the port boundary.
pub trait MessageChannel {
    fn send(&mut self, message: OutboundMessage) -> Result<()>;
}

impl<C: MessageChannel + ?Sized> MessageChannel for Box<C> {
    fn send(&mut self, message: OutboundMessage) -> Result<()> {
        (**self).send(message)
    }
}

/// Records every message in delivery order.
#[derive(Debug, Default, Clone)]
pub struct MemoryChannel {
    sent: Vec<OutboundMessage>,
}

impl MemoryChannel {
    #[must_use]
    pub fn sent(&self) -> &[OutboundMessage] {
        &self.sent
    }

    pub fn drain(&mut self) -> impl Iterator<Item = OutboundMessage> + '_ {
        self.sent.drain(..)
    }
}

impl MessageChannel for MemoryChannel {
    fn send(&mut self, message: OutboundMessage) -> Result<()> {
        self.sent.push(message);
        Ok(())
    }
}
