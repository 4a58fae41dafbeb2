#![forbid(unsafe_code)]

//! Composition root.
//!
//! [`PendingBridge`] exists before the core does: it reads the persisted
//! corpus once and exposes it as [`StartupFlags`]. Once the core is running
//! and its ports are reachable, [`PendingBridge::connect`] produces the live
//! [`InputBridge`].

use serde::Serialize;
use tracing::{debug, trace};

use crate::channel::{InboundMessage, MessageChannel, OutboundMessage};
use crate::composition::{CompositionEvent, CompositionTracker};
use crate::config::BridgeConfig;
use crate::error::Result;
use crate::keys::{Classification, KeyClassifier, KeyEvent};
use crate::persistence::{PersistenceAdapter, StorageBackend};

/// Startup configuration handed to the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StartupFlags {
    pub corpus: i64,
}

impl StartupFlags {
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// What the host must do with the DOM event after the bridge handled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyOutcome {
    pub prevent_default: bool,
}

#[derive(Debug)]
pub struct PendingBridge<S> {
    classifier: KeyClassifier,
    persistence: PersistenceAdapter<S>,
    flags: StartupFlags,
}

impl<S: StorageBackend> PendingBridge<S> {
    /// Build components and perform the single startup `load()`.
    pub fn new(config: BridgeConfig, storage: S) -> Self {
        let config = config.normalized();
        let persistence = PersistenceAdapter::new(storage, &config);
        let flags = StartupFlags {
            corpus: persistence.load(),
        };
        debug!(corpus = flags.corpus, "bridge startup flags ready");
        Self {
            classifier: KeyClassifier::new(&config),
            persistence,
            flags,
        }
    }

    #[must_use]
    pub const fn flags(&self) -> StartupFlags {
        self.flags
    }

    pub fn connect<C: MessageChannel>(self, channel: C) -> InputBridge<C, S> {
        InputBridge {
            classifier: self.classifier,
            composition: CompositionTracker::new(),
            persistence: self.persistence,
            channel,
            flags: self.flags,
        }
    }
}

#[derive(Debug)]
pub struct InputBridge<C, S> {
    classifier: KeyClassifier,
    composition: CompositionTracker,
    persistence: PersistenceAdapter<S>,
    channel: C,
    flags: StartupFlags,
}

impl<C: MessageChannel, S: StorageBackend> InputBridge<C, S> {
    #[must_use]
    pub const fn flags(&self) -> StartupFlags {
        self.flags
    }

    #[must_use]
    pub const fn is_composing(&self) -> bool {
        self.composition.is_active()
    }

    #[must_use]
    pub fn composition(&self) -> &CompositionTracker {
        &self.composition
    }

    #[must_use]
    pub fn channel(&self) -> &C {
        &self.channel
    }

    #[must_use]
    pub fn persistence(&self) -> &PersistenceAdapter<S> {
        &self.persistence
    }

    /// Pure classification; hosts call `preventDefault` before [`Self::forward`].
    ///
    /// Text keystrokes the DOM flags as `isComposing` are left to the IME:
    /// the composed text reaches the core once, through `onChange`. Command
    /// chords are never part of the composed text and always classify.
    #[must_use]
    pub fn classify_keydown(&self, event: &KeyEvent) -> Classification {
        if event.composing && !event.mods.is_command() {
            trace!(key = &*event.key, "keydown inside composition; passing through");
            return Classification::pass_through();
        }
        self.classifier.classify(event)
    }

    /// Send the command carried by `classification`, if any.
    pub fn forward(&mut self, classification: &Classification) -> Result<()> {
        match &classification.forward {
            Some(key) => self.send(OutboundMessage::Command(key.clone())),
            None => Ok(()),
        }
    }

    pub fn handle_keydown(&mut self, event: &KeyEvent) -> Result<KeyOutcome> {
        let classification = self.classify_keydown(event);
        self.forward(&classification)?;
        Ok(KeyOutcome {
            prevent_default: classification.prevents_default(),
        })
    }

    /// Feed a composition event. `current_value` is the designated element's
    /// value at dispatch time.
    pub fn handle_composition(&mut self, event: &CompositionEvent, current_value: &str) -> Result<()> {
        for message in self.composition.feed(event, current_value) {
            self.send(message)?;
        }
        Ok(())
    }

    pub fn handle_inbound(&mut self, message: InboundMessage) -> Result<()> {
        trace!(port = message.port(), "inbound message");
        match message {
            InboundMessage::CorpusChanged(index) => self.persistence.save(index),
        }
    }

    fn send(&mut self, message: OutboundMessage) -> Result<()> {
        trace!(%message, "outbound message");
        self.channel.send(message)
    }
}
