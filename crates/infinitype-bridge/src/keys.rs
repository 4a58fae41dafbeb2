#![forbid(unsafe_code)]

//! Keydown classification.
//!
//! A keydown is one of:
//! - a command the core should hear about (`Forward`),
//! - a key whose browser default must be suppressed but which the core does
//!   not care about (`PreventOnly`), or
//! - anything else (`PassThrough`), left entirely to the browser.
//!
//! Only Ctrl and Meta make a keystroke a command. Modifier combinations
//! outside the command set pass through so native browser shortcuts keep
//! working.

use bitflags::bitflags;
use tracing::trace;

use crate::config::BridgeConfig;

/// DOM `key` value that is always forwarded when no command modifier is held.
pub const TAB_KEY: &str = "Tab";

bitflags! {
    /// Modifier keys held during a keydown.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const META  = 0b1000;
    }
}

impl Modifiers {
    /// Build from DOM-style boolean flags.
    #[must_use]
    pub fn from_flags(shift: bool, alt: bool, ctrl: bool, meta: bool) -> Self {
        let mut mods = Self::empty();
        mods.set(Self::SHIFT, shift);
        mods.set(Self::ALT, alt);
        mods.set(Self::CTRL, ctrl);
        mods.set(Self::META, meta);
        mods
    }

    /// Ctrl or Meta held.
    #[must_use]
    pub const fn is_command(self) -> bool {
        self.intersects(Self::CTRL.union(Self::META))
    }
}

/// Keydown as seen by the bridge: the DOM `key` string plus modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key: Box<str>,
    pub mods: Modifiers,
    /// DOM `isComposing`: the keystroke belongs to an IME composition.
    pub composing: bool,
}

impl KeyEvent {
    #[must_use]
    pub fn new(key: impl Into<Box<str>>, mods: Modifiers) -> Self {
        Self {
            key: key.into(),
            mods,
            composing: false,
        }
    }

    #[must_use]
    pub fn with_composing(mut self, composing: bool) -> Self {
        self.composing = composing;
        self
    }

    #[must_use]
    pub fn plain(key: impl Into<Box<str>>) -> Self {
        Self::new(key, Modifiers::empty())
    }

    #[must_use]
    pub const fn meta_pressed(&self) -> bool {
        self.mods.contains(Modifiers::META)
    }

    #[must_use]
    pub const fn ctrl_pressed(&self) -> bool {
        self.mods.contains(Modifiers::CTRL)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Suppress the default action and emit the key on the command port.
    Forward,
    /// Suppress the default action, emit nothing.
    PreventOnly,
    /// Leave the event alone.
    PassThrough,
}

impl KeyAction {
    #[must_use]
    pub const fn prevents_default(self) -> bool {
        matches!(self, Self::Forward | Self::PreventOnly)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::PreventOnly => "prevent_only",
            Self::PassThrough => "pass_through",
        }
    }
}

/// Result of classifying one keydown.
///
/// `forward` is `Some` exactly when `action` is [`KeyAction::Forward`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub action: KeyAction,
    pub forward: Option<Box<str>>,
}

impl Classification {
    #[must_use]
    pub fn forward(key: &str) -> Self {
        Self {
            action: KeyAction::Forward,
            forward: Some(key.into()),
        }
    }

    #[must_use]
    pub const fn prevent_only() -> Self {
        Self {
            action: KeyAction::PreventOnly,
            forward: None,
        }
    }

    #[must_use]
    pub const fn pass_through() -> Self {
        Self {
            action: KeyAction::PassThrough,
            forward: None,
        }
    }

    #[must_use]
    pub const fn prevents_default(&self) -> bool {
        self.action.prevents_default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyClassifier {
    command_keys: Vec<String>,
    prevented_keys: Vec<String>,
}

impl KeyClassifier {
    #[must_use]
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            command_keys: config.command_keys.clone(),
            prevented_keys: config.prevented_keys.clone(),
        }
    }

    #[must_use]
    pub fn classify(&self, event: &KeyEvent) -> Classification {
        let key = &*event.key;
        let classification = if !event.mods.is_command() {
            // Tab is forwarded before the prevented set is consulted.
            if key == TAB_KEY {
                Classification::forward(key)
            } else if contains(&self.prevented_keys, key) {
                Classification::prevent_only()
            } else {
                Classification::pass_through()
            }
        } else if contains(&self.command_keys, key) {
            Classification::forward(key)
        } else {
            Classification::pass_through()
        };

        trace!(
            key,
            mods = event.mods.bits(),
            action = classification.action.label(),
            "classified keydown"
        );
        classification
    }
}

fn contains(keys: &[String], key: &str) -> bool {
    keys.iter().any(|k| k == key)
}
