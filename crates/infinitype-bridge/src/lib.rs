#![forbid(unsafe_code)]

//! `infinitype-bridge` normalizes keyboard and IME composition input into the
//! small message protocol spoken by the Infinitype application core, and
//! persists the user's corpus selection across sessions.
//!
//! Design goals:
//! - **Host-agnostic**: nothing here touches the DOM. The embedding layer
//!   (`infinitype-web`) converts browser events into [`KeyEvent`] and
//!   [`CompositionEvent`] values and supplies a [`MessageChannel`] and a
//!   [`StorageBackend`].
//! - **Never crash on input**: handlers return [`BridgeError`] and every
//!   host callback runs through [`guard::contain`], so one bad event cannot
//!   take down input handling for the rest of the page's lifetime.
//! - **Single-threaded**: the bridge is driven from one event loop and holds
//!   no locks.
//!
//! Startup is two-phase because the core needs its flags before its ports
//! exist:
//!
//! ```
//! use infinitype_bridge::{BridgeConfig, MemoryChannel, MemoryStorage, PendingBridge};
//! use infinitype_bridge::{KeyEvent, Modifiers, OutboundMessage};
//!
//! let pending = PendingBridge::new(BridgeConfig::default(), MemoryStorage::default());
//! assert_eq!(pending.flags().corpus, 6);
//!
//! let mut bridge = pending.connect(MemoryChannel::default());
//! let outcome = bridge
//!     .handle_keydown(&KeyEvent::new("p", Modifiers::CTRL))
//!     .expect("memory channel never fails");
//! assert!(outcome.prevent_default);
//! assert_eq!(
//!     bridge.channel().sent(),
//!     &[OutboundMessage::Command("p".into())]
//! );
//! ```

pub mod bridge;
pub mod channel;
pub mod composition;
pub mod config;
pub mod error;
pub mod guard;
pub mod keys;
pub mod persistence;

pub use bridge::{InputBridge, KeyOutcome, PendingBridge, StartupFlags};
pub use channel::{InboundMessage, MemoryChannel, MessageChannel, OutboundMessage};
pub use composition::{CompositionEvent, CompositionTracker};
pub use config::{BridgeConfig, DEFAULT_CORPUS, DEFAULT_STORAGE_KEY};
pub use error::{BridgeError, Result};
pub use keys::{Classification, KeyAction, KeyClassifier, KeyEvent, Modifiers, TAB_KEY};
pub use persistence::{MemoryStorage, PersistenceAdapter, StorageBackend};
