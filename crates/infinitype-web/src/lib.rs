#![forbid(unsafe_code)]

//! WASM frontend for the Infinitype input bridge.
//!
//! The page calls `boot(init, options)` once. `boot` reads the persisted
//! corpus, calls `init({ corpus })` to start the application core, wires the
//! core's ports into an [`infinitype_bridge::InputBridge`], and attaches one
//! `keydown` listener on `document` plus the composition triple on the
//! designated input element. The returned `WebBridge` owns those listeners
//! for the lifetime of the page.
//!
//! Option parsing and JS number conversion are plain Rust and tested
//! natively; everything touching `web_sys` lives in the `wasm` module.

pub mod convert;
pub mod options;

pub use options::{DEFAULT_INPUT_ELEMENT_ID, WebOptions};

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{WebBridge, boot};
