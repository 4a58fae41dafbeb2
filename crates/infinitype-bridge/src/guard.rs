#![forbid(unsafe_code)]

//! Safe-call wrapper for event handlers.
//!
//! Input handling must survive any single bad event. Host callbacks run
//! their body through [`contain`], which logs a failure and turns it into
//! `None` instead of propagating it into the browser's event dispatch.

use std::cell::{RefCell, RefMut};

use tracing::warn;

use crate::error::{BridgeError, Result};

/// Run `f`, logging and discarding any error.
pub fn contain<T>(handler: &'static str, f: impl FnOnce() -> Result<T>) -> Option<T> {
    contain_with(handler, f, |_| {})
}

/// Like [`contain`], additionally handing the error to `report` (e.g. a
/// browser console sink) after it is logged.
pub fn contain_with<T>(
    handler: &'static str,
    f: impl FnOnce() -> Result<T>,
    report: impl FnOnce(&BridgeError),
) -> Option<T> {
    match f() {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(handler, error = %err, "input handler failed; event dropped");
            report(&err);
            None
        }
    }
}

/// Mutably borrow shared handler state, mapping a live borrow to
/// [`BridgeError::Reentrant`].
pub fn borrow_mut<'a, T>(cell: &'a RefCell<T>, handler: &'static str) -> Result<RefMut<'a, T>> {
    cell.try_borrow_mut()
        .map_err(|_| BridgeError::Reentrant(handler))
}
