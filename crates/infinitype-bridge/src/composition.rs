#![forbid(unsafe_code)]

//! IME composition session tracking.
//!
//! Composition events are delivered for one text-input element. While a
//! session is open, the core is told only that composition is in progress;
//! the composed text is delivered once, at session end, as the element's
//! value at that instant.
//!
//! Ordering on end is fixed: `composingInput(false)` always precedes
//! `onChange(text)`, so the core never sees a new value while it still
//! believes composition is active.

use tracing::debug;

use crate::channel::OutboundMessage;

/// Phase of a DOM composition event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CompositionEvent {
    Start,
    /// Intermediate preedit text. Diagnostic only.
    Update(Box<str>),
    End,
}

impl CompositionEvent {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Start => "compositionstart",
            Self::Update(_) => "compositionupdate",
            Self::End => "compositionend",
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CompositionSession {
    pending_text: String,
}

#[derive(Debug, Default, Clone)]
pub struct CompositionTracker {
    session: Option<CompositionSession>,
}

impl CompositionTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self { session: None }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Latest preedit text of the open session, if any.
    #[must_use]
    pub fn pending_text(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.pending_text.as_str())
    }

    /// Advance the session state machine and return the messages to send,
    /// in order.
    ///
    /// `current_value` is the element's value when the event fired; it is
    /// only read on [`CompositionEvent::End`].
    pub fn feed(&mut self, event: &CompositionEvent, current_value: &str) -> Vec<OutboundMessage> {
        match event {
            CompositionEvent::Start => match &mut self.session {
                Some(session) => {
                    debug!("compositionstart while a session is open; restarting in place");
                    session.pending_text.clear();
                    Vec::new()
                }
                None => {
                    self.session = Some(CompositionSession::default());
                    vec![OutboundMessage::ComposingInput(true)]
                }
            },
            CompositionEvent::Update(data) => {
                match &mut self.session {
                    Some(session) => {
                        session.pending_text.clear();
                        session.pending_text.push_str(data);
                    }
                    None => debug!("compositionupdate without an open session; ignored"),
                }
                Vec::new()
            }
            CompositionEvent::End => {
                if self.session.take().is_none() {
                    debug!("compositionend without an open session; ignored");
                    return Vec::new();
                }
                vec![
                    OutboundMessage::ComposingInput(false),
                    OutboundMessage::OnChange(current_value.into()),
                ]
            }
        }
    }
}
