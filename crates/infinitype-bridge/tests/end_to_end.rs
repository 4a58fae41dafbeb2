#![forbid(unsafe_code)]

//! End-to-end scenarios driven the way a host drives the bridge: shared
//! state behind `Rc<RefCell<_>>`, every callback wrapped in the guard.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use infinitype_bridge::guard::{borrow_mut, contain};
use infinitype_bridge::{
    BridgeConfig, BridgeError, CompositionEvent, InboundMessage, InputBridge, KeyEvent,
    MemoryChannel, MemoryStorage, MessageChannel, Modifiers, OutboundMessage, PendingBridge,
    StorageBackend,
};
use pretty_assertions::assert_eq;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Counts WARN-level events.
#[derive(Clone, Default)]
struct WarnCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

type Shared = Rc<RefCell<InputBridge<MemoryChannel, MemoryStorage>>>;

fn boot(storage: MemoryStorage) -> (Shared, i64) {
    let pending = PendingBridge::new(BridgeConfig::default(), storage);
    let corpus = pending.flags().corpus;
    let bridge = pending.connect(MemoryChannel::default());
    (Rc::new(RefCell::new(bridge)), corpus)
}

/// Mirrors the web keydown listener: prevent first, then forward.
fn keydown(shared: &Shared, event: KeyEvent) -> bool {
    contain("keydown", || {
        let mut bridge = borrow_mut(shared, "keydown")?;
        let classification = bridge.classify_keydown(&event);
        let prevented = classification.prevents_default();
        bridge.forward(&classification)?;
        Ok(prevented)
    })
    .unwrap_or(false)
}

fn composition(shared: &Shared, event: CompositionEvent, value: &str) {
    contain(event.label(), || {
        borrow_mut(shared, event.label())?.handle_composition(&event, value)
    });
}

fn sent(shared: &Shared) -> Vec<OutboundMessage> {
    shared.borrow().channel().sent().to_vec()
}

#[test]
fn absent_key_boots_core_with_default_corpus() {
    let (shared, corpus) = boot(MemoryStorage::default());
    assert_eq!(corpus, 6);
    assert_eq!(
        shared.borrow().flags().to_json_string().unwrap(),
        r#"{"corpus":6}"#
    );
}

#[test]
fn ctrl_p_is_forwarded_and_print_suppressed() {
    let (shared, _) = boot(MemoryStorage::default());
    assert!(keydown(&shared, KeyEvent::new("p", Modifiers::CTRL)));
    assert_eq!(sent(&shared), vec![OutboundMessage::Command("p".into())]);
}

#[test]
fn meta_p_behaves_like_ctrl_p() {
    let (shared, _) = boot(MemoryStorage::default());
    assert!(keydown(&shared, KeyEvent::new("p", Modifiers::META)));
    assert_eq!(sent(&shared), vec![OutboundMessage::Command("p".into())]);
}

#[test]
fn ime_composition_delivers_composed_text_once() {
    let (shared, _) = boot(MemoryStorage::default());
    composition(&shared, CompositionEvent::Start, "");
    composition(&shared, CompositionEvent::Update("h".into()), "h");
    assert!(!keydown(&shared, KeyEvent::plain("Process").with_composing(true)));
    composition(&shared, CompositionEvent::Update("hao".into()), "hao");
    composition(&shared, CompositionEvent::End, "好");
    assert_eq!(
        sent(&shared),
        vec![
            OutboundMessage::ComposingInput(true),
            OutboundMessage::ComposingInput(false),
            OutboundMessage::OnChange("好".into()),
        ]
    );
}

#[test]
fn print_is_suppressed_while_an_ime_is_composing() {
    let (shared, _) = boot(MemoryStorage::default());
    composition(&shared, CompositionEvent::Start, "");
    assert!(keydown(&shared, KeyEvent::new("p", Modifiers::CTRL).with_composing(true)));
    assert_eq!(
        sent(&shared),
        vec![
            OutboundMessage::ComposingInput(true),
            OutboundMessage::Command("p".into()),
        ]
    );
}

#[test]
fn corpus_change_survives_a_reload() {
    let (shared, _) = boot(MemoryStorage::default());
    contain("corpusChanged", || {
        borrow_mut(&shared, "corpusChanged")?.handle_inbound(InboundMessage::CorpusChanged(11))
    });
    let storage = shared.borrow().persistence().storage().clone();

    let (_, corpus) = boot(storage);
    assert_eq!(corpus, 11);
}

#[test]
fn corrupt_storage_boots_with_default() {
    let storage = MemoryStorage::default().with_item("infinitype:chosen_corpus", "NaN");
    let (_, corpus) = boot(storage);
    assert_eq!(corpus, 6);
}

#[test]
fn reentrant_dispatch_is_contained_and_logged() {
    let warnings = WarnCounter::default();
    let subscriber = tracing_subscriber::registry().with(warnings.clone());
    let _guard = tracing::subscriber::set_default(subscriber);

    let (shared, _) = boot(MemoryStorage::default());
    let held = shared.borrow_mut();
    // A port send that synchronously re-enters the keydown listener.
    assert!(!keydown(&shared, KeyEvent::plain("Tab")));
    drop(held);

    assert_eq!(warnings.0.load(Ordering::SeqCst), 1);
    // The listener is still usable afterwards.
    assert!(keydown(&shared, KeyEvent::plain("Tab")));
    assert_eq!(sent(&shared), vec![OutboundMessage::Command("Tab".into())]);
}

struct ReadOnlyStorage;

impl StorageBackend for ReadOnlyStorage {
    fn get_item(&self, _key: &str) -> infinitype_bridge::Result<Option<String>> {
        Ok(Some("4".to_owned()))
    }

    fn set_item(&mut self, _key: &str, _value: &str) -> infinitype_bridge::Result<()> {
        Err(BridgeError::storage("write", "QuotaExceededError"))
    }
}

struct ClosedPort;

impl MessageChannel for ClosedPort {
    fn send(&mut self, message: OutboundMessage) -> infinitype_bridge::Result<()> {
        Err(BridgeError::port(message.port(), "port closed"))
    }
}

#[test]
fn storage_and_port_faults_never_escape_handlers() {
    let pending = PendingBridge::new(BridgeConfig::default(), ReadOnlyStorage);
    assert_eq!(pending.flags().corpus, 4);
    let shared = Rc::new(RefCell::new(pending.connect(ClosedPort)));

    let saved = contain("corpusChanged", || {
        borrow_mut(&shared, "corpusChanged")?.handle_inbound(InboundMessage::CorpusChanged(1))
    });
    assert_eq!(saved, None);

    let prevented = contain("keydown", || {
        let mut bridge = borrow_mut(&shared, "keydown")?;
        let classification = bridge.classify_keydown(&KeyEvent::plain("Tab"));
        bridge.forward(&classification)?;
        Ok(classification.prevents_default())
    });
    assert_eq!(prevented, None);

    // Arrow keys never touch the port, so they keep working.
    let prevented = contain("keydown", || {
        Ok(borrow_mut(&shared, "keydown")?
            .handle_keydown(&KeyEvent::plain("ArrowLeft"))?
            .prevent_default)
    });
    assert_eq!(prevented, Some(true));
}
