use std::cell::RefCell;

use super::*;
use crate::memory::MemoryOrigin;

const CHANNEL: &str = "switchboard-theme";

fn listen(channel: &Rc<dyn BroadcastChannel>) -> Rc<RefCell<Vec<String>>> {
    let received = Rc::new(RefCell::new(Vec::new()));
    let sink = received.clone();
    channel.subscribe(Box::new(move |raw: &str| sink.borrow_mut().push(raw.to_owned()))).unwrap();
    received
}

// =============================================================
// Payload
// =============================================================

#[test]
fn encode_produces_theme_object() {
    assert_eq!(ThemeMessage { theme: Theme::Light }.encode().unwrap(), r#"{"theme":"light"}"#);
}

#[test]
fn decode_reads_theme_field() {
    assert_eq!(decode_message(r#"{"theme":"light"}"#, Theme::Dark), Theme::Light);
    assert_eq!(decode_message(r#"{"theme":"dark","from":"ops"}"#, Theme::Light), Theme::Dark);
}

#[test]
fn decode_malformed_payload_yields_default() {
    for raw in [r#"{"theme":"purple"}"#, "{}", "not json", "", "\"dark\"", r#"{"theme":null}"#] {
        assert_eq!(decode_message(raw, Theme::Dark), Theme::Dark, "{raw:?}");
    }
}

// =============================================================
// Broadcaster
// =============================================================

#[test]
fn broadcast_reaches_other_channels_but_not_the_sender() {
    let origin = MemoryOrigin::new();
    let sender = origin.open_context().environment();
    let receiver = origin.open_context().environment();

    let broadcaster = Broadcaster::default();
    let own_channel = broadcaster.connect(sender.channels.as_ref(), CHANNEL).unwrap();
    let own = listen(&own_channel);
    let other = listen(&receiver.channels.as_ref().unwrap().open(CHANNEL).unwrap());

    broadcaster.broadcast(Theme::Light);
    origin.run_until_idle();

    assert!(own.borrow().is_empty());
    assert_eq!(*other.borrow(), vec![r#"{"theme":"light"}"#.to_owned()]);
}

#[test]
fn channels_with_other_names_do_not_receive() {
    let origin = MemoryOrigin::new();
    let sender = origin.open_context().environment();
    let receiver = origin.open_context().environment();
    let unrelated = listen(&receiver.channels.as_ref().unwrap().open("chat").unwrap());

    let broadcaster = Broadcaster::default();
    broadcaster.connect(sender.channels.as_ref(), CHANNEL);
    broadcaster.broadcast(Theme::Dark);
    origin.run_until_idle();

    assert!(unrelated.borrow().is_empty());
}

#[test]
fn connect_without_runtime_is_not_fatal() {
    let broadcaster = Broadcaster::default();
    assert!(broadcaster.connect(None, CHANNEL).is_none());
    assert!(!broadcaster.is_connected());
    broadcaster.broadcast(Theme::Dark);
}

#[test]
fn connect_failure_leaves_broadcaster_disconnected() {
    let origin = MemoryOrigin::new();
    origin.disable_broadcast();
    let env = origin.open_context().environment();
    let broadcaster = Broadcaster::default();
    assert!(broadcaster.connect(env.channels.as_ref(), CHANNEL).is_none());
    assert!(!broadcaster.is_connected());
}

#[test]
fn send_failure_is_swallowed() {
    let origin = MemoryOrigin::new();
    origin.fail_broadcast_sends(true);
    let env = origin.open_context().environment();
    let broadcaster = Broadcaster::default();
    broadcaster.connect(env.channels.as_ref(), CHANNEL);
    broadcaster.broadcast(Theme::Light);
    assert_eq!(origin.pending(), 0);
}
