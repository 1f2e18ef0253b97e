//! Link health as seen through the service: status codes, pulses and
//! state transitions for every transport outcome.

use smartstatus::app::events::{AppEvent, VibePattern};
use smartstatus::events::Event;
use smartstatus::link::LinkState;
use smartstatus::protocol::Dictionary;
use smartstatus::TransportError;

use crate::mock_watch::Harness;

fn connected() -> Harness {
    let mut h = Harness::started_with(Harness::quiet_config());
    h.ack();
    h.sink.clear();
    h
}

#[test]
fn not_connected_after_connected_pulses_once() {
    let mut h = connected();

    h.handle(Event::SendFailed(TransportError::NotConnected));
    assert_eq!(h.sink.last_status(), Some("Disc."));
    assert_eq!(h.sink.vibrations(VibePattern::DoublePulse), 1);
    assert!(h.sink.events.contains(&AppEvent::LinkChanged {
        from: LinkState::Connected,
        to: LinkState::Disconnected,
    }));

    h.handle(Event::SendFailed(TransportError::NotConnected));
    assert_eq!(h.sink.vibrations(VibePattern::DoublePulse), 1);
}

#[test]
fn two_timeouts_confirm_with_one_pulse() {
    let mut h = connected();

    h.handle(Event::SendFailed(TransportError::SendTimeout));
    assert_eq!(h.app.link_state(), LinkState::TimeoutPending);
    assert_eq!(h.sink.last_status(), Some("T.Out"));
    assert_eq!(h.sink.vibrations(VibePattern::DoublePulse), 0);

    h.handle(Event::SendFailed(TransportError::SendTimeout));
    assert_eq!(h.app.link_state(), LinkState::TimeoutConfirmed);
    assert_eq!(h.sink.vibrations(VibePattern::DoublePulse), 1);

    h.handle(Event::SendFailed(TransportError::SendTimeout));
    assert_eq!(h.sink.vibrations(VibePattern::DoublePulse), 1);
}

#[test]
fn ack_clears_timeout_stage() {
    let mut h = connected();
    h.handle(Event::SendFailed(TransportError::SendTimeout));
    h.ack();
    assert_eq!(h.app.link_state(), LinkState::Connected);

    // Back to the first stage: one timeout alone does not pulse.
    h.handle(Event::SendFailed(TransportError::SendTimeout));
    assert_eq!(h.app.link_state(), LinkState::TimeoutPending);
    assert_eq!(h.sink.vibrations(VibePattern::DoublePulse), 0);
}

#[test]
fn received_message_reconnects_without_clearing_timeout() {
    let mut h = connected();
    h.handle(Event::SendFailed(TransportError::SendTimeout));

    h.receive(Dictionary::new());
    assert_eq!(h.app.link_state(), LinkState::Connected);
    assert_eq!(h.sink.last_status(), Some(""));

    // The stage survived, so the next timeout confirms.
    h.handle(Event::SendFailed(TransportError::SendTimeout));
    assert_eq!(h.app.link_state(), LinkState::TimeoutConfirmed);
    assert_eq!(h.sink.vibrations(VibePattern::DoublePulse), 1);
}

#[test]
fn disconnect_after_timeout_leaves_timeout_state() {
    let mut h = connected();
    h.handle(Event::SendFailed(TransportError::SendTimeout));
    h.handle(Event::SendFailed(TransportError::NotConnected));
    assert_eq!(h.app.link_state(), LinkState::Disconnected);
    assert!(h.sink.events.contains(&AppEvent::LinkChanged {
        from: LinkState::TimeoutPending,
        to: LinkState::Disconnected,
    }));

    h.handle(Event::SendFailed(TransportError::SendTimeout));
    assert_eq!(h.app.link_state(), LinkState::TimeoutConfirmed);
    h.handle(Event::MessageDropped(TransportError::Other));
    assert_eq!(h.app.link_state(), LinkState::Disconnected);
}

#[test]
fn failure_status_codes() {
    let cases = [
        (TransportError::SendTimeout, "T.Out"),
        (TransportError::SendRejected, "Nack"),
        (TransportError::NotConnected, "Disc."),
        (TransportError::BufferOverflow, "Err."),
        (TransportError::Busy, "<Busy"),
        (TransportError::Other, "Err."),
    ];
    for (reason, code) in cases {
        let mut h = connected();
        h.handle(Event::SendFailed(reason));
        assert_eq!(h.sink.last_status(), Some(code), "{reason:?}");
    }
}

#[test]
fn dropped_status_codes() {
    let cases = [
        (TransportError::BufferOverflow, "Over."),
        (TransportError::Busy, ">Busy"),
        (TransportError::Other, "Drop."),
    ];
    for (reason, code) in cases {
        let mut h = connected();
        h.handle(Event::MessageDropped(reason));
        assert_eq!(h.sink.last_status(), Some(code), "{reason:?}");
        assert_eq!(h.app.link_state(), LinkState::Disconnected);
    }
}
