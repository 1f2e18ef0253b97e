//! Outbound application events.
//!
//! The [`StatusApp`](super::service::StatusApp) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  The presentation layer on
//! the other side redraws the affected layer, drives the vibration motor,
//! or just logs.

use crate::display::Field;
use crate::link::LinkState;
use crate::protocol::ScreenId;

/// Vibration patterns the core asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VibePattern {
    ShortPulse,
    DoublePulse,
}

/// Structured events emitted by the sync core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The service has started and sent its first screen-enter.
    Started,

    /// Status line changed.  Empty string clears it.
    StatusText(&'static str),

    /// Haptic feedback request.
    Vibrate(VibePattern),

    /// A cached display field has a new value.
    FieldUpdated(Field),

    /// The connection state machine moved.
    LinkChanged { from: LinkState, to: LinkState },

    /// The phone acknowledged a screen switch.
    ScreenChanged(ScreenId),

    /// The service stopped; all timers are cancelled.
    Stopped,
}
