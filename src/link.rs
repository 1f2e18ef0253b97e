//! Connection-loss and recovery state machine.
//!
//! ```text
//!                 send ok / msg rcvd
//!   ┌──────────────┐◀──────────────────┌──────────────┐
//!   │  Connected   │                    │ Disconnected │
//!   └──────┬───────┘──────────────────▶└──────────────┘
//!          │          send failed / drop         ▲
//!          │ SendTimeout                         │
//!          ▼                                     │ other failure
//!   ┌────────────────┐  SendTimeout  ┌──────────────────┐
//!   │ TimeoutPending │──────────────▶│ TimeoutConfirmed │  (double pulse)
//!   └────────────────┘               └──────────────────┘
//! ```
//!
//! The monitor only decides; it returns a [`LinkReaction`] saying which
//! status code to show, whether to buzz, and what to do with the recovery
//! timer.  The service applies it.

use core::fmt;

use crate::app::events::VibePattern;
use crate::error::TransportError;

/// Status text for "peer lost".
pub const STATUS_NO_BT: &str = "No BT";
/// Status text after an acknowledged send.
pub const STATUS_OK: &str = "Ok";

/// Observable link state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Connected,
    Disconnected,
    /// One send timed out; might be transient.
    TimeoutPending,
    /// Two consecutive timeouts; the user has been told.
    TimeoutConfirmed,
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => write!(f, "Connected"),
            Self::Disconnected => write!(f, "Disconnected"),
            Self::TimeoutPending => write!(f, "TimeoutPending"),
            Self::TimeoutConfirmed => write!(f, "TimeoutConfirmed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum TimeoutStage {
    #[default]
    Clear,
    Pending,
    Confirmed,
}

/// What to do with the recovery timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    Leave,
    /// Cancel any live recovery timer and arm a fresh one.
    Rearm,
    Cancel,
}

/// Side effects of one link event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkReaction {
    /// New status text; `None` leaves it alone, `Some("")` clears it.
    pub status: Option<&'static str>,
    pub pulse: Option<VibePattern>,
    pub recovery: RecoveryAction,
}

impl LinkReaction {
    const fn status(status: &'static str) -> Self {
        Self {
            status: Some(status),
            pulse: None,
            recovery: RecoveryAction::Leave,
        }
    }
}

/// Tracks whether the phone is answering.
///
/// The timeout stage is kept apart from the observable state: it survives
/// inbound messages and other failures, and only an acknowledgement resets
/// it.
#[derive(Debug, Clone)]
pub struct LinkMonitor {
    state: LinkState,
    timeout: TimeoutStage,
}

impl Default for LinkMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkMonitor {
    /// Starts disconnected until the first message or acknowledgement.
    pub fn new() -> Self {
        Self {
            state: LinkState::Disconnected,
            timeout: TimeoutStage::Clear,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    /// Any inbound message proves the phone is there.
    pub fn on_message_received(&mut self) -> LinkReaction {
        self.state = LinkState::Connected;
        LinkReaction::status("")
    }

    /// The phone acknowledged our last message.
    pub fn on_send_succeeded(&mut self) -> LinkReaction {
        self.state = LinkState::Connected;
        self.timeout = TimeoutStage::Clear;
        LinkReaction {
            status: Some(STATUS_OK),
            pulse: None,
            recovery: RecoveryAction::Cancel,
        }
    }

    /// An inbound message was lost before we could read it.
    pub fn on_message_dropped(&mut self, reason: TransportError) -> LinkReaction {
        self.state = LinkState::Disconnected;
        LinkReaction {
            status: Some(reason.dropped_code()),
            pulse: None,
            recovery: RecoveryAction::Rearm,
        }
    }

    /// Our last message was not delivered.  Timeouts walk the timeout
    /// stages; every other reason lands in `Disconnected`.
    pub fn on_send_failed(&mut self, reason: TransportError) -> LinkReaction {
        let was_connected = self.is_connected();
        let pulse = match reason {
            TransportError::SendTimeout => {
                let pulse = match self.timeout {
                    TimeoutStage::Clear => {
                        self.timeout = TimeoutStage::Pending;
                        None
                    }
                    TimeoutStage::Pending => {
                        self.timeout = TimeoutStage::Confirmed;
                        Some(VibePattern::DoublePulse)
                    }
                    TimeoutStage::Confirmed => None,
                };
                self.state = match self.timeout {
                    TimeoutStage::Confirmed => LinkState::TimeoutConfirmed,
                    _ => LinkState::TimeoutPending,
                };
                pulse
            }
            TransportError::NotConnected => {
                self.state = LinkState::Disconnected;
                was_connected.then_some(VibePattern::DoublePulse)
            }
            _ => {
                self.state = LinkState::Disconnected;
                None
            }
        };
        LinkReaction {
            status: Some(reason.send_failed_code()),
            pulse,
            recovery: RecoveryAction::Rearm,
        }
    }

    /// Bluetooth peer presence changed.  Only the status line reacts here;
    /// the service handles timers and the screen-enter.
    pub fn on_peer_connection(&mut self, present: bool) -> LinkReaction {
        if present {
            LinkReaction::status("")
        } else {
            LinkReaction::status(STATUS_NO_BT)
        }
    }
}
