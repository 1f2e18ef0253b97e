//! Port traits: the boundary between the sync core and the watch runtime.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ StatusApp (domain)
//! ```
//!
//! Driven adapters (phone transport, clock, event sink) implement these
//! traits.  The [`StatusApp`](super::service::StatusApp) consumes them via
//! generics, so the domain core never touches the vendor messaging API or
//! the UI directly.

use crate::appointment::LocalTime;
use crate::error::TransportError;
use crate::protocol::Dictionary;
use crate::scheduler::TimerHandle;

// ───────────────────────────────────────────────────────────────
// Transport port (driven adapter: domain → phone)
// ───────────────────────────────────────────────────────────────

/// Outbound half of the phone messaging channel.
///
/// Delivery is asynchronous: `send` returning `Ok` only means the message
/// was accepted.  The outcome arrives later as
/// [`Event::SendSucceeded`](crate::events::Event::SendSucceeded) or
/// [`Event::SendFailed`](crate::events::Event::SendFailed).
pub trait TransportPort {
    /// Whether a paired phone is currently reachable.
    fn peer_connected(&self) -> bool;

    /// Hand a dictionary to the transport.
    fn send(&mut self, message: &Dictionary) -> Result<(), TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Time source for the scheduler and the appointment countdown.
pub trait ClockPort {
    /// Monotonic milliseconds since boot.
    fn uptime_ms(&self) -> u64;

    /// Current local wall-clock time.
    fn local_time(&self) -> LocalTime;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → UI / haptics / logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits [`AppEvent`](super::events::AppEvent)s through this
/// port.  Adapters decide where they go (redraw a layer, buzz the motor,
/// write to the log).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (domain → driver)
// ───────────────────────────────────────────────────────────────

/// Receives timer-due notifications from
/// [`RefreshScheduler::poll`](crate::scheduler::RefreshScheduler::poll).
pub trait SchedulerDelegate {
    /// Returns `false` when the notification could not be taken; the
    /// scheduler then keeps the timer armed and reports it again.
    fn on_timer_fired(&mut self, handle: TimerHandle) -> bool;
}
