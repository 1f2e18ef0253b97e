//! Inbound event queue.
//!
//! Everything that can happen to the watch app becomes an [`Event`]:
//! - Messaging callbacks (received, dropped, sent, failed)
//! - Refresh timers coming due
//! - Minute tick from the wall clock
//! - Bluetooth peer presence and watch battery changes
//! - Button presses
//!
//! Producers push, the single driver loop pops and hands each event to
//! [`StatusApp::handle`](crate::app::service::StatusApp::handle), which runs
//! it to completion before the next one.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Messaging   │────▶│              │     │              │
//! │ Timers      │────▶│  EventQueue  │────▶│  Driver loop │
//! │ Tick / BT   │────▶│  (FIFO)      │     │  (consumer)  │
//! │ Buttons     │────▶│              │     │              │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

use heapless::Deque;
use log::warn;

use crate::app::commands::Button;
use crate::app::ports::SchedulerDelegate;
use crate::appointment::LocalTime;
use crate::error::TransportError;
use crate::protocol::Dictionary;
use crate::scheduler::TimerHandle;

/// Maximum number of pending events.
pub const EVENT_QUEUE_CAP: usize = 16;

/// Inputs to the sync core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // ── Messaging ─────────────────────────────────────────
    /// A decoded message from the phone.
    MessageReceived(Dictionary),
    /// An inbound message was dropped by the transport.
    MessageDropped(TransportError),
    /// The phone acknowledged this outbound message.
    SendSucceeded(Dictionary),
    /// An outbound message was not delivered.
    SendFailed(TransportError),

    // ── Timers ────────────────────────────────────────────
    TimerFired(TimerHandle),
    MinuteTick(LocalTime),

    // ── Watch services ────────────────────────────────────
    /// Bluetooth peer appeared (`true`) or vanished.
    PeerConnection(bool),
    /// Watch battery level in percent.
    WatchBattery(u8),

    // ── User input ────────────────────────────────────────
    Button(Button),
}

/// Owned FIFO of pending events.
#[derive(Debug, Default)]
pub struct EventQueue {
    inner: Deque<Event, EVENT_QUEUE_CAP>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the queue is full (event dropped).
    pub fn push(&mut self, event: Event) -> bool {
        match self.inner.push_back(event) {
            Ok(()) => true,
            Err(event) => {
                warn!("EventQueue: full, dropping {event:?}");
                false
            }
        }
    }

    pub fn pop(&mut self) -> Option<Event> {
        self.inner.pop_front()
    }

    /// Drain all pending events into a callback, in FIFO order.  Events
    /// pushed by the callback itself are not seen; they wait for the next
    /// drain.
    pub fn drain(&mut self, mut handler: impl FnMut(Event)) {
        let pending = self.inner.len();
        for _ in 0..pending {
            match self.inner.pop_front() {
                Some(event) => handler(event),
                None => break,
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

/// Scheduler notifications land on the queue as [`Event::TimerFired`].
impl SchedulerDelegate for EventQueue {
    fn on_timer_fired(&mut self, handle: TimerHandle) -> bool {
        self.push(Event::TimerFired(handle))
    }
}
