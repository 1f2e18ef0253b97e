//! Mock watch runtime for integration tests.
//!
//! Records every outbound message and every emitted event so tests can
//! assert on the full history, and drives the service through the same
//! poll → queue → handle loop the real runtime uses.

use smartstatus::app::events::{AppEvent, VibePattern};
use smartstatus::app::ports::{ClockPort, EventSink, TransportPort};
use smartstatus::app::service::StatusApp;
use smartstatus::appointment::LocalTime;
use smartstatus::config::SyncConfig;
use smartstatus::events::{Event, EventQueue};
use smartstatus::protocol::keys::{self, Key};
use smartstatus::protocol::{Dictionary, SEQUENCE_RESET};
use smartstatus::TransportError;

// ── MockWatch (TransportPort + ClockPort) ─────────────────────

pub struct MockWatch {
    pub peer: bool,
    pub now_ms: u64,
    pub local: LocalTime,
    pub refuse: Option<TransportError>,
    pub sent: Vec<Dictionary>,
}

#[allow(dead_code)]
impl MockWatch {
    pub fn new() -> Self {
        Self {
            peer: true,
            now_ms: 0,
            local: LocalTime::new(12, 25, 9, 0),
            refuse: None,
            sent: Vec::new(),
        }
    }

    pub fn last_sent(&self) -> Option<&Dictionary> {
        self.sent.last()
    }

    /// Messages carrying `key`.
    pub fn sent_with(&self, key: Key) -> Vec<&Dictionary> {
        self.sent.iter().filter(|d| d.contains(key)).collect()
    }

    /// Screen-enter messages for `screen`.
    pub fn screen_enters(&self, screen: i32) -> usize {
        self.sent
            .iter()
            .filter(|d| d.find_i32(keys::SCREEN_ENTER) == Some(screen))
            .count()
    }

    /// Sequence numbers of every normal (non-reset) send, in order.
    pub fn sequence_numbers(&self) -> Vec<u32> {
        self.sent
            .iter()
            .filter_map(|d| d.find_i32(keys::SEQUENCE_NUMBER))
            .map(|s| s as u32)
            .filter(|s| *s != SEQUENCE_RESET)
            .collect()
    }
}

impl Default for MockWatch {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportPort for MockWatch {
    fn peer_connected(&self) -> bool {
        self.peer
    }

    fn send(&mut self, message: &Dictionary) -> Result<(), TransportError> {
        if let Some(e) = self.refuse {
            return Err(e);
        }
        self.sent.push(message.clone());
        Ok(())
    }
}

impl ClockPort for MockWatch {
    fn uptime_ms(&self) -> u64 {
        self.now_ms
    }

    fn local_time(&self) -> LocalTime {
        self.local
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn vibrations(&self, pattern: VibePattern) -> usize {
        self.events
            .iter()
            .filter(|e| **e == AppEvent::Vibrate(pattern))
            .count()
    }

    pub fn last_status(&self) -> Option<&'static str> {
        self.events.iter().rev().find_map(|e| match e {
            AppEvent::StatusText(s) => Some(*s),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}

// ── Harness ───────────────────────────────────────────────────

/// Service plus mocks plus the driver loop.
pub struct Harness {
    pub app: StatusApp,
    pub watch: MockWatch,
    pub sink: RecordingSink,
    pub queue: EventQueue,
}

#[allow(dead_code)]
impl Harness {
    /// Started service with default configuration.
    pub fn started() -> Self {
        Self::started_with(SyncConfig::default())
    }

    pub fn started_with(config: SyncConfig) -> Self {
        let mut h = Self {
            app: StatusApp::new(config),
            watch: MockWatch::new(),
            sink: RecordingSink::new(),
            queue: EventQueue::new(),
        };
        h.app.start(&mut h.watch, &mut h.sink);
        h
    }

    /// Only the categories under test tick within a test's time span.
    pub fn quiet_config() -> SyncConfig {
        SyncConfig {
            weather_interval_ms: 3_600_000,
            calendar_interval_ms: 3_600_000,
            music_interval_ms: 3_600_000,
            gps_interval_ms: 3_600_000,
            forecast_delay_ms: 3_600_000,
            ..SyncConfig::default()
        }
    }

    pub fn handle(&mut self, event: Event) {
        self.app.handle(event, &mut self.watch, &mut self.sink);
    }

    /// Move the clock to `now_ms` and run every timer that came due.
    pub fn advance_to(&mut self, now_ms: u64) {
        self.watch.now_ms = now_ms;
        self.app.poll_timers(now_ms, &mut self.queue);
        while let Some(event) = self.queue.pop() {
            self.app.handle(event, &mut self.watch, &mut self.sink);
        }
    }

    /// Acknowledge the most recent outbound message.
    pub fn ack(&mut self) {
        let sent = self.watch.last_sent().cloned().unwrap_or_default();
        self.handle(Event::SendSucceeded(sent));
    }

    pub fn receive(&mut self, msg: Dictionary) {
        self.handle(Event::MessageReceived(msg));
    }
}
