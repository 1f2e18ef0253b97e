//! Application service: the hexagonal core.
//!
//! [`StatusApp`] owns every piece of sync state: the outbox and its
//! sequence counter, the refresh scheduler, the link monitor, the inbound
//! decoder and the display cache.  Inputs arrive one at a time through
//! [`StatusApp::handle`]; outputs leave through the transport and the
//! event sink.
//!
//! ```text
//!  EventQueue ──▶ ┌─────────────────────────────┐ ──▶ EventSink
//!                 │          StatusApp          │
//!  ClockPort  ──▶ │ Outbox · Scheduler · Link   │ ──▶ TransportPort
//!                 │ Decoder · DisplayCache      │
//!                 └─────────────────────────────┘
//! ```

use log::{debug, info};

use crate::appointment::{self, LocalTime};
use crate::config::SyncConfig;
use crate::decoder::InboundDecoder;
use crate::display::{BatteryMonitor, DisplayCache, Field};
use crate::events::Event;
use crate::link::{LinkMonitor, LinkReaction, LinkState, RecoveryAction};
use crate::protocol::keys;
use crate::protocol::{Command, Dictionary, Outbox, ScreenId, SendOutcome};
use crate::scheduler::{Category, RefreshScheduler};

use super::events::{AppEvent, VibePattern};
use super::ports::{ClockPort, EventSink, SchedulerDelegate, TransportPort};

// ───────────────────────────────────────────────────────────────
// StatusApp
// ───────────────────────────────────────────────────────────────

/// The status screen's sync core.
pub struct StatusApp {
    config: SyncConfig,
    outbox: Outbox,
    scheduler: RefreshScheduler,
    link: LinkMonitor,
    decoder: InboundDecoder,
    watch_battery: BatteryMonitor,
    display: DisplayCache,
    /// Screen the phone last acknowledged; `None` until the first ack.
    current_screen: Option<ScreenId>,
    /// Request held back until the phone acknowledges the screen switch it
    /// needs.
    pending_request: Option<(ScreenId, Command)>,
    /// Set when the GPS timer asks for a fix; gates the GPS interval key.
    gps_update_pending: bool,
    running: bool,
}

impl StatusApp {
    /// Construct the service.  Nothing is sent or armed until [`start`](Self::start).
    pub fn new(config: SyncConfig) -> Self {
        let scheduler = RefreshScheduler::new(&config);
        let decoder = InboundDecoder::new(BatteryMonitor::from_config(&config));
        let watch_battery = BatteryMonitor::from_config(&config);
        Self {
            config,
            outbox: Outbox::new(),
            scheduler,
            link: LinkMonitor::new(),
            decoder,
            watch_battery,
            display: DisplayCache::default(),
            current_screen: None,
            pending_request: None,
            gps_update_pending: false,
            running: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Announce the status screen to the phone and arm every refresh timer,
    /// plus the one-shot forecast request.
    pub fn start(&mut self, hw: &mut (impl TransportPort + ClockPort), sink: &mut impl EventSink) {
        let now = hw.uptime_ms();
        self.running = true;

        self.scheduler.arm(Category::Forecast, now);
        self.send(Command::ScreenEnter(ScreenId::StatusScreen), hw);
        for category in Category::PERIODIC {
            self.scheduler.arm(category, now);
        }

        sink.emit(&AppEvent::Started);
        info!("StatusApp started, {} timers armed", self.scheduler.active_count());
    }

    /// Leave the status screen: tell the phone and cancel every timer.
    pub fn stop(&mut self, hw: &mut impl TransportPort, sink: &mut impl EventSink) {
        self.send(Command::ScreenExit(ScreenId::StatusScreen), hw);
        self.scheduler.cancel_all();
        self.pending_request = None;
        self.running = false;
        sink.emit(&AppEvent::Stopped);
        info!("StatusApp stopped");
    }

    // ── Event dispatch ────────────────────────────────────────

    /// Process one event to completion.
    ///
    /// The `hw` parameter satisfies **both** [`TransportPort`] and
    /// [`ClockPort`], so handlers can send and read the time without a
    /// double mutable borrow.
    pub fn handle(
        &mut self,
        event: Event,
        hw: &mut (impl TransportPort + ClockPort),
        sink: &mut impl EventSink,
    ) {
        let before = self.link.state();
        let now = hw.uptime_ms();

        match event {
            Event::MessageReceived(msg) => {
                let reaction = self.link.on_message_received();
                self.on_message(&msg, now, hw.local_time(), sink);
                self.apply_reaction(reaction, now, sink);
            }
            Event::MessageDropped(reason) => {
                debug!("StatusApp: inbound dropped ({reason})");
                let reaction = self.link.on_message_dropped(reason);
                self.apply_reaction(reaction, now, sink);
            }
            Event::SendSucceeded(sent) => {
                self.outbox.on_send_complete();
                let reaction = self.link.on_send_succeeded();
                self.apply_reaction(reaction, now, sink);
                self.on_acknowledged(&sent, hw, sink);
            }
            Event::SendFailed(reason) => {
                debug!("StatusApp: send failed ({reason})");
                self.outbox.on_send_complete();
                if let Some((_, command)) = self.pending_request.take() {
                    debug!("StatusApp: {command:?} abandoned, screen switch failed");
                }
                let reaction = self.link.on_send_failed(reason);
                self.apply_reaction(reaction, now, sink);
            }
            Event::TimerFired(handle) => {
                if self.scheduler.take_if_current(handle) {
                    self.on_timer(handle.category, now, hw);
                }
            }
            Event::MinuteTick(local) => self.refresh_appointment(local, sink),
            Event::PeerConnection(present) => self.on_peer_connection(present, now, hw, sink),
            Event::WatchBattery(percent) => {
                self.display.watch_battery_percent = Some(percent);
                sink.emit(&AppEvent::FieldUpdated(Field::WatchBattery));
                if self.watch_battery.update(percent) {
                    sink.emit(&AppEvent::Vibrate(VibePattern::ShortPulse));
                }
            }
            Event::Button(button) => {
                self.send(button.command(), hw);
            }
        }

        let after = self.link.state();
        if after != before {
            info!("Link: {before} -> {after}");
            sink.emit(&AppEvent::LinkChanged {
                from: before,
                to: after,
            });
        }
    }

    /// Hand due timers to `delegate` (normally the event queue).
    pub fn poll_timers(&mut self, now_ms: u64, delegate: &mut dyn SchedulerDelegate) {
        self.scheduler.poll(now_ms, delegate);
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn display(&self) -> &DisplayCache {
        &self.display
    }

    pub fn link_state(&self) -> LinkState {
        self.link.state()
    }

    pub fn current_screen(&self) -> Option<ScreenId> {
        self.current_screen
    }

    pub fn is_sending(&self) -> bool {
        self.outbox.is_sending()
    }

    pub fn last_sequence(&self) -> u32 {
        self.outbox.last_sequence()
    }

    pub fn is_gps_update_pending(&self) -> bool {
        self.gps_update_pending
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }

    /// Earliest timer deadline, for a driver deciding how long to sleep.
    pub fn next_deadline(&self) -> Option<u64> {
        self.scheduler.next_deadline()
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn send(&mut self, command: Command, transport: &mut impl TransportPort) -> SendOutcome {
        let outcome = self.outbox.send(command, transport);
        if let SendOutcome::Dropped(reason) = outcome {
            debug!("StatusApp: {command:?} not sent ({reason:?})");
        }
        outcome
    }

    /// Send `command` once the phone is on `screen`.  If it is elsewhere,
    /// switch screens first and hold the command until that is
    /// acknowledged.
    fn request_on_screen(
        &mut self,
        screen: ScreenId,
        command: Command,
        transport: &mut impl TransportPort,
    ) {
        if self.current_screen == Some(screen) {
            self.send(command, transport);
        } else if self.send(Command::ScreenEnter(screen), transport).is_sent() {
            self.pending_request = Some((screen, command));
        }
    }

    fn on_timer(&mut self, category: Category, now: u64, transport: &mut impl TransportPort) {
        if self.outbox.is_sending() && !self.scheduler.is_deferred(category) {
            debug!("StatusApp: '{}' deferred, command in flight", category.label());
            self.scheduler
                .arm_after(category, self.config.busy_retry_ms, now);
            self.scheduler.set_deferred(category, true);
            return;
        }
        self.scheduler.set_deferred(category, false);

        match category {
            Category::Weather | Category::Forecast => {
                self.request_on_screen(
                    ScreenId::WeatherApp,
                    Command::RequestWeatherUpdate,
                    transport,
                );
            }
            Category::Calendar => {
                self.request_on_screen(
                    ScreenId::StatusScreen,
                    Command::RequestCalendarUpdate,
                    transport,
                );
            }
            Category::Music => {
                self.request_on_screen(
                    ScreenId::StatusScreen,
                    Command::RequestSongLength,
                    transport,
                );
            }
            Category::Gps => {
                if self
                    .send(Command::ScreenEnter(ScreenId::GpsApp), transport)
                    .is_sent()
                {
                    self.gps_update_pending = true;
                }
            }
            Category::Recovery => {
                info!("StatusApp: attempting link recovery");
                self.outbox.reset_sequence_number(transport);
                self.send(Command::ScreenEnter(ScreenId::StatusScreen), transport);
            }
        }

        if category.is_periodic() {
            self.scheduler.arm(category, now);
        }
    }

    fn on_message(
        &mut self,
        msg: &Dictionary,
        now: u64,
        local: LocalTime,
        sink: &mut impl EventSink,
    ) {
        let report = self
            .decoder
            .apply(msg, &mut self.display, &mut self.gps_update_pending);

        for field in &report.updated {
            sink.emit(&AppEvent::FieldUpdated(*field));
        }
        if let Some(pattern) = report.battery_alert {
            sink.emit(&AppEvent::Vibrate(pattern));
        }
        for &(category, interval_ms) in &report.intervals {
            if self.running {
                self.scheduler.reschedule(category, interval_ms, now);
            } else {
                self.scheduler.set_interval(category, interval_ms);
            }
        }
        if report.appointment_changed {
            self.refresh_appointment(local, sink);
        }
    }

    fn on_acknowledged(
        &mut self,
        sent: &Dictionary,
        transport: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) {
        let Some(raw) = sent.find_i32(keys::SCREEN_ENTER) else {
            return;
        };
        let Some(screen) = ScreenId::from_i32(raw) else {
            debug!("StatusApp: ack for unknown screen {raw}");
            return;
        };
        self.current_screen = Some(screen);
        sink.emit(&AppEvent::ScreenChanged(screen));

        match self.pending_request.take() {
            Some((target, command)) if target == screen => {
                self.send(command, transport);
            }
            Some((_, command)) => debug!("StatusApp: {command:?} dropped, screen changed"),
            None => {}
        }
    }

    fn on_peer_connection(
        &mut self,
        present: bool,
        now: u64,
        transport: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) {
        let reaction = self.link.on_peer_connection(present);
        self.apply_reaction(reaction, now, sink);

        if present {
            self.send(Command::ScreenEnter(ScreenId::StatusScreen), transport);
            if self.running {
                for category in Category::PERIODIC {
                    self.scheduler.ensure_armed(category, now);
                }
            }
        } else {
            self.scheduler.cancel_all();
            self.pending_request = None;
        }
    }

    fn apply_reaction(&mut self, reaction: LinkReaction, now: u64, sink: &mut impl EventSink) {
        if let Some(status) = reaction.status {
            self.display.status = status;
            sink.emit(&AppEvent::StatusText(status));
        }
        if let Some(pattern) = reaction.pulse {
            sink.emit(&AppEvent::Vibrate(pattern));
        }
        match reaction.recovery {
            RecoveryAction::Leave => {}
            RecoveryAction::Rearm => {
                self.scheduler.arm(Category::Recovery, now);
            }
            RecoveryAction::Cancel => self.scheduler.cancel(Category::Recovery),
        }
    }

    fn refresh_appointment(&mut self, local: LocalTime, sink: &mut impl EventSink) {
        let countdown = appointment::evaluate(&self.display.appointment_stamp, local);
        if countdown.text != self.display.appointment {
            self.display.appointment = countdown.text;
            sink.emit(&AppEvent::FieldUpdated(Field::Appointment));
        }
        if let Some(pattern) = countdown.alert {
            sink.emit(&AppEvent::Vibrate(pattern));
        }
    }
}
