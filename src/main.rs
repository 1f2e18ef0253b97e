//! SmartStatus host simulator.
//!
//! Runs the sync core against a scripted in-memory phone on a virtual
//! clock and logs everything the watch would show.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SimPhone (TransportPort + ClockPort)    LogEventSink          │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              StatusApp (pure logic)                    │    │
//! │  │  Outbox · RefreshScheduler · LinkMonitor · Decoder     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  EventQueue (scheduler delegate + driver FIFO)                 │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `smartstatus [minutes] [config.json]`

use std::env;
use std::fs;

use anyhow::{Context, Result};
use log::{info, warn};

use smartstatus::adapters::log_sink::LogEventSink;
use smartstatus::adapters::sim_phone::SimPhone;
use smartstatus::app::events::AppEvent;
use smartstatus::app::ports::{ClockPort, EventSink};
use smartstatus::app::service::StatusApp;
use smartstatus::appointment::LocalTime;
use smartstatus::config::SyncConfig;
use smartstatus::display::Field;
use smartstatus::events::{Event, EventQueue};
use smartstatus::TransportError;

/// Simulation step.
const STEP_MS: u64 = 1_000;
/// Bluetooth drops out for one minute every this many minutes.
const OUTAGE_EVERY_MIN: u64 = 7;

// ── Sink that remembers which fields to render ────────────────

struct SimSink {
    log: LogEventSink,
    dirty: Vec<Field>,
}

impl EventSink for SimSink {
    fn emit(&mut self, event: &AppEvent) {
        self.log.emit(event);
        if let AppEvent::FieldUpdated(field) = event {
            self.dirty.push(*field);
        }
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = env::args().skip(1);
    let minutes: u64 = match args.next() {
        Some(m) => m.parse().context("minutes must be a number")?,
        None => 20,
    };
    let config = match args.next() {
        Some(path) => load_config(&path)?,
        None => SyncConfig::default(),
    };
    config.validate()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  SmartStatus sim v{}              ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let mut phone = SimPhone::new(LocalTime::new(12, 25, 14, 0));
    let mut app = StatusApp::new(config);
    let mut queue = EventQueue::new();
    let mut sink = SimSink {
        log: LogEventSink::new(),
        dirty: Vec::new(),
    };

    app.start(&mut phone, &mut sink);
    queue.push(Event::WatchBattery(80));

    let end_ms = minutes * 60_000;
    while phone.uptime_ms() < end_ms {
        phone.advance(STEP_MS);
        let now = phone.uptime_ms();

        if now % 60_000 == 0 {
            let minute = now / 60_000;
            queue.push(Event::MinuteTick(phone.local_time()));
            if minute % OUTAGE_EVERY_MIN == 0 {
                warn!("Sim: bluetooth lost");
                phone.set_peer(false);
                queue.push(Event::PeerConnection(false));
            } else if minute % OUTAGE_EVERY_MIN == 1 && minute > 1 {
                info!("Sim: bluetooth back");
                phone.set_peer(true);
                queue.push(Event::PeerConnection(true));
            }
            if minute == 3 {
                phone.fail_next(TransportError::SendTimeout);
            }
        }

        app.poll_timers(now, &mut queue);
        phone.deliver(&mut queue);

        while let Some(event) = queue.pop() {
            app.handle(event, &mut phone, &mut sink);
        }
        for field in sink.dirty.drain(..) {
            LogEventSink::render(field, app.display());
        }
    }

    app.stop(&mut phone, &mut sink);
    info!(
        "Sim done: {} messages sent, last seq {}, {} events, link {}",
        phone.sent_count(),
        app.last_sequence(),
        sink.log.count(),
        app.link_state()
    );
    Ok(())
}

fn load_config(path: &str) -> Result<SyncConfig> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let config: SyncConfig =
        serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?;
    info!("Config loaded from {path}");
    Ok(config)
}
