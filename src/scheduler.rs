//! Per-category refresh scheduler.
//!
//! One re-armable timer per data category.  The scheduler only tracks
//! deadlines on a monotonic millisecond clock; it notifies a
//! [`SchedulerDelegate`] when a timer comes due, and the driver turns that
//! into an [`Event::TimerFired`](crate::events::Event::TimerFired) on the
//! event queue.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Weather  Calendar  Music  Gps  Forecast  Recovery           │
//! │     │        │        │     │      │         │               │
//! │     ▼        ▼        ▼     ▼      ▼         ▼               │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │         poll(now) ──▶ SchedulerDelegate                │  │
//! │  │         (driver pushes TimerFired(handle))             │  │
//! │  └───────────────────────┬────────────────────────────────┘  │
//! │                          ▼                                   │
//! │           StatusApp.handle(TimerFired) ── take_if_current    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every arm or cancel bumps the timer's generation.  A fire notification
//! carries the generation it was issued under, so a notification that was
//! queued before a cancel or re-arm is recognised as stale and ignored.

use log::{debug, info, warn};

use crate::app::ports::SchedulerDelegate;
use crate::config::SyncConfig;

// ═══════════════════════════════════════════════════════════════
//  Categories
// ═══════════════════════════════════════════════════════════════

/// An independent refresh / retry lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Weather,
    Calendar,
    Music,
    Gps,
    /// Next-day forecast, one-shot after start.
    Forecast,
    /// Connection recovery after a send failure or drop.
    Recovery,
}

impl Category {
    pub const COUNT: usize = 6;

    pub const ALL: [Category; Self::COUNT] = [
        Self::Weather,
        Self::Calendar,
        Self::Music,
        Self::Gps,
        Self::Forecast,
        Self::Recovery,
    ];

    /// Categories that are re-armed after every fire and on reconnect.
    pub const PERIODIC: [Category; 4] = [Self::Weather, Self::Calendar, Self::Music, Self::Gps];

    const fn index(self) -> usize {
        self as usize
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Calendar => "calendar",
            Self::Music => "music",
            Self::Gps => "gps",
            Self::Forecast => "forecast",
            Self::Recovery => "recovery",
        }
    }

    pub const fn is_periodic(self) -> bool {
        !matches!(self, Self::Forecast)
    }
}

/// Identity of one armed timer instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    pub category: Category,
    generation: u32,
}

// ═══════════════════════════════════════════════════════════════
//  Timer bookkeeping
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    Idle,
    Armed { deadline_ms: u64 },
    /// Reported to the delegate, waiting for the handler to take it.
    Fired,
}

#[derive(Debug, Clone, Copy)]
struct RefreshTimer {
    interval_ms: u32,
    state: TimerState,
    generation: u32,
    /// Already pushed back once because a command was in flight.
    deferred: bool,
}

impl RefreshTimer {
    const fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            state: TimerState::Idle,
            generation: 0,
            deferred: false,
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// The refresh scheduler.
pub struct RefreshScheduler {
    timers: [RefreshTimer; Category::COUNT],
}

impl RefreshScheduler {
    /// Intervals start at the configured defaults; nothing is armed.
    pub fn new(config: &SyncConfig) -> Self {
        let mut timers = [RefreshTimer::new(0); Category::COUNT];
        for category in Category::ALL {
            timers[category.index()].interval_ms = match category {
                Category::Weather => config.weather_interval_ms,
                Category::Calendar => config.calendar_interval_ms,
                Category::Music => config.music_interval_ms,
                Category::Gps => config.gps_interval_ms,
                Category::Forecast => config.forecast_delay_ms,
                Category::Recovery => config.recovery_interval_ms,
            };
        }
        Self { timers }
    }

    /// Cancel any live timer for `category` and arm a fresh one for its
    /// current interval.
    pub fn arm(&mut self, category: Category, now_ms: u64) -> TimerHandle {
        let interval = self.timers[category.index()].interval_ms;
        self.arm_after(category, interval, now_ms)
    }

    /// Cancel any live timer for `category` and arm one `delay_ms` from now.
    /// The category's interval is left unchanged and the deferral flag is
    /// cleared.
    pub fn arm_after(&mut self, category: Category, delay_ms: u32, now_ms: u64) -> TimerHandle {
        let timer = &mut self.timers[category.index()];
        timer.generation = timer.generation.wrapping_add(1);
        timer.deferred = false;
        timer.state = TimerState::Armed {
            deadline_ms: now_ms + u64::from(delay_ms),
        };
        debug!("Scheduler: '{}' armed for {}ms", category.label(), delay_ms);
        TimerHandle {
            category,
            generation: timer.generation,
        }
    }

    /// Arm only if nothing is live for `category`.
    pub fn ensure_armed(&mut self, category: Category, now_ms: u64) -> Option<TimerHandle> {
        if self.is_active(category) {
            None
        } else {
            Some(self.arm(category, now_ms))
        }
    }

    /// Replace the interval and re-arm, so the next fire is `interval_ms`
    /// from now rather than from the old schedule.
    pub fn reschedule(&mut self, category: Category, interval_ms: u32, now_ms: u64) -> TimerHandle {
        self.set_interval(category, interval_ms);
        info!(
            "Scheduler: '{}' interval now {}ms",
            category.label(),
            interval_ms
        );
        self.arm(category, now_ms)
    }

    /// Change the interval used by the next arm, without touching a live timer.
    pub fn set_interval(&mut self, category: Category, interval_ms: u32) {
        self.timers[category.index()].interval_ms = interval_ms;
    }

    /// Cancel the timer for `category`.  Cancelling an idle timer is a no-op.
    pub fn cancel(&mut self, category: Category) {
        let timer = &mut self.timers[category.index()];
        timer.deferred = false;
        if timer.state != TimerState::Idle {
            timer.state = TimerState::Idle;
            timer.generation = timer.generation.wrapping_add(1);
            debug!("Scheduler: '{}' cancelled", category.label());
        }
    }

    pub fn cancel_all(&mut self) {
        for category in Category::ALL {
            self.cancel(category);
        }
    }

    /// Report every timer whose deadline has passed, earliest first, ties in
    /// category order.  A timer the delegate refuses stays armed and is
    /// reported again on the next poll.  Accepted timers stay owned by the
    /// scheduler until [`take_if_current`](Self::take_if_current) claims them.
    pub fn poll(&mut self, now_ms: u64, delegate: &mut dyn SchedulerDelegate) {
        let mut due: heapless::Vec<(u64, TimerHandle), { Category::COUNT }> = heapless::Vec::new();

        for category in Category::ALL {
            let timer = &self.timers[category.index()];
            if let TimerState::Armed { deadline_ms } = timer.state {
                if deadline_ms <= now_ms {
                    // Capacity equals the number of categories.
                    let _ = due.push((
                        deadline_ms,
                        TimerHandle {
                            category,
                            generation: timer.generation,
                        },
                    ));
                }
            }
        }

        due.sort_by_key(|(deadline, _)| *deadline);
        for (_, handle) in due {
            debug!("Scheduler: '{}' due", handle.category.label());
            if delegate.on_timer_fired(handle) {
                self.timers[handle.category.index()].state = TimerState::Fired;
            } else {
                warn!(
                    "Scheduler: '{}' fire not accepted, retrying next poll",
                    handle.category.label()
                );
            }
        }
    }

    /// Claim a fired timer.  Returns `false` for stale handles (cancelled or
    /// re-armed since the notification was issued).  Accepts an armed timer
    /// too, so a host that runs its own timers can deliver fires directly.
    pub fn take_if_current(&mut self, handle: TimerHandle) -> bool {
        let timer = &mut self.timers[handle.category.index()];
        if timer.generation != handle.generation || timer.state == TimerState::Idle {
            debug!("Scheduler: stale '{}' fire ignored", handle.category.label());
            return false;
        }
        timer.state = TimerState::Idle;
        true
    }

    /// Earliest pending deadline, for a driver deciding how long to sleep.
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers
            .iter()
            .filter_map(|t| match t.state {
                TimerState::Armed { deadline_ms } => Some(deadline_ms),
                _ => None,
            })
            .min()
    }

    pub fn deadline(&self, category: Category) -> Option<u64> {
        match self.timers[category.index()].state {
            TimerState::Armed { deadline_ms } => Some(deadline_ms),
            _ => None,
        }
    }

    pub fn interval_ms(&self, category: Category) -> u32 {
        self.timers[category.index()].interval_ms
    }

    /// Armed, or fired and not yet handled.
    pub fn is_active(&self, category: Category) -> bool {
        self.timers[category.index()].state != TimerState::Idle
    }

    pub fn is_deferred(&self, category: Category) -> bool {
        self.timers[category.index()].deferred
    }

    pub fn set_deferred(&mut self, category: Category, deferred: bool) {
        self.timers[category.index()].deferred = deferred;
    }

    /// Number of live timers.
    pub fn active_count(&self) -> usize {
        Category::ALL.iter().filter(|c| self.is_active(**c)).count()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
