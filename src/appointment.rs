//! Appointment countdown.
//!
//! The phone sends the next appointment as `MM/DD HH:MM Title`.  When the
//! date is today the status screen shows how far away it is ("In 15 min",
//! "In 1h 5m") or how long ago it started ("10 min in"); otherwise it shows
//! the raw stamp.  Two haptic cues ride along: a short pulse fifteen minutes
//! ahead and a double pulse at the start time.

use core::fmt::Write;

use heapless::String;

use crate::app::events::VibePattern;
use crate::display::{bounded_copy, COUNTDOWN_CAP};
use crate::error::AppointmentError;

/// Minutes ahead of an appointment at which the early reminder fires.
pub const REMINDER_LEAD_MINUTES: u16 = 15;

/// Offset of `HH:MM` inside `MM/DD HH:MM`.
const TIME_OFFSET: usize = 6;

/// Local wall-clock time as delivered by the minute tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocalTime {
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
}

impl LocalTime {
    pub const fn new(month: u8, day: u8, hour: u8, minute: u8) -> Self {
        Self {
            month,
            day,
            hour,
            minute,
        }
    }

    pub fn minutes_of_day(self) -> u16 {
        u16::from(self.hour) * 60 + u16::from(self.minute)
    }

    /// `MM/DD`, zero padded.
    fn date_prefix(self) -> String<5> {
        let mut s = String::new();
        let _ = write!(s, "{:02}/{:02}", self.month, self.day);
        s
    }
}

/// How the appointment relates to now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownKind {
    /// Not today, or no stamp: raw stamp shown.
    OtherDay,
    /// Today, but the time did not parse: raw stamp shown.
    Unparsed(AppointmentError),
    /// Started this many minutes ago.
    Started(u16),
    /// Starts in this many minutes.
    Upcoming(u16),
    Now,
}

/// Result of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    pub kind: CountdownKind,
    pub text: String<COUNTDOWN_CAP>,
    pub alert: Option<VibePattern>,
}

/// Parse `H:MM` or `HH:MM` (trailing text ignored) into minutes since midnight.
pub fn parse_time_of_day(s: &str) -> Result<u16, AppointmentError> {
    let b = s.as_bytes();
    if b.len() < 4 {
        return Err(AppointmentError::TooShort);
    }
    let hour_digits = if b[1] == b':' { 1 } else { 2 };
    if b.get(hour_digits) != Some(&b':') {
        return Err(AppointmentError::MissingSeparator);
    }
    let minute = b
        .get(hour_digits + 1..hour_digits + 3)
        .ok_or(AppointmentError::TooShort)?;

    let hour = digits(&b[..hour_digits])?;
    let minute = digits(minute)?;
    if hour >= 24 || minute >= 60 {
        return Err(AppointmentError::OutOfRange);
    }
    Ok(hour * 60 + minute)
}

fn digits(b: &[u8]) -> Result<u16, AppointmentError> {
    b.iter().try_fold(0u16, |acc, &c| {
        if c.is_ascii_digit() {
            Ok(acc * 10 + u16::from(c - b'0'))
        } else {
            Err(AppointmentError::InvalidDigit)
        }
    })
}

/// Evaluate the appointment `stamp` against `now`.
pub fn evaluate(stamp: &str, now: LocalTime) -> Countdown {
    let raw = |kind| Countdown {
        kind,
        text: bounded_copy(stamp),
        alert: None,
    };

    if stamp.get(..5) != Some(now.date_prefix().as_str()) {
        return raw(CountdownKind::OtherDay);
    }

    let appt = match stamp
        .get(TIME_OFFSET..)
        .ok_or(AppointmentError::TooShort)
        .and_then(parse_time_of_day)
    {
        Ok(m) => m,
        Err(e) => return raw(CountdownKind::Unparsed(e)),
    };
    let current = now.minutes_of_day();

    let mut text = String::new();
    let (kind, alert) = if appt < current {
        let ago = current - appt;
        if ago >= 60 {
            let _ = write!(text, "In {}h {}m", ago / 60, ago % 60);
        } else {
            let _ = write!(text, "{ago} min in");
        }
        (CountdownKind::Started(ago), None)
    } else if appt > current {
        let ahead = appt - current;
        if ahead >= 60 {
            let _ = write!(text, "In {}h {}m", ahead / 60, ahead % 60);
        } else {
            let _ = write!(text, "In {ahead} min");
        }
        let alert = (ahead == REMINDER_LEAD_MINUTES).then_some(VibePattern::ShortPulse);
        (CountdownKind::Upcoming(ahead), alert)
    } else {
        let _ = text.push_str("Now!");
        (CountdownKind::Now, Some(VibePattern::DoublePulse))
    };

    Countdown { kind, text, alert }
}
