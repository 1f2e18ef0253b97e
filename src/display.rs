//! Cached display fields.
//!
//! The decoder writes these, the presentation layer reads them.  Every text
//! field is a fixed-capacity string sized like the watch's C buffers minus
//! the terminator, and every write goes through [`bounded_copy`], which
//! truncates instead of overflowing.

use heapless::String;

use crate::config::SyncConfig;

/// Capacity of the general-purpose text fields (255-byte buffers).
pub const TEXT_CAP: usize = 254;

/// Capacity of the temperature fields (5-byte buffers).
pub const TEMP_CAP: usize = 4;

/// Capacity of the appointment countdown (20-byte buffer).
pub const COUNTDOWN_CAP: usize = 19;

/// Bytes of the calendar string kept as the appointment stamp (`MM/DD HH:MM`).
pub const APPOINTMENT_STAMP_LEN: usize = 11;

/// Shown until the first location update arrives.
pub const LOCATION_PLACEHOLDER: &str = "Location not updated";

pub type Text = String<TEXT_CAP>;

/// Copy at most `N` bytes of `src`, cutting at a UTF-8 character boundary.
pub fn bounded_copy<const N: usize>(src: &str) -> String<N> {
    let mut end = src.len().min(N);
    while !src.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = String::new();
    // `end <= N`, so this cannot fail.
    let _ = out.push_str(&src[..end]);
    out
}

// ---------------------------------------------------------------------------
// Weather icons
// ---------------------------------------------------------------------------

/// Small weather icon table, in the phone's index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WeatherIcon {
    Sun = 0,
    Rain = 1,
    Cloud = 2,
    SunCloud = 3,
    Fog = 4,
    Wind = 5,
    Snow = 6,
    Thunder = 7,
}

impl WeatherIcon {
    pub const COUNT: usize = 8;

    /// Out-of-range indices yield `None` rather than reading past the table.
    pub fn from_index(idx: u8) -> Option<Self> {
        match idx {
            0 => Some(Self::Sun),
            1 => Some(Self::Rain),
            2 => Some(Self::Cloud),
            3 => Some(Self::SunCloud),
            4 => Some(Self::Fog),
            5 => Some(Self::Wind),
            6 => Some(Self::Snow),
            7 => Some(Self::Thunder),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Calendar title font
// ---------------------------------------------------------------------------

/// Font size tier for the calendar title, chosen by byte length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontTier {
    /// Up to 15 bytes.
    #[default]
    Large,
    /// 16 to 18 bytes.
    Medium,
    /// Anything longer.
    Small,
}

impl FontTier {
    pub fn for_title(title: &str) -> Self {
        match title.len() {
            0..=15 => Self::Large,
            16..=18 => Self::Medium,
            _ => Self::Small,
        }
    }
}

// ---------------------------------------------------------------------------
// Field identities (for change notifications)
// ---------------------------------------------------------------------------

/// Names a cached field in [`AppEvent::FieldUpdated`](crate::app::events::AppEvent).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    PhoneBattery,
    WatchBattery,
    WeatherTemp,
    WeatherIcon,
    TomorrowIcon,
    TomorrowTemp,
    Location,
    CalendarDate,
    CalendarTitle,
    Appointment,
    MusicArtist,
    MusicTitle,
}

// ---------------------------------------------------------------------------
// DisplayCache
// ---------------------------------------------------------------------------

/// Everything the status screen shows that comes from the phone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayCache {
    pub phone_battery_percent: Option<u8>,
    pub watch_battery_percent: Option<u8>,
    pub weather_temp: String<TEMP_CAP>,
    pub weather_icon: Option<WeatherIcon>,
    pub tomorrow_icon: Option<WeatherIcon>,
    pub tomorrow_temp: String<TEMP_CAP>,
    pub location: Text,
    /// Full calendar date string as received.
    pub calendar_date: Text,
    /// `MM/DD HH:MM` prefix of `calendar_date`.
    pub appointment_stamp: String<APPOINTMENT_STAMP_LEN>,
    /// Derived countdown text, recomputed every minute.
    pub appointment: String<COUNTDOWN_CAP>,
    pub calendar_title: Text,
    pub calendar_font: FontTier,
    pub music_artist: Text,
    pub music_title: Text,
    /// Short status code ("Ok", "T.Out", ...); empty when nothing to say.
    pub status: &'static str,
}

impl Default for DisplayCache {
    fn default() -> Self {
        Self {
            phone_battery_percent: None,
            watch_battery_percent: None,
            weather_temp: String::new(),
            weather_icon: None,
            tomorrow_icon: None,
            tomorrow_temp: String::new(),
            location: bounded_copy(LOCATION_PLACEHOLDER),
            calendar_date: String::new(),
            appointment_stamp: String::new(),
            appointment: String::new(),
            calendar_title: String::new(),
            calendar_font: FontTier::Large,
            music_artist: String::new(),
            music_title: String::new(),
            status: "",
        }
    }
}

// ---------------------------------------------------------------------------
// Battery hysteresis
// ---------------------------------------------------------------------------

/// Low-battery latch with hysteresis.  Trips once when the level falls
/// below `low_below` and re-arms only after it climbs above `clear_above`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryMonitor {
    low: bool,
    low_below: u8,
    clear_above: u8,
}

impl BatteryMonitor {
    pub const fn new(low_below: u8, clear_above: u8) -> Self {
        Self {
            low: false,
            low_below,
            clear_above,
        }
    }

    pub const fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.battery_low_percent, config.battery_clear_percent)
    }

    /// Feed a new reading.  Returns `true` exactly when the latch trips,
    /// which is when the caller should pulse.
    pub fn update(&mut self, percent: u8) -> bool {
        if self.low && percent > self.clear_above {
            self.low = false;
        }
        if !self.low && percent < self.low_below {
            self.low = true;
            return true;
        }
        false
    }

    pub const fn is_low(&self) -> bool {
        self.low
    }
}
