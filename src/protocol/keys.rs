//! Numeric message keys and screen identifiers shared with the phone app.
//!
//! These values are the wire contract with the phone-side application and
//! must not change.  The weather, calendar and song keys are used in both
//! directions: watch to phone they request an update, phone to watch they
//! carry the new refresh interval in seconds.

/// A numeric dictionary key.
pub type Key = u32;

// ── Framing ───────────────────────────────────────────────────

/// Sequence number tuple written first into every outbound message.
pub const SEQUENCE_NUMBER: Key = 0xFC00;

// ── Watch → phone commands ────────────────────────────────────

/// Peer should switch to the given screen context (`i8` screen id).
pub const SCREEN_ENTER: Key = 0xFC01;
/// Peer should leave the given screen context (`i8` screen id).
pub const SCREEN_EXIT: Key = 0xFC02;
pub const VOLUME_UP: Key = 0xFC05;
pub const VOLUME_DOWN: Key = 0xFC06;
pub const PLAY_PAUSE: Key = 0xFC07;
pub const FIND_PHONE: Key = 0xFC0B;

// ── Bidirectional: request (out) / refresh interval seconds (in) ──

pub const STATUS_UPDATE_WEATHER: Key = 0xFC10;
pub const STATUS_UPDATE_CALENDAR: Key = 0xFC11;
pub const SONG_LENGTH: Key = 0xFC12;

// ── Phone → watch fields ──────────────────────────────────────

pub const BATTERY_PERCENT: Key = 0xFC20;
pub const WEATHER_TEMP: Key = 0xFC21;
pub const WEATHER_ICON: Key = 0xFC22;
pub const WEATHER_ICON_TOMORROW: Key = 0xFC23;
pub const WEATHER_DAY1: Key = 0xFC24;
pub const UPDATE_INTERVAL: Key = 0xFC25;
pub const GPS_LOCATION: Key = 0xFC26;
pub const CALENDAR_DATE_TIME: Key = 0xFC27;
pub const CALENDAR_TEXT: Key = 0xFC28;
pub const MUSIC_ARTIST: Key = 0xFC29;
pub const MUSIC_TITLE: Key = 0xFC2A;

/// Logical screen context on the phone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum ScreenId {
    StatusScreen = 0,
    WeatherApp = 1,
    GpsApp = 2,
}

impl ScreenId {
    /// Map a wire value back to a screen.  Unknown values yield `None`.
    pub fn from_i32(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::StatusScreen),
            1 => Some(Self::WeatherApp),
            2 => Some(Self::GpsApp),
            _ => None,
        }
    }

    pub const fn as_i8(self) -> i8 {
        self as i8
    }
}

/// Every command the watch can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ScreenEnter(ScreenId),
    ScreenExit(ScreenId),
    PlayPause,
    FindPhone,
    VolumeUp,
    VolumeDown,
    RequestWeatherUpdate,
    RequestCalendarUpdate,
    RequestSongLength,
}

impl Command {
    /// The dictionary key this command is written under.
    pub const fn key(self) -> Key {
        match self {
            Self::ScreenEnter(_) => SCREEN_ENTER,
            Self::ScreenExit(_) => SCREEN_EXIT,
            Self::PlayPause => PLAY_PAUSE,
            Self::FindPhone => FIND_PHONE,
            Self::VolumeUp => VOLUME_UP,
            Self::VolumeDown => VOLUME_DOWN,
            Self::RequestWeatherUpdate => STATUS_UPDATE_WEATHER,
            Self::RequestCalendarUpdate => STATUS_UPDATE_CALENDAR,
            Self::RequestSongLength => SONG_LENGTH,
        }
    }

    /// The `i8` parameter, if the command carries one.
    pub const fn param(self) -> Option<i8> {
        match self {
            Self::ScreenEnter(screen) | Self::ScreenExit(screen) => Some(screen.as_i8()),
            _ => None,
        }
    }
}
