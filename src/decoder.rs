//! Inbound update decoder.
//!
//! Applies one phone message to the [`DisplayCache`].  Each known key that
//! is present causes exactly one update; absent keys leave their field
//! alone.  Interval keys are not applied here: they come back in the
//! [`DecodeReport`] so the service can reschedule the matching timer.

use log::{debug, warn};

use crate::app::events::VibePattern;
use crate::display::{
    bounded_copy, BatteryMonitor, DisplayCache, Field, FontTier, WeatherIcon,
    APPOINTMENT_STAMP_LEN,
};
use crate::protocol::keys::{self, Key};
use crate::protocol::Dictionary;
use crate::scheduler::Category;

/// Byte offset of the temperature inside the next-day forecast string.
pub const WEATHER_DAY1_TEMP_OFFSET: usize = 6;

/// Most fields one message can touch.
const MAX_FIELDS: usize = 12;

/// What a message changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeReport {
    pub updated: heapless::Vec<Field, MAX_FIELDS>,
    /// Validated interval overrides in milliseconds, one per category at most.
    pub intervals: heapless::Vec<(Category, u32), 4>,
    /// Phone battery crossed into low.
    pub battery_alert: Option<VibePattern>,
    /// The appointment stamp changed; the countdown needs recomputing.
    pub appointment_changed: bool,
}

impl DecodeReport {
    fn touched(&mut self, field: Field) {
        // One entry per key, and there are fewer keys than slots.
        let _ = self.updated.push(field);
    }

    pub fn interval(&self, category: Category) -> Option<u32> {
        self.intervals
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, ms)| *ms)
    }
}

/// Stateful decoder: owns the phone battery hysteresis.
#[derive(Debug, Clone)]
pub struct InboundDecoder {
    phone_battery: BatteryMonitor,
}

impl InboundDecoder {
    pub fn new(phone_battery: BatteryMonitor) -> Self {
        Self { phone_battery }
    }

    /// Apply `msg` to `cache`.
    ///
    /// `gps_update_pending` gates the GPS interval key: it is only honoured
    /// right after the watch asked for a GPS update, and honouring it clears
    /// the flag.
    pub fn apply(
        &mut self,
        msg: &Dictionary,
        cache: &mut DisplayCache,
        gps_update_pending: &mut bool,
    ) -> DecodeReport {
        let mut report = DecodeReport::default();

        if let Some(value) = msg.find(keys::BATTERY_PERCENT) {
            match value.as_u8() {
                Some(percent) => {
                    cache.phone_battery_percent = Some(percent);
                    if self.phone_battery.update(percent) {
                        report.battery_alert = Some(VibePattern::ShortPulse);
                    }
                    report.touched(Field::PhoneBattery);
                }
                None => warn!("Decoder: battery value {value:?} not a percentage"),
            }
        }

        if let Some(s) = msg.find_str(keys::WEATHER_TEMP) {
            cache.weather_temp = bounded_copy(s);
            report.touched(Field::WeatherTemp);
        }

        if let Some(icon) = icon_for(msg, keys::WEATHER_ICON) {
            cache.weather_icon = Some(icon);
            report.touched(Field::WeatherIcon);
        }

        if let Some(icon) = icon_for(msg, keys::WEATHER_ICON_TOMORROW) {
            cache.tomorrow_icon = Some(icon);
            report.touched(Field::TomorrowIcon);
        }

        if let Some(s) = msg.find_str(keys::WEATHER_DAY1) {
            cache.tomorrow_temp = s
                .get(WEATHER_DAY1_TEMP_OFFSET..)
                .map(bounded_copy)
                .unwrap_or_default();
            report.touched(Field::TomorrowTemp);
        }

        if let Some(raw) = msg.find_i32(keys::UPDATE_INTERVAL) {
            if *gps_update_pending {
                if let Some(ms) = interval_ms(keys::UPDATE_INTERVAL, raw) {
                    *gps_update_pending = false;
                    let _ = report.intervals.push((Category::Gps, ms));
                }
            } else {
                debug!("Decoder: GPS interval {raw}s ignored, no update pending");
            }
        }

        if let Some(s) = msg.find_str(keys::GPS_LOCATION) {
            cache.location = bounded_copy(s);
            report.touched(Field::Location);
        }

        if let Some(s) = msg.find_str(keys::CALENDAR_DATE_TIME) {
            cache.calendar_date = bounded_copy(s);
            cache.appointment_stamp = bounded_copy::<APPOINTMENT_STAMP_LEN>(s);
            report.appointment_changed = true;
            report.touched(Field::CalendarDate);
        }

        if let Some(s) = msg.find_str(keys::CALENDAR_TEXT) {
            cache.calendar_title = bounded_copy(s);
            cache.calendar_font = FontTier::for_title(&cache.calendar_title);
            report.touched(Field::CalendarTitle);
        }

        if let Some(s) = msg.find_str(keys::MUSIC_ARTIST) {
            cache.music_artist = bounded_copy(s);
            report.touched(Field::MusicArtist);
        }

        if let Some(s) = msg.find_str(keys::MUSIC_TITLE) {
            cache.music_title = bounded_copy(s);
            report.touched(Field::MusicTitle);
        }

        for (key, category) in [
            (keys::STATUS_UPDATE_WEATHER, Category::Weather),
            (keys::STATUS_UPDATE_CALENDAR, Category::Calendar),
            (keys::SONG_LENGTH, Category::Music),
        ] {
            if let Some(ms) = msg.find_i32(key).and_then(|raw| interval_ms(key, raw)) {
                let _ = report.intervals.push((category, ms));
            }
        }

        report
    }
}

fn icon_for(msg: &Dictionary, key: Key) -> Option<WeatherIcon> {
    let value = msg.find(key)?;
    let icon = value.as_u8().and_then(WeatherIcon::from_index);
    if icon.is_none() {
        warn!("Decoder: icon index {value:?} out of range for key 0x{key:04X}");
    }
    icon
}

/// Seconds from the phone to a timer interval.  Non-positive values are
/// rejected.
fn interval_ms(key: Key, seconds: i32) -> Option<u32> {
    let ms = u32::try_from(seconds)
        .ok()
        .filter(|s| *s > 0)
        .map(|s| s.saturating_mul(1000));
    if ms.is_none() {
        warn!("Decoder: rejected interval {seconds}s for key 0x{key:04X}");
    }
    ms
}
