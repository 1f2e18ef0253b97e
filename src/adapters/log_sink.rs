//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing every application event to the
//! `log` facade.  On the watch the presentation layer implements the same
//! trait and redraws instead; in the simulator this is the whole UI.

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::display::{DisplayCache, Field};

/// Adapter that logs every [`AppEvent`].  [`render`](Self::render) prints a
/// field's current value for drivers that track which fields changed.
#[derive(Default)]
pub struct LogEventSink {
    events: u64,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events emitted so far.
    pub fn count(&self) -> u64 {
        self.events
    }

    /// Log the current value of `field`.
    pub fn render(field: Field, display: &DisplayCache) {
        match field {
            Field::PhoneBattery => info!("FIELD | phone battery {:?}%", display.phone_battery_percent),
            Field::WatchBattery => info!("FIELD | watch battery {:?}%", display.watch_battery_percent),
            Field::WeatherTemp => info!("FIELD | temp '{}'", display.weather_temp),
            Field::WeatherIcon => info!("FIELD | icon {:?}", display.weather_icon),
            Field::TomorrowIcon => info!("FIELD | tomorrow icon {:?}", display.tomorrow_icon),
            Field::TomorrowTemp => info!("FIELD | tomorrow '{}'", display.tomorrow_temp),
            Field::Location => info!("FIELD | location '{}'", display.location),
            Field::CalendarDate => info!("FIELD | calendar '{}'", display.calendar_date),
            Field::CalendarTitle => info!(
                "FIELD | title '{}' ({:?})",
                display.calendar_title, display.calendar_font
            ),
            Field::Appointment => info!("FIELD | appointment '{}'", display.appointment),
            Field::MusicArtist => info!("FIELD | artist '{}'", display.music_artist),
            Field::MusicTitle => info!("FIELD | title '{}'", display.music_title),
        }
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events += 1;
        match event {
            AppEvent::Started => info!("START | status screen"),
            AppEvent::Stopped => info!("STOP  | status screen"),
            AppEvent::StatusText(text) => info!("STATUS| '{}'", text),
            AppEvent::Vibrate(pattern) => info!("VIBE  | {:?}", pattern),
            AppEvent::FieldUpdated(field) => info!("FIELD | {:?} changed", field),
            AppEvent::LinkChanged { from, to } => info!("LINK  | {} -> {}", from, to),
            AppEvent::ScreenChanged(screen) => info!("SCREEN| {:?}", screen),
        }
    }
}
