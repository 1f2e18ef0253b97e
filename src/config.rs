//! Sync configuration parameters
//!
//! All tunable parameters of the watch-side sync core.  Defaults match the
//! intervals the watch uses until the phone supplies its own.  Values can be
//! overridden from a JSON file in the simulator or persisted as postcard
//! bytes.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Core sync configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    // --- Refresh intervals (milliseconds) ---
    /// Weather refresh until the phone sends an override.
    pub weather_interval_ms: u32,
    /// Calendar refresh until the phone sends an override.
    pub calendar_interval_ms: u32,
    /// Music (song length) refresh until the phone sends an override.
    pub music_interval_ms: u32,
    /// GPS refresh until the phone sends an override.
    pub gps_interval_ms: u32,
    /// Delay of the one-shot next-day forecast request after start.
    pub forecast_delay_ms: u32,

    // --- Recovery ---
    /// Fixed backoff between reconnection attempts.
    pub recovery_interval_ms: u32,
    /// Follow-up delay when a timer fires while a command is in flight.
    pub busy_retry_ms: u32,

    // --- Battery ---
    /// Percent below which the low-battery pulse fires.
    pub battery_low_percent: u8,
    /// Percent above which the low-battery flag clears.
    pub battery_clear_percent: u8,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            // Refresh
            weather_interval_ms: 60_000,
            calendar_interval_ms: 60_000,
            music_interval_ms: 5_000,
            gps_interval_ms: 60_000,
            forecast_delay_ms: 5_000,

            // Recovery
            recovery_interval_ms: 10_000,
            busy_retry_ms: 1_000,

            // Battery hysteresis
            battery_low_percent: 20,
            battery_clear_percent: 25,
        }
    }
}

impl SyncConfig {
    /// Reject values that would stall a timer or make the battery flag flap.
    pub fn validate(&self) -> Result<()> {
        let intervals = [
            self.weather_interval_ms,
            self.calendar_interval_ms,
            self.music_interval_ms,
            self.gps_interval_ms,
            self.forecast_delay_ms,
            self.recovery_interval_ms,
            self.busy_retry_ms,
        ];
        if intervals.contains(&0) {
            return Err(Error::Config("intervals must be non-zero"));
        }
        if self.battery_low_percent > self.battery_clear_percent {
            return Err(Error::Config("battery clear threshold below low threshold"));
        }
        if self.battery_clear_percent > 100 {
            return Err(Error::Config("battery threshold above 100%"));
        }
        Ok(())
    }

    /// Encode for persistent storage.
    pub fn to_bytes(&self) -> core::result::Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    /// Decode from persistent storage and validate.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let config: Self =
            postcard::from_bytes(bytes).map_err(|_| Error::Config("stored config corrupted"))?;
        config.validate()?;
        Ok(config)
    }
}
