//! SmartStatus watch sync core.
//!
//! Keeps a smartwatch status screen (weather, calendar, music, battery,
//! location) in sync with a paired phone over a lossy, turn-based key/value
//! channel.  Host independent: the watch runtime plugs in through the
//! traits in [`app::ports`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod appointment;
pub mod config;
pub mod decoder;
pub mod display;
pub mod events;
pub mod link;
pub mod protocol;
pub mod scheduler;

mod error;

pub use error::{AppointmentError, CodecError, Error, Result, TransportError};
