//! Simulated phone.
//!
//! An in-memory [`TransportPort`] + [`ClockPort`] for running the sync
//! core on a host.  Every message crosses the simulated link as encoded
//! bytes, so the codec is exercised in both directions.  The phone answers
//! requests with canned data and acknowledges each send on the next
//! [`deliver`](SimPhone::deliver).
//!
//! Time is virtual: the driver advances it with [`advance`](SimPhone::advance).
//! The wall clock only moves within one day.

use std::collections::VecDeque;

use log::{debug, warn};

use crate::app::ports::{ClockPort, TransportPort};
use crate::appointment::LocalTime;
use crate::error::{CodecError, TransportError};
use crate::events::{Event, EventQueue};
use crate::protocol::codec::{self, MAX_MESSAGE_SIZE};
use crate::protocol::keys;
use crate::protocol::{Dictionary, ScreenId};

const MINUTES_PER_DAY: u64 = 24 * 60;

/// Scripted phone endpoint.
pub struct SimPhone {
    peer: bool,
    now_ms: u64,
    start: LocalTime,
    /// Wire bytes of the message awaiting acknowledgement.
    in_flight: Option<Vec<u8>>,
    fail_next: Option<TransportError>,
    replies: VecDeque<Vec<u8>>,
    screen: Option<ScreenId>,
    sent: u64,
    /// Refresh interval the phone hands out for weather, in seconds.
    pub weather_interval_s: i32,
    /// GPS interval the phone hands out, in seconds.
    pub gps_interval_s: i32,
}

impl SimPhone {
    /// A connected phone whose wall clock reads `start` at uptime zero.
    pub fn new(start: LocalTime) -> Self {
        Self {
            peer: true,
            now_ms: 0,
            start,
            in_flight: None,
            fail_next: None,
            replies: VecDeque::new(),
            screen: None,
            sent: 0,
            weather_interval_s: 30,
            gps_interval_s: 120,
        }
    }

    pub fn advance(&mut self, ms: u64) {
        self.now_ms += ms;
    }

    pub fn set_peer(&mut self, present: bool) {
        self.peer = present;
    }

    /// Make the next acknowledgement a failure instead.
    pub fn fail_next(&mut self, reason: TransportError) {
        self.fail_next = Some(reason);
    }

    /// Messages accepted so far.
    pub fn sent_count(&self) -> u64 {
        self.sent
    }

    /// Screen the phone is currently serving.
    pub fn screen(&self) -> Option<ScreenId> {
        self.screen
    }

    /// Push the outcome of the in-flight send, then every queued reply.
    pub fn deliver(&mut self, queue: &mut EventQueue) {
        if let Some(bytes) = self.in_flight.take() {
            let event = match (self.fail_next.take(), codec::decode(&bytes)) {
                (Some(reason), _) => Event::SendFailed(reason),
                (None, Ok(sent)) => {
                    self.respond(&sent);
                    Event::SendSucceeded(sent)
                }
                (None, Err(e)) => {
                    warn!("SimPhone: own outbound message undecodable: {e}");
                    Event::SendFailed(TransportError::Other)
                }
            };
            queue.push(event);
        }

        while let Some(bytes) = self.replies.pop_front() {
            match codec::decode(&bytes) {
                Ok(msg) => {
                    queue.push(Event::MessageReceived(msg));
                }
                Err(e) => {
                    warn!("SimPhone: reply undecodable: {e}");
                    queue.push(Event::MessageDropped(TransportError::Other));
                }
            }
        }
    }

    /// Queue a raw phone-to-watch message.
    pub fn push_reply(&mut self, msg: &Dictionary) -> Result<(), CodecError> {
        let mut buf = [0u8; MAX_MESSAGE_SIZE];
        let len = codec::encode(msg, &mut buf)?;
        self.replies.push_back(buf[..len].to_vec());
        Ok(())
    }

    fn respond(&mut self, sent: &Dictionary) {
        let mut reply = Dictionary::new();
        let built = if let Some(raw) = sent.find_i32(keys::SCREEN_ENTER) {
            self.screen = ScreenId::from_i32(raw);
            if self.screen == Some(ScreenId::GpsApp) {
                self.gps_reply(&mut reply)
            } else {
                return;
            }
        } else if sent.contains(keys::STATUS_UPDATE_WEATHER) {
            self.weather_reply(&mut reply)
        } else if sent.contains(keys::STATUS_UPDATE_CALENDAR) {
            self.calendar_reply(&mut reply)
        } else if sent.contains(keys::SONG_LENGTH) {
            Self::music_reply(&mut reply)
        } else {
            return;
        };

        let queued = built.and_then(|()| self.push_reply(&reply));
        if let Err(e) = queued {
            warn!("SimPhone: could not build reply: {e}");
        }
    }

    fn weather_reply(&self, reply: &mut Dictionary) -> Result<(), CodecError> {
        reply.write_cstring(keys::WEATHER_TEMP, "21C")?;
        reply.write_uint8(keys::WEATHER_ICON, 3)?;
        reply.write_uint8(keys::WEATHER_ICON_TOMORROW, 1)?;
        reply.write_cstring(keys::WEATHER_DAY1, "Tue : 18C")?;
        reply.write_int32(keys::STATUS_UPDATE_WEATHER, self.weather_interval_s)
    }

    fn gps_reply(&self, reply: &mut Dictionary) -> Result<(), CodecError> {
        reply.write_cstring(keys::GPS_LOCATION, "1 Infinite Loop")?;
        reply.write_int32(keys::UPDATE_INTERVAL, self.gps_interval_s)
    }

    /// Next appointment is always fifteen minutes from now.
    fn calendar_reply(&self, reply: &mut Dictionary) -> Result<(), CodecError> {
        let now = self.local_time();
        let at = u64::from(now.minutes_of_day()) + 15;
        let stamp = format!(
            "{:02}/{:02} {:02}:{:02} Standup",
            now.month,
            now.day,
            (at / 60) % 24,
            at % 60
        );
        debug!("SimPhone: next appointment '{stamp}'");
        reply.write_cstring(keys::CALENDAR_DATE_TIME, &stamp)?;
        reply.write_cstring(keys::CALENDAR_TEXT, "Team standup")?;
        reply.write_uint8(keys::BATTERY_PERCENT, 64)
    }

    fn music_reply(reply: &mut Dictionary) -> Result<(), CodecError> {
        reply.write_cstring(keys::MUSIC_ARTIST, "Boards of Canada")?;
        reply.write_cstring(keys::MUSIC_TITLE, "Roygbiv")?;
        reply.write_int8(keys::SONG_LENGTH, 10)
    }
}

impl TransportPort for SimPhone {
    fn peer_connected(&self) -> bool {
        self.peer
    }

    fn send(&mut self, message: &Dictionary) -> Result<(), TransportError> {
        if !self.peer {
            return Err(TransportError::NotConnected);
        }
        let mut buf = [0u8; MAX_MESSAGE_SIZE];
        let len = codec::encode(message, &mut buf).map_err(|_| TransportError::BufferOverflow)?;
        // A sequence reset is not acknowledged separately; the command
        // right behind it is.
        if self.in_flight.is_none() || message.len() > 1 {
            self.in_flight = Some(buf[..len].to_vec());
        }
        self.sent += 1;
        Ok(())
    }
}

impl ClockPort for SimPhone {
    fn uptime_ms(&self) -> u64 {
        self.now_ms
    }

    fn local_time(&self) -> LocalTime {
        let minutes =
            (u64::from(self.start.minutes_of_day()) + self.now_ms / 60_000) % MINUTES_PER_DAY;
        LocalTime {
            hour: (minutes / 60) as u8,
            minute: (minutes % 60) as u8,
            ..self.start
        }
    }
}
