//! Outbound command channel.
//!
//! Wraps every command in a dictionary whose first tuple is the next
//! sequence number, and keeps at most one command in flight.  The
//! in-flight flag is raised when the transport accepts a message and is
//! cleared only by the transport's sent / failed callback, routed here via
//! [`Outbox::on_send_complete`].

use log::{debug, warn};

use super::dict::Dictionary;
use super::keys::{self, Command, Key};
use super::sequence::{SequenceCounter, SEQUENCE_RESET};
use crate::app::ports::TransportPort;
use crate::error::TransportError;

/// Parameter written when a command carries no argument.
const NO_PARAM: i8 = -1;

/// Why an outbound command was not transmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// No paired phone; the expected steady state when out of range.
    NoPeer,
    /// Another command is still awaiting its callback.
    InFlight,
    /// The transport refused the message synchronously.
    Transport(TransportError),
}

/// Result of a send attempt.  Drops are silent by contract; callers inspect
/// this only for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Handed to the transport with this sequence number.
    Sent(u32),
    Dropped(DropReason),
}

impl SendOutcome {
    pub fn is_sent(self) -> bool {
        matches!(self, Self::Sent(_))
    }
}

/// Serialized, sequence-numbered outbound channel.
#[derive(Debug, Default)]
pub struct Outbox {
    sequence: SequenceCounter,
    sending: bool,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume numbering after a known value.
    pub fn with_sequence(sequence: SequenceCounter) -> Self {
        Self {
            sequence,
            sending: false,
        }
    }

    /// Start an outbound message: fails when no peer is present, otherwise
    /// returns a dictionary holding the next sequence number.
    pub fn begin(&mut self, transport: &impl TransportPort) -> Result<Dictionary, TransportError> {
        if !transport.peer_connected() {
            return Err(TransportError::NotConnected);
        }
        let mut dict = Dictionary::new();
        // Reinterpreted as int32 on the wire.
        dict.write_int32(keys::SEQUENCE_NUMBER, self.sequence.next() as i32)
            .map_err(|_| TransportError::BufferOverflow)?;
        Ok(dict)
    }

    /// Send a typed command.
    pub fn send(&mut self, command: Command, transport: &mut impl TransportPort) -> SendOutcome {
        self.send_command_int(command.key(), command.param().unwrap_or(NO_PARAM), transport)
    }

    /// Send `key` with no parameter.
    pub fn send_command(&mut self, key: Key, transport: &mut impl TransportPort) -> SendOutcome {
        self.send_command_int(key, NO_PARAM, transport)
    }

    /// Send `key` with an `i8` parameter.  Silently dropped when no peer is
    /// present or a command is already in flight; the sequence counter is
    /// untouched in both cases.
    pub fn send_command_int(
        &mut self,
        key: Key,
        value: i8,
        transport: &mut impl TransportPort,
    ) -> SendOutcome {
        if !transport.peer_connected() {
            debug!("Outbox: no peer, dropping key 0x{key:04X}");
            return SendOutcome::Dropped(DropReason::NoPeer);
        }
        if self.sending {
            debug!("Outbox: in flight, dropping key 0x{key:04X}");
            return SendOutcome::Dropped(DropReason::InFlight);
        }

        let mut dict = match self.begin(transport) {
            Ok(d) => d,
            Err(e) => return SendOutcome::Dropped(DropReason::Transport(e)),
        };
        if let Err(e) = dict.write_int8(key, value) {
            warn!("Outbox: could not write key 0x{key:04X}: {e}");
            return SendOutcome::Dropped(DropReason::Transport(TransportError::BufferOverflow));
        }

        match transport.send(&dict) {
            Ok(()) => {
                self.sending = true;
                let seq = self.sequence.last();
                debug!("Outbox: sent key 0x{key:04X} ({value}) seq={seq}");
                SendOutcome::Sent(seq)
            }
            Err(e) => {
                warn!("Outbox: transport refused key 0x{key:04X}: {e}");
                SendOutcome::Dropped(DropReason::Transport(e))
            }
        }
    }

    /// Tell the phone to restart sequence tracking.  Bypasses the in-flight
    /// guard and does not raise it; no-op without a peer.
    pub fn reset_sequence_number(&mut self, transport: &mut impl TransportPort) -> SendOutcome {
        if !transport.peer_connected() {
            return SendOutcome::Dropped(DropReason::NoPeer);
        }
        let mut dict = Dictionary::new();
        if dict
            .write_int32(keys::SEQUENCE_NUMBER, SEQUENCE_RESET as i32)
            .is_err()
        {
            return SendOutcome::Dropped(DropReason::Transport(TransportError::BufferOverflow));
        }
        match transport.send(&dict) {
            Ok(()) => {
                debug!("Outbox: sequence reset sent");
                SendOutcome::Sent(SEQUENCE_RESET)
            }
            Err(e) => SendOutcome::Dropped(DropReason::Transport(e)),
        }
    }

    /// Clear the in-flight guard.  Called from the sent and failed callbacks.
    pub fn on_send_complete(&mut self) {
        self.sending = false;
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    /// Last sequence number issued by a normal send.
    pub fn last_sequence(&self) -> u32 {
        self.sequence.last()
    }
}
