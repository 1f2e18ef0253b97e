//! Unified error types for the SmartStatus sync core.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! event loop's error handling uniform.  All variants are `Copy` so they can
//! be passed through the link monitor and emitted as events without
//! allocation.  Nothing in this crate is fatal: every variant describes a
//! condition the application absorbs and recovers from.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The phone link refused or lost a message.
    Transport(TransportError),
    /// An inbound message could not be decoded from the wire.
    Codec(CodecError),
    /// An appointment time string could not be parsed.
    Appointment(AppointmentError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Codec(e) => write!(f, "codec: {e}"),
            Self::Appointment(e) => write!(f, "appointment: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// Failure reasons reported by the messaging transport, either synchronously
/// from `send` or asynchronously through the dropped / send-failed callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// No paired phone is reachable.
    NotConnected,
    /// The phone did not acknowledge within the transport's timeout.
    SendTimeout,
    /// The phone explicitly rejected (nacked) the message.
    SendRejected,
    /// The transport is busy with another message.
    Busy,
    /// The message did not fit the transport buffer.
    BufferOverflow,
    /// Any other transport-level failure.
    Other,
}

impl TransportError {
    /// Short status-line code shown when an outbound send fails.
    pub const fn send_failed_code(self) -> &'static str {
        match self {
            Self::NotConnected => "Disc.",
            Self::SendTimeout => "T.Out",
            Self::Busy => "<Busy",
            Self::SendRejected => "Nack",
            Self::BufferOverflow | Self::Other => "Err.",
        }
    }

    /// Short status-line code shown when an inbound message is dropped.
    pub const fn dropped_code(self) -> &'static str {
        match self {
            Self::Busy => ">Busy",
            Self::BufferOverflow => "Over.",
            _ => "Drop.",
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "phone not connected"),
            Self::SendTimeout => write!(f, "send timed out"),
            Self::SendRejected => write!(f, "send rejected"),
            Self::Busy => write!(f, "transport busy"),
            Self::BufferOverflow => write!(f, "buffer overflow"),
            Self::Other => write!(f, "transport failure"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Codec errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// Input ended before a complete header or value.
    Truncated,
    /// Tuple type byte is not one of the four known types.
    InvalidType(u8),
    /// Integer tuple width is not 1, 2 or 4 bytes.
    InvalidLength(u16),
    /// More tuples than a dictionary can hold.
    TooManyTuples,
    /// A string or byte array exceeds the tuple capacity.
    StringTooLong,
    /// A cstring tuple is not valid UTF-8.
    InvalidUtf8,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated => write!(f, "truncated input"),
            Self::InvalidType(t) => write!(f, "invalid tuple type {t}"),
            Self::InvalidLength(n) => write!(f, "invalid integer width {n}"),
            Self::TooManyTuples => write!(f, "too many tuples"),
            Self::StringTooLong => write!(f, "value too long"),
            Self::InvalidUtf8 => write!(f, "cstring is not UTF-8"),
        }
    }
}

impl From<CodecError> for Error {
    fn from(e: CodecError) -> Self {
        Self::Codec(e)
    }
}

// ---------------------------------------------------------------------------
// Appointment parse errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentError {
    /// The string is shorter than `MM/DD HH:MM`.
    TooShort,
    /// A digit position holds something else.
    InvalidDigit,
    /// The hour/minute separator is missing or misplaced.
    MissingSeparator,
    /// Hour >= 24 or minute >= 60.
    OutOfRange,
}

impl fmt::Display for AppointmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort => write!(f, "appointment string too short"),
            Self::InvalidDigit => write!(f, "non-digit in time field"),
            Self::MissingSeparator => write!(f, "missing ':' separator"),
            Self::OutOfRange => write!(f, "time of day out of range"),
        }
    }
}

impl From<AppointmentError> for Error {
    fn from(e: AppointmentError) -> Self {
        Self::Appointment(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
