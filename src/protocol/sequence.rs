//! Outbound sequence numbering.
//!
//! The phone uses the sequence number to spot gaps and duplicates.  The
//! all-ones value is reserved: the watch sends it on its own to tell the
//! phone to restart sequence tracking, so a normal increment skips it and
//! wraps to 1.

/// Reserved value meaning "reset sequence tracking".
pub const SEQUENCE_RESET: u32 = u32::MAX;

/// Monotonic 32-bit sequence counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceCounter {
    last: u32,
}

impl Default for SequenceCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceCounter {
    /// Starts one below the sentinel so the first value issued is 1.
    pub const fn new() -> Self {
        Self {
            last: SEQUENCE_RESET - 1,
        }
    }

    /// Resume from a known last value (e.g. after a restart).
    pub const fn starting_after(last: u32) -> Self {
        Self { last }
    }

    /// Advance and return the value to write into the next message.
    /// Never returns [`SEQUENCE_RESET`] or 0.
    pub fn next(&mut self) -> u32 {
        let mut next = self.last.wrapping_add(1);
        if next == SEQUENCE_RESET || next == 0 {
            next = 1;
        }
        self.last = next;
        next
    }

    /// The last value issued.
    pub const fn last(&self) -> u32 {
        self.last
    }
}
