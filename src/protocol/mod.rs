//! Phone link protocol.
//!
//! ```text
//! ┌──────────────┐   Dictionary    ┌──────────┐   bytes   ┌───────────┐
//! │  StatusApp   │───────────────▶│  Outbox  │──────────▶│ Transport │
//! │              │◀───────────────│  (seq #) │◀──────────│  (codec)  │
//! └──────────────┘  decoded dict   └──────────┘           └───────────┘
//! ```
//!
//! - [`keys`]: numeric keys and screen ids (the wire contract)
//! - [`dict`]: typed key/value dictionary
//! - [`codec`]: byte-exact dictionary encoding
//! - [`sequence`]: sequence numbering with the reset sentinel
//! - [`outbox`]: one-in-flight command channel

pub mod codec;
pub mod dict;
pub mod keys;
pub mod outbox;
pub mod sequence;

pub use dict::{Dictionary, Value};
pub use keys::{Command, ScreenId};
pub use outbox::{DropReason, Outbox, SendOutcome};
pub use sequence::{SequenceCounter, SEQUENCE_RESET};
