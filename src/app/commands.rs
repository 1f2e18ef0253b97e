//! Button input.
//!
//! The status screen maps the watch buttons straight onto phone commands;
//! the [`StatusApp`](super::service::StatusApp) sends them through the
//! outbox like any other command.

use crate::protocol::Command;

/// Physical button gestures on the status screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    SelectClick,
    SelectLong,
    Up,
    Down,
}

impl Button {
    /// Phone command bound to this gesture.
    pub const fn command(self) -> Command {
        match self {
            Self::SelectClick => Command::PlayPause,
            Self::SelectLong => Command::FindPhone,
            Self::Up => Command::VolumeUp,
            Self::Down => Command::VolumeDown,
        }
    }
}
