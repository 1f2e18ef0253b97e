//! Application core: pure sync logic, zero I/O.
//!
//! This module holds the status screen's orchestration: event dispatch,
//! refresh timer policy and link recovery.  All interaction with the phone,
//! the clock and the UI happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without a watch.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
