//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements     | Connects to                    |
//! |-------------|----------------|--------------------------------|
//! | `log_sink`  | EventSink      | `log` facade                   |
//! | `sim_phone` | TransportPort  | in-memory scripted phone       |
//! |             | ClockPort      | virtual uptime and wall clock  |

pub mod log_sink;
pub mod sim_phone;
