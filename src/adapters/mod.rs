//! Adapters — concrete implementations of the port traits.
//!
//! | Adapter    | Implements         | Connects to                    |
//! |------------|--------------------|--------------------------------|
//! | `hardware` | SensorPort         | EC ports 0x62/0x66, debugfs    |
//! |            | ActuatorPort       | EC fan-duty command            |
//! | `log_sink` | EventSink          | `log` facade                   |
//! | `time`     | ClockPort          | System wall clock              |

pub mod hardware;
pub mod log_sink;
pub mod time;
