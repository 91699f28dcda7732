//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter         | Implements         | Connects to                  |
//! |-----------------|--------------------|------------------------------|
//! | `hardware`      | SensorPort         | PMS mailbox, DHT11, HC-SR04  |
//! |                 | AlarmOutputPort    | WS2812 strip, buzzer         |
//! | `log_sink`      | EventSink          | Serial log output            |
//! | `serial_report` | EventSink          | Operator telemetry lines     |
//! | `nvs`           | ConfigPort         | NVS / in-memory store        |
//! | `clock`         | ClockPort          | ESP32 system timer           |

pub mod clock;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod serial_report;
