//! GPIO / peripheral pin assignments for the DepotWatch main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Alarm outputs
// ---------------------------------------------------------------------------

/// WS2812B strip data line (through a 3.3 V → 5 V level shifter).
pub const STRIP_DATA_GPIO: i32 = 4;
/// Active buzzer, transistor-driven, active HIGH.
pub const BUZZER_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// DHT11 single-wire data, open drain with a 4.7 kΩ pull-up.
pub const DHT_DATA_GPIO: i32 = 6;
/// HC-SR04 trigger output.
pub const RANGER_TRIG_GPIO: i32 = 7;
/// HC-SR04 echo input (through a 5 V → 3.3 V divider).
pub const RANGER_ECHO_GPIO: i32 = 15;
/// LDR divider, ADC1 channel 0.
pub const LIGHT_ADC_GPIO: i32 = 1;

// ---------------------------------------------------------------------------
// Particulate sensor UART (UART1, 9600 8N1)
// ---------------------------------------------------------------------------

pub const PMS_UART_TX_GPIO: i32 = 17;
pub const PMS_UART_RX_GPIO: i32 = 18;
pub const PMS_BAUD: u32 = 9600;
/// Driver RX ring buffer, bytes.
pub const PMS_RX_BUFFER: usize = 256;

// ---------------------------------------------------------------------------
// Console UART (UART0): commands in, telemetry out
// ---------------------------------------------------------------------------

pub const CONSOLE_UART_TX_GPIO: i32 = 43;
pub const CONSOLE_UART_RX_GPIO: i32 = 44;
pub const CONSOLE_BAUD: u32 = 115_200;
/// Driver RX ring buffer, bytes.
pub const CONSOLE_RX_BUFFER: usize = 2048;

// ---------------------------------------------------------------------------
// Front-panel keys
// ---------------------------------------------------------------------------

/// Select / edit cursor.  Active LOW, internal pull-up.
pub const KEY_SELECT_GPIO: i32 = 9;
/// Up / light mode.  Active LOW, internal pull-up.
pub const KEY_UP_GPIO: i32 = 10;
/// Down / mute.  Active HIGH, internal pull-down.
pub const KEY_DOWN_GPIO: i32 = 11;
