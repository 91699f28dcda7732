//! DepotWatch Firmware — Main Entry Point
//!
//! Hexagonal architecture around a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter    LogEventSink   ThresholdStore   SoftClock  │
//! │  (Sensor+Alarm out) (EventSink)    (ConfigPort)     (Clock)    │
//! │  SerialReportSink                                              │
//! │  (EventSink)                                                   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              MonitorService (pure logic)               │    │
//! │  │  Staleness · Forest · Thresholds · Arbitration         │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  UART bytes → decoders → mailboxes → control loop (100 ms)     │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use core::fmt;
use std::time::{Duration, Instant};

use anyhow::Result;
use esp_idf_hal::adc::attenuation::DB_11;
use esp_idf_hal::adc::oneshot::config::AdcChannelConfig;
use esp_idf_hal::adc::oneshot::{AdcChannelDriver, AdcDriver};
use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_hal::gpio::{AnyIOPin, AnyInputPin, AnyOutputPin, PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{self, UartDriver};
use esp_idf_hal::units::Hertz;
use log::{info, warn};

use depotwatch::adapters::clock::{SoftClock, Uptime};
use depotwatch::adapters::hardware::{HardwareAdapter, PresenceSensor};
use depotwatch::adapters::log_sink::LogEventSink;
use depotwatch::adapters::nvs::ThresholdStore;
use depotwatch::adapters::serial_report::SerialReportSink;
use depotwatch::app::service::MonitorService;
use depotwatch::config::SystemConfig;
use depotwatch::drivers::buzzer::Buzzer;
use depotwatch::drivers::dht11::Dht11;
use depotwatch::drivers::keys::{KeyLevels, KeyScanner};
use depotwatch::drivers::ranger::Ranger;
use depotwatch::drivers::ws2812::{BitTiming, SpinHold, Ws2812};
use depotwatch::error::{Error, SensorError};
use depotwatch::pins;
use depotwatch::protocol::link::{CommandLink, on_console_bytes};
use depotwatch::sensors::pms::{ParticulateLink, PmsDecoder, on_pms_byte};

/// UART reads never block the control loop.
const NON_BLOCKING: u32 = 0;

// ── Pin helpers ───────────────────────────────────────────────
//
// `pins` is the single owner of every GPIO number; nothing else in the
// firmware constructs a pin for these numbers.

fn io_pin(gpio: i32) -> AnyIOPin {
    // SAFETY: each GPIO number in `pins` is handed to exactly one driver.
    unsafe { AnyIOPin::new(gpio) }
}

fn input_pin(gpio: i32) -> AnyInputPin {
    // SAFETY: as above.
    unsafe { AnyInputPin::new(gpio) }
}

fn output_pin(gpio: i32) -> AnyOutputPin {
    // SAFETY: as above.
    unsafe { AnyOutputPin::new(gpio) }
}

/// `core::fmt::Write` over a UART, for the serial report.
struct UartWriter<'a>(&'a UartDriver<'a>);

impl fmt::Write for UartWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write(s.as_bytes()).map(|_| ()).map_err(|_| fmt::Error)
    }
}

/// Hand every byte waiting in the UART's RX ring buffer to `on_chunk`.
///
/// The byte producers run here, once per control tick, rather than in
/// the UART interrupt.  The ESP-IDF driver's own interrupt moves bytes
/// from the hardware FIFO into the ring buffer, so nothing is lost as
/// long as the ring buffer holds a full tick of traffic at line rate
/// (`pins::PMS_RX_BUFFER`, `pins::CONSOLE_RX_BUFFER`).  A tick that
/// overruns by more than that drops bytes; the frame decoder resyncs
/// and a cut command line is discarded.
fn drain(uart: &UartDriver<'_>, mut on_chunk: impl FnMut(&[u8])) {
    let mut buf = [0u8; 64];
    while let Ok(n) = uart.read(&mut buf, NON_BLOCKING) {
        if n == 0 {
            break;
        }
        on_chunk(&buf[..n]);
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  DepotWatch v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let peripherals = Peripherals::take()?;
    let config = SystemConfig::default();

    // ── 2. UARTs ──────────────────────────────────────────────
    let pms_uart = UartDriver::new(
        peripherals.uart1,
        io_pin(pins::PMS_UART_TX_GPIO),
        io_pin(pins::PMS_UART_RX_GPIO),
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &uart::config::Config::default()
            .baudrate(Hertz(pins::PMS_BAUD))
            .rx_fifo_size(pins::PMS_RX_BUFFER),
    )?;
    let console = UartDriver::new(
        peripherals.uart0,
        io_pin(pins::CONSOLE_UART_TX_GPIO),
        io_pin(pins::CONSOLE_UART_RX_GPIO),
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &uart::config::Config::default()
            .baudrate(Hertz(pins::CONSOLE_BAUD))
            .rx_fifo_size(pins::CONSOLE_RX_BUFFER),
    )?;

    // ── 3. Sensors ────────────────────────────────────────────
    let dht = Dht11::new(PinDriver::input_output_od(io_pin(pins::DHT_DATA_GPIO))?, Ets)
        .map_err(|_| Error::Init("dht11 data pin"))?;

    let ranger = Ranger::new(
        PinDriver::output(output_pin(pins::RANGER_TRIG_GPIO))?,
        PinDriver::input(input_pin(pins::RANGER_ECHO_GPIO))?,
        Ets,
        Uptime::new(),
    )
    .map_err(|_| Error::Init("ranger trigger pin"))?;

    // The ADC channel needs the typed pin; this is `pins::LIGHT_ADC_GPIO`.
    let adc = AdcDriver::new(peripherals.adc1)?;
    let adc_config = AdcChannelConfig {
        attenuation: DB_11,
        ..Default::default()
    };
    let mut light_channel = AdcChannelDriver::new(&adc, peripherals.pins.gpio1, &adc_config)?;
    let presence = PresenceSensor::new(ranger, || {
        adc.read(&mut light_channel).map_err(|_| SensorError::ReadFailed)
    });

    // ── 4. Alarm outputs ──────────────────────────────────────
    let strip = Ws2812::new(
        PinDriver::output(output_pin(pins::STRIP_DATA_GPIO))?,
        SpinHold,
        Ets,
        BitTiming::ESP32S3,
    );
    let buzzer = Buzzer::new(PinDriver::output(output_pin(pins::BUZZER_GPIO))?)
        .map_err(|_| Error::Init("buzzer pin"))?;

    let mut hw = HardwareAdapter::new(ParticulateLink::global(), dht, presence, strip, buzzer);

    // ── 5. Keys ───────────────────────────────────────────────
    let mut key_select = PinDriver::input(input_pin(pins::KEY_SELECT_GPIO))?;
    key_select.set_pull(Pull::Up)?;
    let mut key_up = PinDriver::input(input_pin(pins::KEY_UP_GPIO))?;
    key_up.set_pull(Pull::Up)?;
    let mut key_down = PinDriver::input(input_pin(pins::KEY_DOWN_GPIO))?;
    key_down.set_pull(Pull::Down)?;
    let mut keys = KeyScanner::new();

    // ── 6. Storage, clock, sinks, service ─────────────────────
    let mut store = ThresholdStore::new()?;
    let mut clock = SoftClock::new();
    let mut sinks = (LogEventSink::new(), SerialReportSink::new(UartWriter(&console)));

    let mut service = MonitorService::new(config.clone());
    service.start(&store, &mut sinks);

    let mut pms_decoder = PmsDecoder::new();
    let mut command_link = CommandLink::new();
    let period = Duration::from_millis(u64::from(config.control_loop_interval_ms));

    info!("System ready. Entering control loop.");

    // ── 7. Control loop ───────────────────────────────────────
    loop {
        let started = Instant::now();

        // Producers: bytes → decoders → mailboxes.
        drain(&pms_uart, |bytes| bytes.iter().for_each(|&b| on_pms_byte(&mut pms_decoder, b)));

        // Every command line is applied as soon as it completes.
        drain(&console, |bytes| {
            on_console_bytes(&mut command_link, bytes, |cmd| {
                // Rejections are logged and reported through the sinks.
                let _ = service.handle_command(cmd, &mut clock, &mut sinks);
            });
        });

        let levels = KeyLevels {
            select: key_select.is_low(),
            up: key_up.is_low(),
            down: key_down.is_high(),
        };
        if let Some(key) = keys.poll(levels) {
            service.handle_key(key, &mut sinks);
        }

        service.tick(&mut hw, &mut sinks);

        // Threshold auto-save (quiet period after the last change).
        service.persist_if_dirty(&mut store, &mut sinks);

        let elapsed = started.elapsed();
        if elapsed < period {
            FreeRtos::delay_ms((period - elapsed).as_millis() as u32);
        } else {
            warn!("Control tick overran: {} ms", elapsed.as_millis());
        }
    }
}
