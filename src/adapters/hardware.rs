//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the particulate link, the climate and presence sensors, the LED
//! strip and the buzzer, exposing them through [`SensorPort`] and
//! [`AlarmOutputPort`].  Every driver is generic over `embedded-hal`, so
//! the same adapter runs against mock pins on the host.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::{debug, warn};

use crate::app::ports::{AlarmOutputPort, ClimateReading, PresenceReading, SensorPort};
use crate::drivers::buzzer::Buzzer;
use crate::drivers::dht11::Dht11;
use crate::drivers::ranger::{MicrosClock, Ranger, light_percent};
use crate::drivers::ws2812::{HoldCycles, PixelBuffer, STRIP_LEN, Ws2812};
use crate::error::SensorError;
use crate::sensors::pms::{ParticulateLink, ParticulateRecord};

// ── Sensor sources ────────────────────────────────────────────

/// Anything that can produce a climate reading.
pub trait ClimateSource {
    fn sample(&mut self) -> Result<ClimateReading, SensorError>;
}

impl<P, D> ClimateSource for Dht11<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    fn sample(&mut self) -> Result<ClimateReading, SensorError> {
        self.read()
    }
}

/// Anything that can produce the intrusion inputs.
pub trait PresenceSource {
    fn sample(&mut self) -> PresenceReading;
}

/// Ultrasonic ranger plus a raw light reading.
///
/// `light` returns the divider's ADC counts.
pub struct PresenceSensor<T, E, D, M, L> {
    ranger: Ranger<T, E, D, M>,
    light: L,
}

impl<T, E, D, M, L> PresenceSensor<T, E, D, M, L>
where
    L: FnMut() -> Result<u16, SensorError>,
{
    pub fn new(ranger: Ranger<T, E, D, M>, light: L) -> Self {
        Self { ranger, light }
    }
}

impl<T, E, D, M, L> PresenceSource for PresenceSensor<T, E, D, M, L>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
    M: MicrosClock,
    L: FnMut() -> Result<u16, SensorError>,
{
    /// A failed read looks like an empty, dark store.
    fn sample(&mut self) -> PresenceReading {
        let fallback = PresenceReading::default();
        let distance_mm = match self.ranger.measure_mm() {
            Ok(Some(mm)) => mm,
            Ok(None) => fallback.distance_mm,
            Err(e) => {
                debug!("Ranger: {e}");
                fallback.distance_mm
            }
        };
        let light_pct = match (self.light)() {
            Ok(raw) => light_percent(raw),
            Err(e) => {
                debug!("Light sensor: {e}");
                fallback.light_pct
            }
        };
        PresenceReading { distance_mm, light_pct }
    }
}

// ── Adapter ───────────────────────────────────────────────────

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<'a, C, R, P, H, D, B> {
    particulate: ParticulateLink<'a>,
    climate: C,
    presence: R,
    strip: Ws2812<P, H, D>,
    buzzer: Buzzer<B>,
}

impl<'a, C, R, P, H, D, B> HardwareAdapter<'a, C, R, P, H, D, B> {
    pub fn new(
        particulate: ParticulateLink<'a>,
        climate: C,
        presence: R,
        strip: Ws2812<P, H, D>,
        buzzer: Buzzer<B>,
    ) -> Self {
        Self {
            particulate,
            climate,
            presence,
            strip,
            buzzer,
        }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<C, R, P, H, D, B> SensorPort for HardwareAdapter<'_, C, R, P, H, D, B>
where
    C: ClimateSource,
    R: PresenceSource,
{
    fn read_particulate(&mut self) -> ParticulateRecord {
        self.particulate.read()
    }

    fn read_climate(&mut self) -> Result<ClimateReading, SensorError> {
        self.climate.sample()
    }

    fn read_presence(&mut self) -> PresenceReading {
        self.presence.sample()
    }
}

// ── AlarmOutputPort implementation ────────────────────────────

impl<C, R, P, H, D, B> AlarmOutputPort for HardwareAdapter<'_, C, R, P, H, D, B>
where
    P: OutputPin,
    H: HoldCycles,
    D: DelayNs,
    B: OutputPin,
{
    fn show(&mut self, frame: &PixelBuffer<STRIP_LEN>) {
        if let Err(e) = self.strip.refresh(frame) {
            warn!("Strip refresh failed: {e:?}");
        }
    }

    fn set_buzzer(&mut self, on: bool) {
        if let Err(e) = self.buzzer.set(on) {
            warn!("Buzzer write failed: {e:?}");
        }
    }
}
