//! DHT11 single-wire temperature / humidity sensor.
//!
//! ## Protocol
//!
//! ```text
//!  host  ‾‾‾\________________/‾‾‾‾            ≥18 ms start pulse, then release
//!  dht              \__80__/‾‾80‾‾\_50_/‾bit‾\_50_/‾bit‾ ...  ×40
//! ```
//!
//! Each bit is a ~50 µs low preamble followed by a high pulse of ~27 µs
//! ("0") or ~70 µs ("1").  Bits are classified by comparing the high
//! pulse against the preamble measured the same way, so the poll loop's
//! overhead cancels out.
//!
//! Frame: humidity integer, humidity decimal, temperature integer,
//! temperature decimal, checksum (low byte of the sum of the first four).

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::ports::ClimateReading;
use crate::error::SensorError;

/// Host start pulse.
const START_LOW_MS: u32 = 20;
/// Give up on any single level after this many 1 µs polls.
const LEVEL_TIMEOUT_POLLS: u32 = 200;

pub const FRAME_BYTES: usize = 5;

/// Validate a raw frame and extract the integer readings.
pub fn decode(frame: &[u8; FRAME_BYTES]) -> Result<ClimateReading, SensorError> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(SensorError::ReadFailed);
    }
    Ok(ClimateReading {
        temperature_c: u16::from(frame[2]),
        humidity_pct: u16::from(frame[0]),
    })
}

/// Driver over an open-drain pin (pulled up externally).
pub struct Dht11<P, D> {
    pin: P,
    delay: D,
}

impl<P, D> Dht11<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    /// Take the pin and release the bus.
    pub fn new(mut pin: P, delay: D) -> Result<Self, P::Error> {
        pin.set_high()?;
        Ok(Self { pin, delay })
    }

    /// One full transaction.  Blocks for roughly 25 ms.
    pub fn read(&mut self) -> Result<ClimateReading, SensorError> {
        self.pin.set_low().map_err(|_| SensorError::ReadFailed)?;
        self.delay.delay_ms(START_LOW_MS);

        let mut frame = [0u8; FRAME_BYTES];
        critical_section::with(|_cs| self.read_frame(&mut frame))?;
        decode(&frame)
    }

    fn read_frame(&mut self, frame: &mut [u8; FRAME_BYTES]) -> Result<(), SensorError> {
        self.pin.set_high().map_err(|_| SensorError::ReadFailed)?;

        // Response: wait for the sensor to pull low, then its 80/80 handshake.
        self.poll_while(true)?;
        self.poll_while(false)?;
        self.poll_while(true)?;

        for bit in 0..FRAME_BYTES * 8 {
            let preamble = self.poll_while(false)?;
            let high = self.poll_while(true)?;
            if high > preamble {
                frame[bit / 8] |= 0x80 >> (bit % 8);
            }
        }
        Ok(())
    }

    /// Spin while the line reads `high`.  Returns the number of polls.
    fn poll_while(&mut self, high: bool) -> Result<u32, SensorError> {
        let mut polls = 0;
        while self.pin.is_high().map_err(|_| SensorError::ReadFailed)? == high {
            if polls >= LEVEL_TIMEOUT_POLLS {
                return Err(SensorError::ReadFailed);
            }
            self.delay.delay_us(1);
            polls += 1;
        }
        Ok(polls)
    }
}
