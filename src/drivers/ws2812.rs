//! WS2812B addressable LED strip, bit-banged over one GPIO.
//!
//! ## Wire format
//!
//! Each pixel is three bytes in **G, R, B** order, each byte sent MSB
//! first.  Every bit is one high pulse followed by a low gap:
//!
//! ```text
//!   "0":  ┌──┐______      high for T0H, low for the rest of the bit
//!   "1":  ┌─────┐___      high for T1H, low for the rest of the bit
//! ```
//!
//! After the last bit the line idles low for at least 50 µs, which the
//! strip takes as "latch".
//!
//! The datasheet tolerance is ±150 ns, so the burst runs with interrupts
//! masked (`critical_section::with`).  A 10-pixel strip masks interrupts
//! for roughly 360 µs including the reset gap.  The UART FIFOs hold more
//! than that at the sensor baud rates.
//!
//! ## Dual-target design
//!
//! The driver is generic over `embedded-hal` 1.0 [`OutputPin`] and
//! [`DelayNs`], plus a [`HoldCycles`] primitive for the sub-microsecond
//! pulse widths.  On ESP-IDF the main binary passes a `PinDriver` and
//! `Ets`; host tests pass recording mocks.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::error::Error;

/// Colour as (R, G, B), each 0–255.
pub type Rgb = (u8, u8, u8);

/// Pixels on the shipped strip.
pub const STRIP_LEN: usize = 10;

// ---------------------------------------------------------------------------
// Pixel buffer
// ---------------------------------------------------------------------------

/// Frame owned by the main loop between refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBuffer<const N: usize> {
    pixels: [Rgb; N],
}

impl<const N: usize> PixelBuffer<N> {
    pub const fn new() -> Self {
        Self { pixels: [(0, 0, 0); N] }
    }

    pub fn fill(&mut self, colour: Rgb) {
        self.pixels = [colour; N];
    }

    pub fn clear(&mut self) {
        self.fill((0, 0, 0));
    }

    /// Set one pixel.  Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, colour: Rgb) {
        if let Some(p) = self.pixels.get_mut(index) {
            *p = colour;
        }
    }

    pub fn get(&self, index: usize) -> Option<Rgb> {
        self.pixels.get(index).copied()
    }

    pub fn pixels(&self) -> &[Rgb; N] {
        &self.pixels
    }

    /// True when every pixel is dark.
    pub fn is_dark(&self) -> bool {
        self.pixels.iter().all(|&p| p == (0, 0, 0))
    }

    /// Bytes in transmission order (G, R, B per pixel).
    pub fn wire_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.pixels.iter().flat_map(|&(r, g, b)| [g, r, b])
    }
}

impl<const N: usize> Default for PixelBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// Pulse widths in [`HoldCycles`] units plus the latch gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitTiming {
    t0h_cycles: u32,
    t1h_cycles: u32,
    bit_cycles: u32,
    reset_us: u32,
}

impl BitTiming {
    /// ESP32-S3 at 240 MHz with [`SpinHold`], release profile.
    ///
    /// T0H ≈ 0.40 µs, T1H ≈ 0.80 µs, bit ≈ 1.25 µs.
    pub const ESP32S3: Self = Self {
        t0h_cycles: 24,
        t1h_cycles: 48,
        bit_cycles: 75,
        reset_us: 60,
    };

    /// Build a custom timing.  A "1" pulse must be longer than a "0"
    /// pulse and both must fit in one bit period.
    pub fn new(t0h_cycles: u32, t1h_cycles: u32, bit_cycles: u32, reset_us: u32) -> Result<Self, Error> {
        if t0h_cycles == 0 || t1h_cycles <= t0h_cycles {
            return Err(Error::Init("ws2812: T1H must exceed T0H"));
        }
        if bit_cycles <= t1h_cycles {
            return Err(Error::Init("ws2812: bit period shorter than T1H"));
        }
        if reset_us < 50 {
            return Err(Error::Init("ws2812: latch gap under 50 us"));
        }
        Ok(Self {
            t0h_cycles,
            t1h_cycles,
            bit_cycles,
            reset_us,
        })
    }

    pub fn t0h_cycles(&self) -> u32 {
        self.t0h_cycles
    }

    pub fn t1h_cycles(&self) -> u32 {
        self.t1h_cycles
    }

    pub fn reset_us(&self) -> u32 {
        self.reset_us
    }

    /// (high, low) hold lengths for one bit value.
    fn pulse(&self, one: bool) -> (u32, u32) {
        let high = if one { self.t1h_cycles } else { self.t0h_cycles };
        (high, self.bit_cycles - high)
    }
}

// ---------------------------------------------------------------------------
// Hold primitive
// ---------------------------------------------------------------------------

/// Busy-wait for a calibrated number of units.
///
/// Must be proportional to CPU clock and must not yield.
pub trait HoldCycles {
    fn hold(&mut self, cycles: u32);
}

/// Counted spin loop.  `black_box` keeps the optimiser from deleting or
/// collapsing the loop body.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinHold;

impl HoldCycles for SpinHold {
    #[inline(always)]
    fn hold(&mut self, cycles: u32) {
        let mut n = core::hint::black_box(cycles);
        while n > 0 {
            n = core::hint::black_box(n - 1);
        }
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

pub struct Ws2812<P, H, D> {
    pin: P,
    hold: H,
    delay: D,
    timing: BitTiming,
}

impl<P, H, D> Ws2812<P, H, D>
where
    P: OutputPin,
    H: HoldCycles,
    D: DelayNs,
{
    pub fn new(pin: P, hold: H, delay: D, timing: BitTiming) -> Self {
        Self {
            pin,
            hold,
            delay,
            timing,
        }
    }

    /// Push the whole buffer to the strip as one uninterrupted burst,
    /// then hold the line low for the latch gap.
    ///
    /// A pin error aborts the burst, but the line is still driven low and
    /// the latch gap still held before the error is returned.
    pub fn refresh<const N: usize>(&mut self, buffer: &PixelBuffer<N>) -> Result<(), P::Error> {
        critical_section::with(|_cs| {
            let burst = buffer.wire_bytes().try_for_each(|byte| self.write_byte(byte));
            let idle = self.pin.set_low();
            self.delay.delay_us(self.timing.reset_us);
            burst.and(idle)
        })
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), P::Error> {
        for bit in (0..8).rev() {
            let (high, low) = self.timing.pulse(byte & (1 << bit) != 0);
            self.pin.set_high()?;
            self.hold.hold(high);
            self.pin.set_low()?;
            self.hold.hold(low);
        }
        Ok(())
    }

    /// Release the pin (e.g. to reconfigure it).
    pub fn release(self) -> P {
        self.pin
    }
}
