//! Peripheral drivers, generic over `embedded-hal` traits so they run
//! against mock pins on the host.

pub mod buzzer;
pub mod dht11;
pub mod keys;
pub mod ranger;
pub mod ws2812;
