//! DHT11 / DHT22 single-wire temperature sensor driver.
//!
//! Generic over `embedded-hal` 1.0 so the same code drives an ESP-IDF
//! open-drain `PinDriver` on the device and a scripted mock line in
//! host tests.
//!
//! ## Protocol
//!
//! ```text
//! host  ──┐ 18 ms (DHT11) / 1 ms (DHT22) ┌── release
//!         └──────────────────────────────┘
//! sensor                 ┐ 80 µs ┌ 80 µs ┐ 40 × (50 µs low + 26 µs "0" / 70 µs "1" high)
//!                        └───────┘       └─ ...
//! ```
//!
//! Each bit is sampled 35 µs after its rising edge: still high means `1`.
//! Frame = humidity (2 bytes), temperature (2 bytes), checksum.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use serde::Serialize;

use crate::app::ports::SensorPort;
use crate::error::SensorError;

/// Bytes in one sensor frame, checksum included.
pub const FRAME_LEN: usize = 5;

const RELEASE_US: u32 = 40;
const SAMPLE_AFTER_RISE_US: u32 = 35;
const EDGE_TIMEOUT_US: u32 = 100;

/// Supported sensor variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SensorKind {
    Dht11,
    /// Also sold as AM2302.
    Dht22,
}

impl SensorKind {
    /// Parse a build-time name (`dht11`, `dht22`, `am2302`; case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("dht11") {
            Some(Self::Dht11)
        } else if name.eq_ignore_ascii_case("dht22") || name.eq_ignore_ascii_case("am2302") {
            Some(Self::Dht22)
        } else {
            None
        }
    }

    /// Length of the host start pulse.
    pub const fn start_pulse_ms(self) -> u32 {
        match self {
            Self::Dht11 => 18,
            Self::Dht22 => 1,
        }
    }
}

/// Verify the checksum and extract the temperature in °C.
pub fn decode_temperature(kind: SensorKind, frame: &[u8; FRAME_LEN]) -> Result<f32, SensorError> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(SensorError::ChecksumMismatch);
    }

    let (negative, tenths) = match kind {
        // Integer byte plus a tenths nibble; bit 7 of the decimal byte is the sign.
        SensorKind::Dht11 => (
            frame[3] & 0x80 != 0,
            i32::from(frame[2]) * 10 + i32::from(frame[3] & 0x0F),
        ),
        // 15-bit magnitude in tenths; bit 15 is the sign.
        SensorKind::Dht22 => (
            frame[2] & 0x80 != 0,
            (i32::from(frame[2] & 0x7F) << 8) | i32::from(frame[3]),
        ),
    };
    let tenths = if negative { -tenths } else { tenths };
    Ok(tenths as f32 / 10.0)
}

/// DHT sensor on one bidirectional (open-drain) GPIO.
pub struct Dht<P, D> {
    pin: P,
    delay: D,
    kind: SensorKind,
}

impl<P, D> Dht<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    /// Take ownership of the pin and release the line to its idle level.
    pub fn new(mut pin: P, delay: D, kind: SensorKind) -> Result<Self, SensorError> {
        pin.set_high().map_err(|_| SensorError::Bus)?;
        Ok(Self { pin, delay, kind })
    }

    /// Run one full transaction and return the raw frame.
    pub fn read_frame(&mut self) -> Result<[u8; FRAME_LEN], SensorError> {
        self.pin.set_low().map_err(|_| SensorError::Bus)?;
        self.delay.delay_ms(self.kind.start_pulse_ms());
        self.pin.set_high().map_err(|_| SensorError::Bus)?;
        self.delay.delay_us(RELEASE_US);

        // Response handshake: low 80 µs, high 80 µs, then the first bit's low.
        self.wait_for(false)?;
        self.wait_for(true)?;
        self.wait_for(false)?;

        let mut frame = [0u8; FRAME_LEN];
        for byte in &mut frame {
            for _ in 0..8 {
                self.wait_for(true)?;
                self.delay.delay_us(SAMPLE_AFTER_RISE_US);
                let bit = self.pin.is_high().map_err(|_| SensorError::Bus)?;
                *byte = (*byte << 1) | u8::from(bit);
                if bit {
                    self.wait_for(false)?;
                }
            }
        }
        Ok(frame)
    }

    /// Read and decode the temperature.
    pub fn read_celsius(&mut self) -> Result<f32, SensorError> {
        let frame = self.read_frame()?;
        decode_temperature(self.kind, &frame)
    }

    fn wait_for(&mut self, high: bool) -> Result<(), SensorError> {
        for _ in 0..EDGE_TIMEOUT_US {
            if self.pin.is_high().map_err(|_| SensorError::Bus)? == high {
                return Ok(());
            }
            self.delay.delay_us(1);
        }
        Err(SensorError::Timeout)
    }
}

impl<P, D> SensorPort for Dht<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    fn acquire(&mut self) -> Result<f32, SensorError> {
        self.read_celsius()
    }
}
