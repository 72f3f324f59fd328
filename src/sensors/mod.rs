//! Sensor subsystem: the [`Reading`] value type, the [`SensorReader`]
//! that validates and quantizes one acquisition per cycle, and the DHT
//! single-wire driver in [`dht`].

pub mod dht;

use core::fmt;

use crate::app::ports::SensorPort;
use crate::config::SensorConfig;
use crate::error::SensorError;

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// A temperature snapped to 0.1 °C.
///
/// Stored as an integer count of tenths so that equality and the JSON
/// encoding are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reading {
    deci_celsius: i32,
}

impl Reading {
    pub const fn from_tenths(deci_celsius: i32) -> Self {
        Self { deci_celsius }
    }

    /// Round `raw` to the nearest 0.1 °C, ties away from zero.
    ///
    /// A tie is decided on the decimal the sensor reported, not on its
    /// binary approximation: when `raw` is the `f32` nearest to some
    /// `x.x5`, it rounds away from zero. `23.55` becomes `23.6` even
    /// though `23.55_f32` is stored as `23.5499992…`. Every other value
    /// rounds to the nearest tenth.
    ///
    /// Returns `None` for NaN, infinities, and magnitudes that do not fit
    /// in `i32` tenths.
    pub fn quantize(raw: f32) -> Option<Self> {
        if !raw.is_finite() {
            return None;
        }
        let magnitude = raw.abs();
        let scaled = f64::from(magnitude) * 10.0;
        let below = scaled.floor();
        let tie = ((below + 0.5) / 10.0) as f32;
        let tenths = if tie.to_bits() == magnitude.to_bits() {
            below + 1.0
        } else {
            scaled.round()
        };
        if tenths > f64::from(i32::MAX) {
            return None;
        }
        let tenths = tenths as i32;
        Some(Self::from_tenths(if raw.is_sign_negative() {
            -tenths
        } else {
            tenths
        }))
    }

    pub const fn tenths(&self) -> i32 {
        self.deci_celsius
    }

    pub fn celsius(&self) -> f64 {
        f64::from(self.deci_celsius) / 10.0
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}\u{00b0}C", self.celsius())
    }
}

// ---------------------------------------------------------------------------
// SensorReader
// ---------------------------------------------------------------------------

/// Performs exactly one acquisition per call and turns it into a
/// [`Reading`] or a [`SensorError`]. Never retries.
#[derive(Debug, Clone, Copy)]
pub struct SensorReader {
    min_valid_c: f32,
    max_valid_c: f32,
}

impl SensorReader {
    pub fn new(config: &SensorConfig) -> Self {
        Self {
            min_valid_c: config.min_valid_c,
            max_valid_c: config.max_valid_c,
        }
    }

    pub fn read(&self, sensor: &mut impl SensorPort) -> Result<Reading, SensorError> {
        let raw = sensor.acquire()?;
        self.validate(raw)
    }

    /// Check a raw value against the plausible range and quantize it.
    /// The range applies to the raw value, before rounding.
    pub fn validate(&self, raw: f32) -> Result<Reading, SensorError> {
        if !raw.is_finite() {
            return Err(SensorError::NotFinite);
        }
        if raw < self.min_valid_c || raw > self.max_valid_c {
            return Err(SensorError::OutOfRange);
        }
        Reading::quantize(raw).ok_or(SensorError::NotFinite)
    }
}
