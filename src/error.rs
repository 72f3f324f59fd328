//! Unified error types for the GreenGuard firmware.
//!
//! Each port has its own small error enum; all of them convert into the
//! crate-level [`Error`] so the binary edge can handle them uniformly.
//! All variants are `Copy` so they can be passed into events and log
//! lines without allocation.
//!
//! None of these are fatal inside a cycle: the agent turns every one of
//! them into a [`CycleOutcome`](crate::app::events::CycleOutcome) and
//! carries on at the next interval.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The sensor produced no usable reading.
    Sensor(SensorError),
    /// The network link could not be started or is down.
    Link(LinkError),
    /// The HTTP request got no response.
    Transport(TransportError),
    /// Compiled-in configuration is invalid.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The value was NaN or infinite.
    NotFinite,
    /// The value is outside the physically plausible range.
    OutOfRange,
    /// The sensor did not toggle the data line in time.
    Timeout,
    /// Frame checksum did not match the payload.
    ChecksumMismatch,
    /// GPIO read or write failed.
    Bus,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFinite => write!(f, "reading is not a finite number"),
            Self::OutOfRange => write!(f, "reading out of range"),
            Self::Timeout => write!(f, "sensor response timed out"),
            Self::ChecksumMismatch => write!(f, "frame checksum mismatch"),
            Self::Bus => write!(f, "GPIO access failed"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Link errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    /// The driver refused to start or to issue a connect.
    DriverFailed,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(
                f,
                "password invalid (must be 8-64 bytes for WPA2, or empty for open)"
            ),
            Self::DriverFailed => write!(f, "WiFi driver failed"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// The HTTP request produced no status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// TCP connect or DNS resolution failed.
    Connect,
    /// No response within the request timeout.
    Timeout,
    /// Socket I/O failed mid-request.
    Io,
    /// The response could not be parsed as HTTP.
    MalformedResponse,
    /// The URL could not be used by this transport.
    InvalidUrl,
    /// The request body could not be encoded.
    Encode,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "connection failed"),
            Self::Timeout => write!(f, "request timed out"),
            Self::Io => write!(f, "socket I/O error"),
            Self::MalformedResponse => write!(f, "malformed HTTP response"),
            Self::InvalidUrl => write!(f, "unsupported URL"),
            Self::Encode => write!(f, "payload encoding failed"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A string field is empty or longer than its fixed capacity.
    /// Carries the field name.
    InvalidField(&'static str),
    /// The server URL is not `http://` or `https://`.
    UnsupportedScheme,
    /// A timing value failed range validation.
    InvalidTiming(&'static str),
    /// The plausible temperature range is empty or inverted.
    InvalidRange,
    /// WiFi credentials failed validation.
    Credentials(LinkError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidField(name) => write!(f, "invalid field '{name}'"),
            Self::UnsupportedScheme => write!(f, "server URL must start with http:// or https://"),
            Self::InvalidTiming(msg) => write!(f, "invalid timing: {msg}"),
            Self::InvalidRange => write!(f, "plausible temperature range is empty"),
            Self::Credentials(e) => write!(f, "credentials: {e}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
