//! Port traits — the hexagonal boundary between the telemetry core and
//! the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ TelemetryAgent (domain)
//! ```
//!
//! The sensor driver, the WiFi link, the HTTP client, and the clock all
//! sit behind these traits. The [`TelemetryAgent`](super::service::TelemetryAgent)
//! consumes them via generics, so the core never touches hardware
//! directly and every cycle can be driven from host tests.

use core::net::Ipv4Addr;
use core::time::Duration;

use crate::error::{LinkError, SensorError, TransportError};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One physical temperature acquisition.
pub trait SensorPort {
    /// Perform a single acquisition and return the raw value in °C.
    ///
    /// An `Err` is the driver's "no reading" signal. Implementations
    /// must not retry internally.
    fn acquire(&mut self) -> Result<f32, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Link port (driven adapter: domain ↔ network interface)
// ───────────────────────────────────────────────────────────────

/// Link state as reported by the network driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Connected,
    Disconnected,
}

/// Network link driver. The driver is authoritative for link state; the
/// core only observes it and asks for reconnects.
pub trait LinkPort {
    /// Apply credentials and start connecting. Must not block until the
    /// link is up.
    fn begin(&mut self) -> Result<(), LinkError>;

    /// Current link state.
    fn link_state(&mut self) -> LinkState;

    /// Fire-and-forget reconnect request. Returns immediately.
    fn request_reconnect(&mut self);

    /// Station IP address once the interface is up.
    fn ip_addr(&self) -> Option<Ipv4Addr> {
        None
    }

    /// Received signal strength in dBm.
    fn rssi(&self) -> Option<i8> {
        None
    }
}

// ───────────────────────────────────────────────────────────────
// HTTP port (driven adapter: domain → remote endpoint)
// ───────────────────────────────────────────────────────────────

/// Blocking HTTP client.
pub trait HttpPort {
    /// Issue one POST and return the response status code.
    ///
    /// `Err` means no response was received (connect failure, timeout,
    /// socket error). Implementations must not retry and must return
    /// within roughly `timeout`.
    fn post(
        &mut self,
        url: &str,
        headers: &[(&str, &str)],
        body: &[u8],
        timeout: Duration,
    ) -> Result<u16, TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Time port
// ───────────────────────────────────────────────────────────────

/// Monotonic clock plus a blocking delay.
pub trait TimePort {
    /// Milliseconds since boot. Never goes backwards.
    fn now_ms(&self) -> u64;

    /// Block the calling task for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
