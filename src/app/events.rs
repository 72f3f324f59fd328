//! Outbound application events and the per-cycle outcome.
//!
//! The [`TelemetryAgent`](super::service::TelemetryAgent) emits these
//! through the [`EventSink`](super::ports::EventSink) port. Adapters on
//! the other side decide what to do with them; in the firmware they
//! become console status lines.

use core::fmt;
use core::net::Ipv4Addr;

use crate::config::{DeviceIdentity, MAX_URL_LEN};
use crate::error::{SensorError, TransportError};
use crate::sensors::Reading;

/// Terminal classification of one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleOutcome {
    /// The endpoint answered `200`.
    Published,
    /// The link was down; a reconnect was requested.
    SkippedNoLink,
    /// The sensor produced no usable value.
    SkippedInvalidReading,
    /// The POST got no response.
    TransportFailure,
    /// The endpoint answered with a status other than `200`.
    HttpError(u16),
}

impl CycleOutcome {
    /// Whether the cycle reached the publisher.
    pub fn attempted_publish(self) -> bool {
        matches!(
            self,
            Self::Published | Self::TransportFailure | Self::HttpError(_)
        )
    }
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Published => write!(f, "published"),
            Self::SkippedNoLink => write!(f, "skipped (link down)"),
            Self::SkippedInvalidReading => write!(f, "skipped (invalid reading)"),
            Self::TransportFailure => write!(f, "transport failure"),
            Self::HttpError(code) => write!(f, "HTTP error {code}"),
        }
    }
}

/// Why a cycle ended early or failed, when it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleFault {
    Sensor(SensorError),
    Transport(TransportError),
}

/// Running per-outcome counters since boot. Diagnostics only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub cycles: u32,
    pub published: u32,
    pub skipped_no_link: u32,
    pub skipped_invalid_reading: u32,
    pub transport_failures: u32,
    pub http_errors: u32,
}

impl CycleStats {
    pub fn record(&mut self, outcome: CycleOutcome) {
        self.cycles = self.cycles.wrapping_add(1);
        let slot = match outcome {
            CycleOutcome::Published => &mut self.published,
            CycleOutcome::SkippedNoLink => &mut self.skipped_no_link,
            CycleOutcome::SkippedInvalidReading => &mut self.skipped_invalid_reading,
            CycleOutcome::TransportFailure => &mut self.transport_failures,
            CycleOutcome::HttpError(_) => &mut self.http_errors,
        };
        *slot = slot.wrapping_add(1);
    }
}

/// Everything the log line for one cycle needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Scheduler time at which the cycle started.
    pub started_at_ms: u64,
    pub outcome: CycleOutcome,
    /// Present when the sensor produced a valid value.
    pub reading: Option<Reading>,
    pub fault: Option<CycleFault>,
    pub stats: CycleStats,
}

/// Structured events emitted by the telemetry core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Startup link wait finished.
    LinkAcquired {
        attempts: u32,
        ip: Option<Ipv4Addr>,
        rssi: Option<i8>,
    },

    /// The agent entered steady state and will start scheduling cycles.
    Started {
        identity: DeviceIdentity,
        url: heapless::String<MAX_URL_LEN>,
        interval_ms: u32,
    },

    /// One cycle ran to completion.
    Cycle(CycleReport),
}
