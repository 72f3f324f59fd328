//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing one human-readable status line per
//! application event to the ESP-IDF logger (UART / USB-CDC in
//! production).

use log::{Level, info, log};

use crate::app::events::{AppEvent, CycleFault, CycleOutcome, CycleReport};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

/// Only a delivered reading is routine; every other outcome is a warning.
fn cycle_level(outcome: CycleOutcome) -> Level {
    match outcome {
        CycleOutcome::Published => Level::Info,
        CycleOutcome::SkippedNoLink
        | CycleOutcome::SkippedInvalidReading
        | CycleOutcome::HttpError(_)
        | CycleOutcome::TransportFailure => Level::Warn,
    }
}

fn log_cycle(report: &CycleReport) {
    let s = &report.stats;
    let t = report.started_at_ms;
    let level = cycle_level(report.outcome);
    match report.outcome {
        CycleOutcome::Published => match report.reading {
            Some(reading) => log!(
                level,
                "CYCLE | t={}ms | {} | sent | ok={}/{}",
                t, reading, s.published, s.cycles
            ),
            None => log!(level, "CYCLE | t={}ms | sent | ok={}/{}", t, s.published, s.cycles),
        },
        CycleOutcome::SkippedNoLink => log!(
            level,
            "CYCLE | t={}ms | WiFi disconnected, reconnecting | skipped={}",
            t, s.skipped_no_link
        ),
        CycleOutcome::SkippedInvalidReading => match report.fault {
            Some(CycleFault::Sensor(e)) => log!(
                level,
                "CYCLE | t={}ms | failed to read from sensor: {} | invalid={}",
                t, e, s.skipped_invalid_reading
            ),
            _ => log!(
                level,
                "CYCLE | t={}ms | failed to read from sensor | invalid={}",
                t, s.skipped_invalid_reading
            ),
        },
        CycleOutcome::HttpError(code) => log!(
            level,
            "CYCLE | t={}ms | server returned HTTP {} | http_errors={}",
            t, code, s.http_errors
        ),
        CycleOutcome::TransportFailure => match report.fault {
            Some(CycleFault::Transport(e)) => log!(
                level,
                "CYCLE | t={}ms | request failed: {} | transport_failures={}",
                t, e, s.transport_failures
            ),
            _ => log!(
                level,
                "CYCLE | t={}ms | request failed | transport_failures={}",
                t, s.transport_failures
            ),
        },
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::LinkAcquired { attempts, ip, rssi } => {
                info!(
                    "WIFI  | connected after {} poll(s) | ip={:?} rssi={:?}dBm",
                    attempts, ip, rssi
                );
            }
            AppEvent::Started {
                identity,
                url,
                interval_ms,
            } => {
                info!(
                    "START | sensor_id={} location=\"{}\" | POST {} every {} ms",
                    identity.sensor_id(),
                    identity.location(),
                    url,
                    interval_ms
                );
            }
            AppEvent::Cycle(report) => log_cycle(report),
        }
    }
}
