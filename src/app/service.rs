//! Application service — the hexagonal core.
//!
//! [`TelemetryAgent`] owns the scheduler, the connectivity gate, the
//! sensor reader, and the publisher. All I/O flows through port traits
//! injected at call sites, so the whole agent runs against mock adapters
//! in host tests.
//!
//! ```text
//!   TimePort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!   LinkPort ◀──▶│        TelemetryAgent        │
//! SensorPort ──▶ │ Scheduler · Gate · Publisher │ ──▶ HttpPort
//!                └──────────────────────────────┘
//! ```

use log::{debug, info};

use crate::config::AgentConfig;
use crate::connectivity::{ConnectivityGate, LinkPhase};
use crate::error::LinkError;
use crate::publisher::Publisher;
use crate::scheduler::IntervalScheduler;
use crate::sensors::SensorReader;

use super::cycle::{Cycle, CyclePorts, CycleStages};
use super::events::{AppEvent, CycleOutcome, CycleReport, CycleStats};
use super::ports::{EventSink, HttpPort, LinkPort, SensorPort, TimePort};

// ───────────────────────────────────────────────────────────────
// TelemetryAgent
// ───────────────────────────────────────────────────────────────

/// Scheduler-driven telemetry loop: check link, read, publish.
pub struct TelemetryAgent {
    config: AgentConfig,
    scheduler: IntervalScheduler,
    gate: ConnectivityGate,
    reader: SensorReader,
    publisher: Publisher,
    stats: CycleStats,
}

impl TelemetryAgent {
    /// Construct the agent from configuration.
    ///
    /// Does **not** touch the link — call [`start`](Self::start) next.
    pub fn new(config: AgentConfig) -> Self {
        Self {
            scheduler: IntervalScheduler::new(config.endpoint.publish_interval_ms),
            gate: ConnectivityGate::new(config.startup_retry_ms),
            reader: SensorReader::new(&config.sensor),
            publisher: Publisher::new(&config.endpoint),
            stats: CycleStats::default(),
            config,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start the link and block until it is up, then enter steady state.
    ///
    /// Returns the number of link polls the wait took. Fails only when
    /// the link driver cannot be started at all.
    pub fn start(
        &mut self,
        link: &mut impl LinkPort,
        time: &mut impl TimePort,
        sink: &mut impl EventSink,
    ) -> Result<u32, LinkError> {
        let attempts = self.gate.await_link(link, time)?;
        sink.emit(&AppEvent::LinkAcquired {
            attempts,
            ip: link.ip_addr(),
            rssi: link.rssi(),
        });

        sink.emit(&AppEvent::Started {
            identity: self.config.identity.clone(),
            url: self.config.endpoint.url_buf().clone(),
            interval_ms: self.config.endpoint.publish_interval_ms,
        });
        info!(
            "TelemetryAgent started: interval={} ms, timeout={} ms",
            self.config.endpoint.publish_interval_ms, self.config.endpoint.request_timeout_ms
        );
        Ok(attempts)
    }

    // ── Per-poll orchestration ────────────────────────────────

    /// Called from the main loop. Runs at most one cycle.
    ///
    /// Returns `None` while still in startup or when no cycle is due.
    pub fn poll(
        &mut self,
        now_ms: u64,
        link: &mut impl LinkPort,
        sensor: &mut impl SensorPort,
        http: &mut impl HttpPort,
        sink: &mut impl EventSink,
    ) -> Option<CycleOutcome> {
        if self.gate.phase() != LinkPhase::SteadyState {
            return None;
        }
        if !self.scheduler.poll(now_ms) {
            return None;
        }
        Some(self.run_cycle(now_ms, link, sensor, http, sink))
    }

    /// Run one cycle and report it. Only reachable through `poll`, after
    /// the phase and scheduler checks.
    fn run_cycle(
        &mut self,
        now_ms: u64,
        link: &mut impl LinkPort,
        sensor: &mut impl SensorPort,
        http: &mut impl HttpPort,
        sink: &mut impl EventSink,
    ) -> CycleOutcome {
        let mut stages = CycleStages {
            gate: &mut self.gate,
            reader: &self.reader,
            publisher: &self.publisher,
            identity: &self.config.identity,
        };
        let mut ports = CyclePorts { link, sensor, http };

        let mut cycle = Cycle::new();
        let outcome = cycle.run(&mut stages, &mut ports);
        self.stats.record(outcome);
        debug!("Cycle at {} ms: {}", now_ms, outcome);

        sink.emit(&AppEvent::Cycle(CycleReport {
            started_at_ms: now_ms,
            outcome,
            reading: cycle.reading(),
            fault: cycle.fault(),
            stats: self.stats,
        }));
        outcome
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn phase(&self) -> LinkPhase {
        self.gate.phase()
    }

    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    pub fn scheduler(&self) -> &IntervalScheduler {
        &self.scheduler
    }
}
