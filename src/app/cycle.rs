//! One publish cycle as an explicit step machine.
//!
//! ```text
//! ┌───────────┐  down   ┌──────────────────┐
//! │ CheckLink │────────▶│ RequestReconnect │──▶ End(SkippedNoLink)
//! └───────────┘         └──────────────────┘
//!       │ up
//!       ▼
//! ┌────────────┐ invalid
//! │ ReadSensor │────────▶ End(SkippedInvalidReading)
//! └────────────┘
//!       │ valid
//!       ▼
//! ┌──────────────────┐
//! │ Publish(reading) │──▶ End(Published | HttpError | TransportFailure)
//! └──────────────────┘
//! ```
//!
//! Waiting for the interval is the scheduler's job and happens before
//! [`CycleStep::CheckLink`]. A [`Cycle`] is built fresh for every tick
//! and dropped at `End`; nothing carries over.

use crate::connectivity::ConnectivityGate;
use crate::config::DeviceIdentity;
use crate::publisher::Publisher;
use crate::sensors::{Reading, SensorReader};

use super::events::{CycleFault, CycleOutcome};
use super::ports::{HttpPort, LinkPort, LinkState, SensorPort};

/// Position within one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStep {
    CheckLink,
    RequestReconnect,
    ReadSensor,
    Publish(Reading),
    End(CycleOutcome),
}

impl CycleStep {
    pub fn is_end(self) -> bool {
        matches!(self, Self::End(_))
    }
}

/// The stage components a cycle runs through. Borrowed from the agent
/// for the duration of one cycle.
pub struct CycleStages<'a> {
    pub gate: &'a mut ConnectivityGate,
    pub reader: &'a SensorReader,
    pub publisher: &'a Publisher,
    pub identity: &'a DeviceIdentity,
}

/// The ports a cycle touches.
pub struct CyclePorts<'a, L, S, H> {
    pub link: &'a mut L,
    pub sensor: &'a mut S,
    pub http: &'a mut H,
}

/// State of one in-flight cycle.
#[derive(Debug, Clone, Copy)]
pub struct Cycle {
    step: CycleStep,
    reading: Option<Reading>,
    fault: Option<CycleFault>,
}

impl Default for Cycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Cycle {
    pub fn new() -> Self {
        Self {
            step: CycleStep::CheckLink,
            reading: None,
            fault: None,
        }
    }

    pub fn step(&self) -> CycleStep {
        self.step
    }

    /// The validated reading, once `ReadSensor` has succeeded.
    pub fn reading(&self) -> Option<Reading> {
        self.reading
    }

    pub fn fault(&self) -> Option<CycleFault> {
        self.fault
    }

    /// Terminal outcome, if the cycle has ended.
    pub fn outcome(&self) -> Option<CycleOutcome> {
        match self.step {
            CycleStep::End(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Execute the current step and move to the next one. Calling this
    /// at `End` is a no-op.
    pub fn advance<L, S, H>(
        &mut self,
        stages: &mut CycleStages<'_>,
        ports: &mut CyclePorts<'_, L, S, H>,
    ) -> CycleStep
    where
        L: LinkPort,
        S: SensorPort,
        H: HttpPort,
    {
        self.step = match self.step {
            CycleStep::CheckLink => match stages.gate.check(ports.link) {
                LinkState::Connected => CycleStep::ReadSensor,
                LinkState::Disconnected => CycleStep::RequestReconnect,
            },

            CycleStep::RequestReconnect => {
                stages.gate.request_reconnect(ports.link);
                CycleStep::End(CycleOutcome::SkippedNoLink)
            }

            CycleStep::ReadSensor => match stages.reader.read(ports.sensor) {
                Ok(reading) => {
                    self.reading = Some(reading);
                    CycleStep::Publish(reading)
                }
                Err(e) => {
                    self.fault = Some(CycleFault::Sensor(e));
                    CycleStep::End(CycleOutcome::SkippedInvalidReading)
                }
            },

            CycleStep::Publish(reading) => {
                match stages
                    .publisher
                    .publish(ports.http, &reading, stages.identity)
                {
                    Ok(outcome) => CycleStep::End(outcome),
                    Err(e) => {
                        self.fault = Some(CycleFault::Transport(e));
                        CycleStep::End(CycleOutcome::TransportFailure)
                    }
                }
            }

            end @ CycleStep::End(_) => end,
        };
        self.step
    }

    /// Step until `End` and return the outcome.
    pub fn run<L, S, H>(
        &mut self,
        stages: &mut CycleStages<'_>,
        ports: &mut CyclePorts<'_, L, S, H>,
    ) -> CycleOutcome
    where
        L: LinkPort,
        S: SensorPort,
        H: HttpPort,
    {
        loop {
            if let CycleStep::End(outcome) = self.advance(stages, ports) {
                return outcome;
            }
        }
    }
}
