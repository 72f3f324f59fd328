//! Mock port adapters for integration tests.
//!
//! Each mock records every call so tests can assert on the full
//! interaction history without real WiFi, GPIO, or sockets.

use std::collections::VecDeque;
use std::time::Duration;

use greenguard::app::events::AppEvent;
use greenguard::app::ports::{EventSink, HttpPort, LinkPort, LinkState, SensorPort, TimePort};
use greenguard::error::{LinkError, SensorError, TransportError};

// ── Link ──────────────────────────────────────────────────────

/// Link whose state is set directly by the test, or scripted per poll.
pub struct MockLink {
    pub state: LinkState,
    /// Consumed one per `link_state()` call before falling back to `state`.
    pub script: VecDeque<LinkState>,
    pub begin_result: Result<(), LinkError>,
    pub begin_calls: u32,
    pub state_polls: u32,
    pub reconnect_requests: u32,
}

#[allow(dead_code)]
impl MockLink {
    pub fn up() -> Self {
        Self::with_state(LinkState::Connected)
    }

    pub fn down() -> Self {
        Self::with_state(LinkState::Disconnected)
    }

    fn with_state(state: LinkState) -> Self {
        Self {
            state,
            script: VecDeque::new(),
            begin_result: Ok(()),
            begin_calls: 0,
            state_polls: 0,
            reconnect_requests: 0,
        }
    }

    /// Down for `polls` state polls, then up.
    pub fn up_after(polls: usize) -> Self {
        let mut link = Self::up();
        link.script = std::iter::repeat_n(LinkState::Disconnected, polls).collect();
        link
    }
}

impl LinkPort for MockLink {
    fn begin(&mut self) -> Result<(), LinkError> {
        self.begin_calls += 1;
        self.begin_result
    }

    fn link_state(&mut self) -> LinkState {
        self.state_polls += 1;
        self.script.pop_front().unwrap_or(self.state)
    }

    fn request_reconnect(&mut self) {
        self.reconnect_requests += 1;
    }

    fn ip_addr(&self) -> Option<core::net::Ipv4Addr> {
        (self.state == LinkState::Connected).then_some(core::net::Ipv4Addr::new(10, 0, 0, 7))
    }

    fn rssi(&self) -> Option<i8> {
        (self.state == LinkState::Connected).then_some(-58)
    }
}

// ── Sensor ────────────────────────────────────────────────────

/// Sensor returning `value` on every acquisition.
pub struct MockSensor {
    pub value: Result<f32, SensorError>,
    pub reads: u32,
}

impl MockSensor {
    pub fn reading(value: f32) -> Self {
        Self {
            value: Ok(value),
            reads: 0,
        }
    }

    pub fn failing(e: SensorError) -> Self {
        Self {
            value: Err(e),
            reads: 0,
        }
    }
}

impl SensorPort for MockSensor {
    fn acquire(&mut self) -> Result<f32, SensorError> {
        self.reads += 1;
        self.value
    }
}

// ── HTTP ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct PostCall {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub timeout: Duration,
}

/// HTTP client that answers every POST with `reply`.
pub struct MockHttp {
    pub reply: Result<u16, TransportError>,
    pub calls: Vec<PostCall>,
}

#[allow(dead_code)]
impl MockHttp {
    pub fn status(code: u16) -> Self {
        Self {
            reply: Ok(code),
            calls: Vec::new(),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reply: Err(TransportError::Connect),
            calls: Vec::new(),
        }
    }

    pub fn last_body_json(&self) -> Option<serde_json::Value> {
        self.calls
            .last()
            .and_then(|c| serde_json::from_slice(&c.body).ok())
    }
}

impl HttpPort for MockHttp {
    fn post(
        &mut self,
        url: &str,
        headers: &[(&str, &str)],
        body: &[u8],
        timeout: Duration,
    ) -> Result<u16, TransportError> {
        self.calls.push(PostCall {
            url: url.to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            body: body.to_vec(),
            timeout,
        });
        self.reply
    }
}

// ── Time ──────────────────────────────────────────────────────

/// Manually advanced clock. `delay_ms` advances it and is recorded.
#[derive(Default)]
pub struct MockClock {
    pub now: u64,
    pub delays: Vec<u32>,
}

impl TimePort for MockClock {
    fn now_ms(&self) -> u64 {
        self.now
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays.push(ms);
        self.now += u64::from(ms);
    }
}

// ── Event sink ────────────────────────────────────────────────

/// Collects every emitted event.
#[derive(Default)]
pub struct EventLog {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl EventLog {
    pub fn cycle_reports(&self) -> Vec<greenguard::app::events::CycleReport> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::Cycle(r) => Some(*r),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
