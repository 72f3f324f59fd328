//! Integration tests for the scheduler → link check → sensor → publish
//! pipeline, driven through `TelemetryAgent::poll` with mock ports.

use crate::mock_ports::{EventLog, MockClock, MockHttp, MockLink, MockSensor};

use greenguard::app::events::{CycleFault, CycleOutcome};
use greenguard::app::service::TelemetryAgent;
use greenguard::config::AgentConfig;
use greenguard::error::{SensorError, TransportError};
use greenguard::sensors::Reading;

const INTERVAL: u64 = 10_000;

/// Agent already past startup, with the link up.
fn started_agent() -> (TelemetryAgent, EventLog) {
    let mut agent = TelemetryAgent::new(AgentConfig::default());
    let mut sink = EventLog::default();
    agent
        .start(&mut MockLink::up(), &mut MockClock::default(), &mut sink)
        .expect("startup");
    sink.events.clear();
    (agent, sink)
}

// ── Scheduling ───────────────────────────────────────────────

#[test]
fn no_cycle_before_interval_elapses() {
    let (mut agent, mut sink) = started_agent();
    let mut link = MockLink::up();
    let mut sensor = MockSensor::reading(21.5);
    let mut http = MockHttp::status(200);

    for now in (0..INTERVAL).step_by(100) {
        assert_eq!(
            agent.poll(now, &mut link, &mut sensor, &mut http, &mut sink),
            None
        );
    }
    assert_eq!(sensor.reads, 0);
    assert!(http.calls.is_empty());
    assert!(sink.events.is_empty());
}

#[test]
fn exactly_one_cycle_per_interval_and_timestamp_advances() {
    let (mut agent, mut sink) = started_agent();
    let mut link = MockLink::up();
    let mut sensor = MockSensor::reading(21.5);
    let mut http = MockHttp::status(200);

    let mut fired = Vec::new();
    // Poll every 100 ms for 35 s.
    for now in (0..35_000).step_by(100) {
        if agent
            .poll(now, &mut link, &mut sensor, &mut http, &mut sink)
            .is_some()
        {
            fired.push(now);
        }
    }
    assert_eq!(fired, vec![10_000, 20_000, 30_000]);
    assert_eq!(http.calls.len(), 3);
    assert_eq!(agent.scheduler().last_attempt_ms(), 30_000);
}

#[test]
fn failed_cycle_is_not_retried_early() {
    let (mut agent, mut sink) = started_agent();
    let mut link = MockLink::up();
    let mut sensor = MockSensor::reading(21.5);
    let mut http = MockHttp::unreachable();

    assert_eq!(
        agent.poll(10_000, &mut link, &mut sensor, &mut http, &mut sink),
        Some(CycleOutcome::TransportFailure)
    );
    assert_eq!(
        agent.poll(10_100, &mut link, &mut sensor, &mut http, &mut sink),
        None
    );
    assert_eq!(
        agent.poll(19_999, &mut link, &mut sensor, &mut http, &mut sink),
        None
    );
    assert_eq!(http.calls.len(), 1, "no retry inside the interval");
}

// ── Link gate ────────────────────────────────────────────────

#[test]
fn link_down_skips_read_and_publish_and_requests_one_reconnect() {
    let (mut agent, mut sink) = started_agent();
    let mut link = MockLink::down();
    let mut sensor = MockSensor::reading(21.5);
    let mut http = MockHttp::status(200);

    let out = agent.poll(10_000, &mut link, &mut sensor, &mut http, &mut sink);
    assert_eq!(out, Some(CycleOutcome::SkippedNoLink));
    assert_eq!(link.reconnect_requests, 1);
    assert_eq!(link.state_polls, 1, "gate must not wait for the link");
    assert_eq!(sensor.reads, 0);
    assert!(http.calls.is_empty());

    // Next interval: still down, one more request.
    agent.poll(20_000, &mut link, &mut sensor, &mut http, &mut sink);
    assert_eq!(link.reconnect_requests, 2);
}

#[test]
fn link_recovery_resumes_publishing() {
    let (mut agent, mut sink) = started_agent();
    let mut link = MockLink::down();
    let mut sensor = MockSensor::reading(21.5);
    let mut http = MockHttp::status(200);

    agent.poll(10_000, &mut link, &mut sensor, &mut http, &mut sink);
    link.state = greenguard::app::ports::LinkState::Connected;
    assert_eq!(
        agent.poll(20_000, &mut link, &mut sensor, &mut http, &mut sink),
        Some(CycleOutcome::Published)
    );
    assert_eq!(agent.stats().skipped_no_link, 1);
    assert_eq!(agent.stats().published, 1);
}

// ── Sensor ───────────────────────────────────────────────────

#[test]
fn nan_reading_is_skipped_without_http() {
    let (mut agent, mut sink) = started_agent();
    let mut link = MockLink::up();
    let mut sensor = MockSensor::reading(f32::NAN);
    let mut http = MockHttp::status(200);

    let out = agent.poll(10_000, &mut link, &mut sensor, &mut http, &mut sink);
    assert_eq!(out, Some(CycleOutcome::SkippedInvalidReading));
    assert_eq!(sensor.reads, 1, "no sensor retry");
    assert!(http.calls.is_empty());

    let report = sink.cycle_reports()[0];
    assert_eq!(report.fault, Some(CycleFault::Sensor(SensorError::NotFinite)));
    assert_eq!(report.reading, None);
}

#[test]
fn driver_error_is_skipped_without_http() {
    let (mut agent, mut sink) = started_agent();
    let mut link = MockLink::up();
    let mut sensor = MockSensor::failing(SensorError::ChecksumMismatch);
    let mut http = MockHttp::status(200);

    let out = agent.poll(10_000, &mut link, &mut sensor, &mut http, &mut sink);
    assert_eq!(out, Some(CycleOutcome::SkippedInvalidReading));
    assert!(http.calls.is_empty());
}

#[test]
fn published_value_is_rounded_to_tenths() {
    let (mut agent, mut sink) = started_agent();
    let mut link = MockLink::up();
    let mut http = MockHttp::status(200);

    let mut sensor = MockSensor::reading(23.449);
    agent.poll(10_000, &mut link, &mut sensor, &mut http, &mut sink);
    let mut sensor = MockSensor::reading(23.45);
    agent.poll(20_000, &mut link, &mut sensor, &mut http, &mut sink);

    let temps: Vec<f64> = http
        .calls
        .iter()
        .map(|c| {
            let v: serde_json::Value = serde_json::from_slice(&c.body).unwrap();
            v["temperature"].as_f64().unwrap()
        })
        .collect();
    assert_eq!(temps, vec![23.4, 23.5]);
}

// ── Publisher ────────────────────────────────────────────────

#[test]
fn connected_cycle_posts_exact_payload() {
    let (mut agent, mut sink) = started_agent();
    let mut link = MockLink::up();
    let mut sensor = MockSensor::reading(21.5);
    let mut http = MockHttp::status(200);

    let out = agent.poll(10_000, &mut link, &mut sensor, &mut http, &mut sink);
    assert_eq!(out, Some(CycleOutcome::Published));
    assert_eq!(http.calls.len(), 1);

    let call = &http.calls[0];
    assert_eq!(call.url, "http://192.168.2.164:5000/api/temperature");
    assert!(
        call.headers
            .iter()
            .any(|(k, v)| k == "Content-Type" && v == "application/json")
    );
    assert_eq!(call.timeout, std::time::Duration::from_millis(5_000));
    assert_eq!(
        http.last_body_json().unwrap(),
        serde_json::json!({
            "temperature": 21.5,
            "sensor_id": "sensor01",
            "location": "Sheridan Forest Oakville"
        })
    );

    let report = sink.cycle_reports()[0];
    assert_eq!(report.reading, Some(Reading::from_tenths(215)));
    assert_eq!(report.started_at_ms, 10_000);
    assert_eq!(report.stats.published, 1);
}

#[test]
fn server_error_is_http_error_without_retry() {
    let (mut agent, mut sink) = started_agent();
    let mut link = MockLink::up();
    let mut sensor = MockSensor::reading(21.5);
    let mut http = MockHttp::status(500);

    let out = agent.poll(10_000, &mut link, &mut sensor, &mut http, &mut sink);
    assert_eq!(out, Some(CycleOutcome::HttpError(500)));
    assert_eq!(http.calls.len(), 1);
}

#[test]
fn no_response_is_transport_failure_without_retry() {
    let (mut agent, mut sink) = started_agent();
    let mut link = MockLink::up();
    let mut sensor = MockSensor::reading(21.5);
    let mut http = MockHttp {
        reply: Err(TransportError::Timeout),
        calls: Vec::new(),
    };

    let out = agent.poll(10_000, &mut link, &mut sensor, &mut http, &mut sink);
    assert_eq!(out, Some(CycleOutcome::TransportFailure));
    assert_eq!(http.calls.len(), 1);
    assert_eq!(
        sink.cycle_reports()[0].fault,
        Some(CycleFault::Transport(TransportError::Timeout))
    );
}

// ── Idempotence ──────────────────────────────────────────────

#[test]
fn identical_cycles_yield_identical_outcomes() {
    let (mut agent, mut sink) = started_agent();
    let mut link = MockLink::up();
    let mut sensor = MockSensor::reading(19.96);
    let mut http = MockHttp::status(200);

    let outcomes: Vec<_> = (1..=5)
        .filter_map(|i| agent.poll(i * INTERVAL, &mut link, &mut sensor, &mut http, &mut sink))
        .collect();
    assert_eq!(outcomes, vec![CycleOutcome::Published; 5]);

    let bodies: Vec<_> = http.calls.iter().map(|c| c.body.clone()).collect();
    assert!(bodies.windows(2).all(|w| w[0] == w[1]));
}
