//! Integration tests for the startup link wait and the transition into
//! steady state.

use crate::mock_ports::{EventLog, MockClock, MockHttp, MockLink, MockSensor};

use greenguard::adapters::wifi::WifiAdapter;
use greenguard::app::events::{AppEvent, CycleOutcome};
use greenguard::app::ports::LinkState;
use greenguard::app::service::TelemetryAgent;
use greenguard::config::{AgentConfig, NetworkConfig};
use greenguard::connectivity::LinkPhase;
use greenguard::error::LinkError;

#[test]
fn startup_blocks_until_link_is_up_with_fixed_retry() {
    let mut agent = TelemetryAgent::new(AgentConfig::default());
    let mut link = MockLink::up_after(6);
    let mut clock = MockClock::default();
    let mut sink = EventLog::default();

    let attempts = agent.start(&mut link, &mut clock, &mut sink).unwrap();

    assert_eq!(link.begin_calls, 1);
    assert_eq!(attempts, 7);
    assert_eq!(clock.delays, vec![500; 6]);
    assert_eq!(clock.now, 3_000);
    assert_eq!(link.reconnect_requests, 0, "startup only polls");
    assert_eq!(agent.phase(), LinkPhase::SteadyState);
}

#[test]
fn startup_reports_link_details_then_banner() {
    let mut agent = TelemetryAgent::new(AgentConfig::default());
    let mut sink = EventLog::default();
    agent
        .start(&mut MockLink::up(), &mut MockClock::default(), &mut sink)
        .unwrap();

    assert_eq!(sink.events.len(), 2);
    match &sink.events[0] {
        AppEvent::LinkAcquired { attempts, ip, rssi } => {
            assert_eq!(*attempts, 1);
            assert_eq!(ip.map(|a| a.octets()), Some([10, 0, 0, 7]));
            assert_eq!(*rssi, Some(-58));
        }
        other => panic!("expected LinkAcquired, got {other:?}"),
    }
    match &sink.events[1] {
        AppEvent::Started {
            identity,
            interval_ms,
            ..
        } => {
            assert_eq!(identity.location(), "Sheridan Forest Oakville");
            assert_eq!(*interval_ms, 10_000);
        }
        other => panic!("expected Started, got {other:?}"),
    }
}

#[test]
fn driver_that_cannot_start_is_a_startup_error() {
    let mut agent = TelemetryAgent::new(AgentConfig::default());
    let mut link = MockLink::up();
    link.begin_result = Err(LinkError::DriverFailed);
    let mut sink = EventLog::default();

    assert_eq!(
        agent.start(&mut link, &mut MockClock::default(), &mut sink),
        Err(LinkError::DriverFailed)
    );
    assert_eq!(agent.phase(), LinkPhase::Startup);
    assert!(sink.events.is_empty());
}

#[test]
fn no_cycles_run_until_startup_completes() {
    let mut agent = TelemetryAgent::new(AgentConfig::default());
    let mut link = MockLink::up();
    let mut sensor = MockSensor::reading(21.5);
    let mut http = MockHttp::status(200);
    let mut sink = EventLog::default();

    assert_eq!(
        agent.poll(50_000, &mut link, &mut sensor, &mut http, &mut sink),
        None
    );
    assert_eq!(link.state_polls, 0);
    assert!(http.calls.is_empty());
}

#[test]
fn first_cycle_is_one_interval_after_boot() {
    let mut agent = TelemetryAgent::new(AgentConfig::default());
    let mut link = MockLink::up_after(4);
    let mut clock = MockClock::default();
    let mut sink = EventLog::default();
    agent.start(&mut link, &mut clock, &mut sink).unwrap();
    assert_eq!(clock.now, 2_000);

    let mut sensor = MockSensor::reading(21.5);
    let mut http = MockHttp::status(200);
    assert_eq!(
        agent.poll(9_900, &mut link, &mut sensor, &mut http, &mut sink),
        None
    );
    assert_eq!(
        agent.poll(10_000, &mut link, &mut sensor, &mut http, &mut sink),
        Some(CycleOutcome::Published)
    );
}

#[test]
fn simulated_wifi_drives_full_lifecycle() {
    let network = NetworkConfig::new("GreenGuardNet", "forest-secret").unwrap();
    let mut wifi = WifiAdapter::with_connect_delay(network, 3);
    let mut agent = TelemetryAgent::new(AgentConfig::default());
    let mut clock = MockClock::default();
    let mut sink = EventLog::default();

    let attempts = agent.start(&mut wifi, &mut clock, &mut sink).unwrap();
    assert_eq!(attempts, 4);

    let mut sensor = MockSensor::reading(18.04);
    let mut http = MockHttp::status(200);
    assert_eq!(
        agent.poll(10_000, &mut wifi, &mut sensor, &mut http, &mut sink),
        Some(CycleOutcome::Published)
    );

    wifi.sim_drop_link();
    assert_eq!(
        agent.poll(20_000, &mut wifi, &mut sensor, &mut http, &mut sink),
        Some(CycleOutcome::SkippedNoLink)
    );
    assert_eq!(wifi.sim_reconnect_requests(), 1);
    assert_eq!(http.calls.len(), 1);

    // The reconnect issued last cycle completes after the configured polls.
    for _ in 0..3 {
        let _ = greenguard::app::ports::LinkPort::link_state(&mut wifi);
    }
    assert_eq!(
        greenguard::app::ports::LinkPort::link_state(&mut wifi),
        LinkState::Connected
    );
    assert_eq!(
        agent.poll(30_000, &mut wifi, &mut sensor, &mut http, &mut sink),
        Some(CycleOutcome::Published)
    );
}
