//! GreenGuard Firmware — Main Entry Point
//!
//! Hexagonal architecture, single-threaded run-to-completion loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  Dht (SensorPort)    WifiAdapter (LinkPort)   LogEventSink     │
//! │  HttpClientAdapter (HttpPort)   Esp32TimeAdapter (TimePort)    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            TelemetryAgent (pure logic)                 │    │
//! │  │  IntervalScheduler · ConnectivityGate · Publisher      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::info;

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_hal::delay::Ets;
use esp_idf_hal::gpio::{AnyIOPin, PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use greenguard::adapters::device_id::NodeMac;
use greenguard::adapters::http::HttpClientAdapter;
use greenguard::adapters::log_sink::LogEventSink;
use greenguard::adapters::time::Esp32TimeAdapter;
use greenguard::adapters::wifi::WifiAdapter;
use greenguard::app::ports::TimePort;
use greenguard::app::service::TelemetryAgent;
use greenguard::config::AgentConfig;
use greenguard::error::Error;
use greenguard::sensors::dht::Dht;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  GreenGuard v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let mac = NodeMac::read();
    let config = AgentConfig::from_build_env(&mac.fallback_sensor_id()).map_err(Error::from)?;
    info!("Node {}", mac.hostname());
    info!(
        "Config: {}",
        serde_json::to_string(&config).unwrap_or_default()
    );

    // ── 3. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // SAFETY: the sensor GPIO is not claimed anywhere else; only the
    // modem is taken from `peripherals`.
    let data_pin = unsafe { AnyIOPin::new(config.sensor.gpio) };
    let mut line = PinDriver::input_output_od(data_pin)?;
    line.set_pull(Pull::Up)?;
    let mut sensor = Dht::new(line, Ets, config.sensor.kind).map_err(Error::from)?;

    let mut wifi = WifiAdapter::new(
        peripherals.modem,
        sysloop,
        Some(nvs),
        config.network.clone(),
    )?;
    wifi.set_hostname(&mac.hostname())
        .map_err(Error::from)?;

    let mut http = HttpClientAdapter::new();
    let mut time = Esp32TimeAdapter::new();
    let mut sink = LogEventSink::new();

    // ── 4. Startup: block until WiFi is up ────────────────────
    let idle_poll_ms = config.idle_poll_ms;
    let mut agent = TelemetryAgent::new(config);
    agent
        .start(&mut wifi, &mut time, &mut sink)
        .map_err(Error::from)?;

    // ── 5. Main loop ──────────────────────────────────────────
    info!("System ready. Entering main loop.");
    loop {
        let now = time.now_ms();
        let _ = agent.poll(now, &mut wifi, &mut sensor, &mut http, &mut sink);
        // Sleep until the next cycle is due, at most one idle period.
        let wait = agent
            .scheduler()
            .remaining_ms(time.now_ms())
            .min(u64::from(idle_poll_ms))
            .max(1);
        time.delay_ms(wait as u32);
    }
}
