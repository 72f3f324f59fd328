//! WiFi station-mode adapter.
//!
//! Implements [`LinkPort`] — the hexagonal boundary for network
//! connectivity. The driver owns the link state; this adapter only
//! starts it, reports what it sees, and forwards reconnect requests.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver via `esp_idf_svc::wifi`.
//! - **all other targets**: deterministic simulation for host-side tests.
//!
//! Neither `begin()` nor `request_reconnect()` waits for association;
//! the agent's startup wait and per-cycle checks poll `link_state()`.

use core::net::Ipv4Addr;

use log::{info, warn};

use crate::app::ports::{LinkPort, LinkState};
use crate::config::{validate_password, validate_ssid, NetworkConfig};
use crate::error::LinkError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    network: NetworkConfig,
    started: bool,
    #[cfg(target_os = "espidf")]
    wifi: EspWifi<'static>,
    #[cfg(not(target_os = "espidf"))]
    sim: SimRadio,
}

/// Host-side radio model: associates after a fixed number of state polls
/// once started, and can be forced down to exercise the reconnect path.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone, Default)]
struct SimRadio {
    connect_after_polls: u32,
    polls_since_connect: u32,
    connecting: bool,
    up: bool,
    reconnect_requests: u32,
}

impl WifiAdapter {
    /// Take the modem and prepare a station interface. Does not start it.
    #[cfg(target_os = "espidf")]
    pub fn new(
        modem: esp_idf_svc::hal::modem::Modem,
        sysloop: esp_idf_svc::eventloop::EspSystemEventLoop,
        nvs: Option<esp_idf_svc::nvs::EspDefaultNvsPartition>,
        network: NetworkConfig,
    ) -> anyhow::Result<Self> {
        let wifi = EspWifi::new(modem, sysloop, nvs)?;
        Ok(Self {
            network,
            started: false,
            wifi,
        })
    }

    /// Simulated station that associates on the first poll after `begin()`.
    #[cfg(not(target_os = "espidf"))]
    pub fn new(network: NetworkConfig) -> Self {
        Self::with_connect_delay(network, 0)
    }

    /// Simulated station that stays down for `polls` link-state polls
    /// after each connect.
    #[cfg(not(target_os = "espidf"))]
    pub fn with_connect_delay(network: NetworkConfig, polls: u32) -> Self {
        Self {
            network,
            started: false,
            sim: SimRadio {
                connect_after_polls: polls,
                ..SimRadio::default()
            },
        }
    }

    /// DHCP hostname announced by the station interface.
    #[cfg(target_os = "espidf")]
    pub fn set_hostname(&mut self, hostname: &str) -> Result<(), LinkError> {
        self.wifi.sta_netif_mut().set_hostname(hostname).map_err(|e| {
            warn!("WiFi: set_hostname failed: {}", e);
            LinkError::DriverFailed
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn set_hostname(&mut self, hostname: &str) -> Result<(), LinkError> {
        info!("WiFi(sim): hostname '{}'", hostname);
        Ok(())
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_begin(&mut self) -> Result<(), LinkError> {
        let auth_method = if self.network.is_open() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let config = Configuration::Client(ClientConfiguration {
            ssid: self
                .network
                .ssid()
                .try_into()
                .map_err(|_| LinkError::InvalidSsid)?,
            password: self
                .network
                .password()
                .try_into()
                .map_err(|_| LinkError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });

        self.wifi.set_configuration(&config).map_err(|e| {
            log::error!("WiFi: set_configuration failed: {}", e);
            LinkError::DriverFailed
        })?;
        self.wifi.start().map_err(|e| {
            log::error!("WiFi: start failed: {}", e);
            LinkError::DriverFailed
        })?;
        self.platform_connect();
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_begin(&mut self) -> Result<(), LinkError> {
        self.platform_connect();
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) {
        // Non-blocking: association completes in the driver task.
        if let Err(e) = self.wifi.connect() {
            warn!("WiFi: connect request failed: {}", e);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) {
        if self.sim.up {
            return;
        }
        self.sim.connecting = true;
        self.sim.polls_since_connect = 0;
    }

    #[cfg(target_os = "espidf")]
    fn platform_link_state(&mut self) -> LinkState {
        let associated = self.wifi.is_connected().unwrap_or(false);
        let netif_up = self.wifi.sta_netif().is_up().unwrap_or(false);
        if associated && netif_up {
            LinkState::Connected
        } else {
            LinkState::Disconnected
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_link_state(&mut self) -> LinkState {
        if self.sim.connecting {
            if self.sim.polls_since_connect >= self.sim.connect_after_polls {
                self.sim.connecting = false;
                self.sim.up = true;
                info!("WiFi(sim): associated with '{}'", self.network.ssid());
            } else {
                self.sim.polls_since_connect += 1;
            }
        }
        if self.sim.up {
            LinkState::Connected
        } else {
            LinkState::Disconnected
        }
    }

    #[cfg(target_os = "espidf")]
    fn platform_ip(&self) -> Option<Ipv4Addr> {
        self.wifi.sta_netif().get_ip_info().ok().map(|info| info.ip)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_ip(&self) -> Option<Ipv4Addr> {
        self.sim.up.then_some(Ipv4Addr::new(192, 168, 2, 50))
    }

    #[cfg(target_os = "espidf")]
    fn platform_rssi(&self) -> Option<i8> {
        let mut ap_info = esp_idf_svc::sys::wifi_ap_record_t::default();
        // SAFETY: ap_info is a valid, writable record for the duration of the call.
        let rc = unsafe { esp_idf_svc::sys::esp_wifi_sta_get_ap_info(&mut ap_info) };
        (rc == esp_idf_svc::sys::ESP_OK as esp_idf_svc::sys::esp_err_t).then_some(ap_info.rssi)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_rssi(&self) -> Option<i8> {
        self.sim.up.then_some(-61)
    }
}

// ───────────────────────────────────────────────────────────────
// Simulation controls
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
impl WifiAdapter {
    /// Drop the link as if the AP went away.
    pub fn sim_drop_link(&mut self) {
        warn!("WiFi(sim): link dropped");
        self.sim.up = false;
        self.sim.connecting = false;
    }

    pub fn sim_reconnect_requests(&self) -> u32 {
        self.sim.reconnect_requests
    }
}

// ───────────────────────────────────────────────────────────────
// LinkPort
// ───────────────────────────────────────────────────────────────

impl LinkPort for WifiAdapter {
    fn begin(&mut self) -> Result<(), LinkError> {
        if self.network.ssid().is_empty() {
            return Err(LinkError::NoCredentials);
        }
        validate_ssid(self.network.ssid())?;
        validate_password(self.network.password())?;

        info!("WiFi: starting station for '{}'", self.network.ssid());
        self.platform_begin()?;
        self.started = true;
        Ok(())
    }

    fn link_state(&mut self) -> LinkState {
        if !self.started {
            return LinkState::Disconnected;
        }
        self.platform_link_state()
    }

    fn request_reconnect(&mut self) {
        if !self.started {
            return;
        }
        #[cfg(not(target_os = "espidf"))]
        {
            self.sim.reconnect_requests += 1;
        }
        self.platform_connect();
    }

    fn ip_addr(&self) -> Option<Ipv4Addr> {
        self.platform_ip()
    }

    fn rssi(&self) -> Option<i8> {
        self.platform_rssi()
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
