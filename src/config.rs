//! Agent configuration.
//!
//! Everything the node needs is compiled in: WiFi credentials, the
//! dashboard URL, the device identity, sensor wiring, and timing. The
//! [`AgentConfig`] is built once in `main` and threaded through every
//! component by reference; nothing reads ambient constants at runtime.
//!
//! Build-time overrides come from `GREENGUARD_*` environment variables
//! (see [`AgentConfig::from_build_env`]); anything unset falls back to the
//! reference deployment in [`AgentConfig::default`].

use core::fmt;
use core::time::Duration;

use serde::Serialize;

use crate::error::{ConfigError, LinkError};
use crate::sensors::dht::SensorKind;

/// Maximum server URL length in bytes.
pub const MAX_URL_LEN: usize = 128;
/// Maximum sensor id length in bytes.
pub const MAX_SENSOR_ID_LEN: usize = 32;
/// Maximum location label length in bytes.
pub const MAX_LOCATION_LEN: usize = 64;

pub const DEFAULT_SERVER_URL: &str = "http://192.168.2.164:5000/api/temperature";
pub const DEFAULT_SENSOR_ID: &str = "sensor01";
pub const DEFAULT_LOCATION: &str = "Sheridan Forest Oakville";
pub const DEFAULT_WIFI_SSID: &str = "SSID";
pub const DEFAULT_WIFI_PASSWORD: &str = "PASSWORD";

pub const DEFAULT_PUBLISH_INTERVAL_MS: u32 = 10_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u32 = 5_000;
pub const DEFAULT_STARTUP_RETRY_MS: u32 = 500;
pub const DEFAULT_IDLE_POLL_MS: u32 = 100;
pub const DEFAULT_SENSOR_GPIO: i32 = 15;

// ---------------------------------------------------------------------------
// Device identity
// ---------------------------------------------------------------------------

/// Who is reporting. Fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceIdentity {
    sensor_id: heapless::String<MAX_SENSOR_ID_LEN>,
    location: heapless::String<MAX_LOCATION_LEN>,
}

impl DeviceIdentity {
    pub fn new(sensor_id: &str, location: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            sensor_id: bounded(sensor_id, "sensor_id")?,
            location: bounded(location, "location")?,
        })
    }

    pub fn sensor_id(&self) -> &str {
        &self.sensor_id
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

// ---------------------------------------------------------------------------
// Endpoint
// ---------------------------------------------------------------------------

/// Where and how often readings are sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointConfig {
    url: heapless::String<MAX_URL_LEN>,
    /// Upper bound on one HTTP POST (milliseconds).
    pub request_timeout_ms: u32,
    /// Time between cycle attempts (milliseconds).
    pub publish_interval_ms: u32,
}

impl EndpointConfig {
    pub fn new(
        url: &str,
        request_timeout_ms: u32,
        publish_interval_ms: u32,
    ) -> Result<Self, ConfigError> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::UnsupportedScheme);
        }
        Ok(Self {
            url: bounded(url, "server_url")?,
            request_timeout_ms,
            publish_interval_ms,
        })
    }

    /// The bounded URL buffer, for components that keep their own copy.
    pub fn url_buf(&self) -> &heapless::String<MAX_URL_LEN> {
        &self.url
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.request_timeout_ms))
    }
}

// ---------------------------------------------------------------------------
// WiFi credentials
// ---------------------------------------------------------------------------

/// Station credentials. The password never appears in `Debug` output or
/// serialised config dumps.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct NetworkConfig {
    ssid: heapless::String<32>,
    #[serde(skip_serializing)]
    password: heapless::String<64>,
}

impl NetworkConfig {
    pub fn new(ssid: &str, password: &str) -> Result<Self, ConfigError> {
        validate_ssid(ssid).map_err(ConfigError::Credentials)?;
        validate_password(password).map_err(ConfigError::Credentials)?;
        Ok(Self {
            ssid: bounded(ssid, "wifi_ssid")?,
            password: bounded_allow_empty(password, "wifi_password")?,
        })
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Open network (no passphrase).
    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

impl fmt::Debug for NetworkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkConfig")
            .field("ssid", &self.ssid)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

/// SSID must be 1-32 printable ASCII bytes.
pub fn validate_ssid(ssid: &str) -> Result<(), LinkError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(LinkError::InvalidSsid);
    }
    Ok(())
}

/// Password must be empty (open network) or 8-64 bytes (WPA2).
pub fn validate_password(password: &str) -> Result<(), LinkError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(LinkError::InvalidPassword);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Sensor wiring
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensorConfig {
    /// GPIO connected to the sensor DATA line.
    pub gpio: i32,
    pub kind: SensorKind,
    /// Lowest temperature accepted as a real reading (°C).
    pub min_valid_c: f32,
    /// Highest temperature accepted as a real reading (°C).
    pub max_valid_c: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            gpio: DEFAULT_SENSOR_GPIO,
            kind: SensorKind::Dht11,
            min_valid_c: -40.0,
            max_valid_c: 80.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level configuration
// ---------------------------------------------------------------------------

/// Immutable configuration for the whole agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentConfig {
    pub identity: DeviceIdentity,
    pub endpoint: EndpointConfig,
    pub network: NetworkConfig,
    pub sensor: SensorConfig,
    /// Delay between link polls while waiting for the first connection.
    pub startup_retry_ms: u32,
    /// Main loop sleep between scheduler polls.
    pub idle_poll_ms: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            identity: DeviceIdentity {
                sensor_id: fixed(DEFAULT_SENSOR_ID),
                location: fixed(DEFAULT_LOCATION),
            },
            endpoint: EndpointConfig {
                url: fixed(DEFAULT_SERVER_URL),
                request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
                publish_interval_ms: DEFAULT_PUBLISH_INTERVAL_MS,
            },
            network: NetworkConfig {
                ssid: fixed(DEFAULT_WIFI_SSID),
                password: fixed(DEFAULT_WIFI_PASSWORD),
            },
            sensor: SensorConfig::default(),
            startup_retry_ms: DEFAULT_STARTUP_RETRY_MS,
            idle_poll_ms: DEFAULT_IDLE_POLL_MS,
        }
    }
}

impl AgentConfig {
    /// Build the configuration from `GREENGUARD_*` variables captured at
    /// compile time.
    ///
    /// `fallback_sensor_id` is used when `GREENGUARD_SENSOR_ID` was not
    /// set, so every board gets a distinct id without per-device builds.
    pub fn from_build_env(fallback_sensor_id: &str) -> Result<Self, ConfigError> {
        Self::from_overrides(&BuildOverrides::captured(), fallback_sensor_id)
    }

    /// Apply a set of string overrides on top of the defaults.
    pub fn from_overrides(
        overrides: &BuildOverrides,
        fallback_sensor_id: &str,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let sensor_id = match overrides.sensor_id {
            Some(id) => id,
            None => fallback_sensor_id,
        };
        let identity =
            DeviceIdentity::new(sensor_id, overrides.location.unwrap_or(DEFAULT_LOCATION))?;
        let endpoint = EndpointConfig::new(
            overrides.server_url.unwrap_or(DEFAULT_SERVER_URL),
            parse_u32(
                overrides.request_timeout_ms,
                DEFAULT_REQUEST_TIMEOUT_MS,
                "request timeout is not a number",
            )?,
            parse_u32(
                overrides.publish_interval_ms,
                DEFAULT_PUBLISH_INTERVAL_MS,
                "publish interval is not a number",
            )?,
        )?;
        let network = NetworkConfig::new(
            overrides.wifi_ssid.unwrap_or(DEFAULT_WIFI_SSID),
            overrides.wifi_password.unwrap_or(DEFAULT_WIFI_PASSWORD),
        )?;
        let sensor = SensorConfig {
            kind: match overrides.sensor_kind {
                None => defaults.sensor.kind,
                Some(name) => {
                    SensorKind::from_name(name).ok_or(ConfigError::InvalidField("sensor_kind"))?
                }
            },
            gpio: match overrides.sensor_gpio {
                None => defaults.sensor.gpio,
                Some(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidField("sensor_gpio"))?,
            },
            ..defaults.sensor
        };

        let config = Self {
            identity,
            endpoint,
            network,
            sensor,
            ..defaults
        };
        config.validate()?;
        Ok(config)
    }

    /// Range-check the timing and sensor fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.publish_interval_ms == 0 {
            return Err(ConfigError::InvalidTiming("publish interval must be non-zero"));
        }
        if self.endpoint.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidTiming("request timeout must be non-zero"));
        }
        if self.endpoint.request_timeout_ms >= self.endpoint.publish_interval_ms {
            return Err(ConfigError::InvalidTiming(
                "request timeout must be shorter than the publish interval",
            ));
        }
        if self.startup_retry_ms == 0 {
            return Err(ConfigError::InvalidTiming("startup retry delay must be non-zero"));
        }
        let (lo, hi) = (self.sensor.min_valid_c, self.sensor.max_valid_c);
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(ConfigError::InvalidRange);
        }
        Ok(())
    }
}

/// Raw string overrides, normally captured with `option_env!`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOverrides {
    pub wifi_ssid: Option<&'static str>,
    pub wifi_password: Option<&'static str>,
    pub server_url: Option<&'static str>,
    pub sensor_id: Option<&'static str>,
    pub location: Option<&'static str>,
    pub sensor_kind: Option<&'static str>,
    pub sensor_gpio: Option<&'static str>,
    pub publish_interval_ms: Option<&'static str>,
    pub request_timeout_ms: Option<&'static str>,
}

impl BuildOverrides {
    /// Values baked in by the compiler from the build environment.
    pub fn captured() -> Self {
        Self {
            wifi_ssid: option_env!("GREENGUARD_WIFI_SSID"),
            wifi_password: option_env!("GREENGUARD_WIFI_PASSWORD"),
            server_url: option_env!("GREENGUARD_SERVER_URL"),
            sensor_id: option_env!("GREENGUARD_SENSOR_ID"),
            location: option_env!("GREENGUARD_LOCATION"),
            sensor_kind: option_env!("GREENGUARD_SENSOR_KIND"),
            sensor_gpio: option_env!("GREENGUARD_SENSOR_GPIO"),
            publish_interval_ms: option_env!("GREENGUARD_PUBLISH_INTERVAL_MS"),
            request_timeout_ms: option_env!("GREENGUARD_REQUEST_TIMEOUT_MS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn bounded<const N: usize>(
    value: &str,
    field: &'static str,
) -> Result<heapless::String<N>, ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::InvalidField(field));
    }
    bounded_allow_empty(value, field)
}

fn bounded_allow_empty<const N: usize>(
    value: &str,
    field: &'static str,
) -> Result<heapless::String<N>, ConfigError> {
    let mut out = heapless::String::new();
    out.push_str(value)
        .map_err(|_| ConfigError::InvalidField(field))?;
    Ok(out)
}

/// Copy a compiled-in literal, truncating at capacity.
fn fixed<const N: usize>(value: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in value.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

fn parse_u32(raw: Option<&str>, default: u32, msg: &'static str) -> Result<u32, ConfigError> {
    match raw {
        None => Ok(default),
        Some(s) => s.trim().parse().map_err(|_| ConfigError::InvalidTiming(msg)),
    }
}
