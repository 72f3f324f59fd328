//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements | Connects to                    |
//! |-------------|------------|--------------------------------|
//! | `wifi`      | LinkPort   | ESP-IDF WiFi STA               |
//! | `http`      | HttpPort   | esp_http_client / std TCP      |
//! | `time`      | TimePort   | ESP32 system timer, FreeRTOS   |
//! | `log_sink`  | EventSink  | Serial log output              |
//! | `device_id` | —          | eFuse factory MAC              |
//!
//! The sensor port is implemented by the DHT driver in
//! [`crate::sensors::dht`].

pub mod device_id;
pub mod http;
pub mod log_sink;
pub mod time;
pub mod wifi;
