//! Publisher: encodes one reading as JSON and POSTs it.
//!
//! Wire body (field order fixed, no extra keys):
//!
//! ```json
//! {"temperature":21.5,"sensor_id":"sensor01","location":"Sheridan Forest Oakville"}
//! ```
//!
//! Exactly one request per call. Only `200` counts as published.

use log::{debug, warn};
use serde::Serialize;

use crate::app::events::CycleOutcome;
use crate::app::ports::HttpPort;
use crate::config::{DeviceIdentity, EndpointConfig, MAX_URL_LEN};
use crate::error::TransportError;
use crate::sensors::Reading;

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// The JSON object sent to the collector.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Payload<'a> {
    pub temperature: f64,
    pub sensor_id: &'a str,
    pub location: &'a str,
}

impl<'a> Payload<'a> {
    pub fn new(reading: &Reading, identity: &'a DeviceIdentity) -> Self {
        Self {
            temperature: reading.celsius(),
            sensor_id: identity.sensor_id(),
            location: identity.location(),
        }
    }
}

/// Map a transport result onto a cycle outcome.
pub fn classify(result: &Result<u16, TransportError>) -> CycleOutcome {
    match result {
        Ok(200) => CycleOutcome::Published,
        Ok(code) => CycleOutcome::HttpError(*code),
        Err(_) => CycleOutcome::TransportFailure,
    }
}

#[derive(Debug, Clone)]
pub struct Publisher {
    url: heapless::String<MAX_URL_LEN>,
    timeout: core::time::Duration,
}

impl Publisher {
    pub fn new(endpoint: &EndpointConfig) -> Self {
        Self {
            url: endpoint.url_buf().clone(),
            timeout: endpoint.request_timeout(),
        }
    }

    /// Serialize the payload for one reading.
    pub fn build_body(
        &self,
        reading: &Reading,
        identity: &DeviceIdentity,
    ) -> Result<Vec<u8>, TransportError> {
        serde_json::to_vec(&Payload::new(reading, identity)).map_err(|_| TransportError::Encode)
    }

    /// Send one reading. `Ok` carries `Published` or `HttpError(code)`;
    /// `Err` is a transport failure (no response, or nothing to send).
    pub fn publish(
        &self,
        http: &mut impl HttpPort,
        reading: &Reading,
        identity: &DeviceIdentity,
    ) -> Result<CycleOutcome, TransportError> {
        let body = self.build_body(reading, identity)?;
        debug!("POST {} ({} bytes)", self.url, body.len());

        let result = http.post(
            &self.url,
            &[("Content-Type", CONTENT_TYPE_JSON)],
            &body,
            self.timeout,
        );
        if let Err(e) = result {
            warn!("POST {} failed: {}", self.url, e);
            return Err(e);
        }
        Ok(classify(&result))
    }
}
