//! Connectivity gate.
//!
//! Two explicit phases:
//!
//! - [`LinkPhase::Startup`]: start the driver, then block until the link
//!   reports [`LinkState::Connected`], polling on a fixed backoff with no
//!   upper bound.
//! - [`LinkPhase::SteadyState`]: inspect the link once per cycle. When it
//!   is down, issue one fire-and-forget reconnect request and let the
//!   cycle end. The gate never waits for the link inside a cycle.

use log::{debug, info, warn};

use crate::app::ports::{LinkPort, LinkState, TimePort};
use crate::error::LinkError;

/// Which connectivity regime the agent is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkPhase {
    /// Blocking wait for the first connection. No cycles run.
    Startup,
    /// Non-blocking per-cycle checks.
    SteadyState,
}

/// Observes the link driver and requests reconnects. Owns no link state
/// of its own beyond the current phase.
#[derive(Debug, Clone)]
pub struct ConnectivityGate {
    phase: LinkPhase,
    retry_ms: u32,
    reconnect_requests: u32,
}

impl ConnectivityGate {
    pub fn new(startup_retry_ms: u32) -> Self {
        Self {
            phase: LinkPhase::Startup,
            retry_ms: startup_retry_ms,
            reconnect_requests: 0,
        }
    }

    pub fn phase(&self) -> LinkPhase {
        self.phase
    }

    /// Reconnect requests issued since boot.
    pub fn reconnect_requests(&self) -> u32 {
        self.reconnect_requests
    }

    /// Start the driver and block until the link is up.
    ///
    /// Returns the number of link-state polls it took. A driver that
    /// refuses to start is the only error; a link that never comes up
    /// blocks forever.
    pub fn await_link(
        &mut self,
        link: &mut impl LinkPort,
        time: &mut impl TimePort,
    ) -> Result<u32, LinkError> {
        link.begin()?;
        info!("WiFi: connecting...");

        let mut attempts: u32 = 0;
        loop {
            attempts = attempts.saturating_add(1);
            if link.link_state() == LinkState::Connected {
                break;
            }
            debug!("WiFi: link down, retry in {} ms (poll {})", self.retry_ms, attempts);
            time.delay_ms(self.retry_ms);
        }

        self.phase = LinkPhase::SteadyState;
        Ok(attempts)
    }

    /// One non-blocking link check.
    pub fn check(&self, link: &mut impl LinkPort) -> LinkState {
        link.link_state()
    }

    /// Fire-and-forget reconnect. Never waits for the result.
    pub fn request_reconnect(&mut self, link: &mut impl LinkPort) {
        warn!("WiFi: link down, requesting reconnect");
        self.reconnect_requests = self.reconnect_requests.wrapping_add(1);
        link.request_reconnect();
    }
}
