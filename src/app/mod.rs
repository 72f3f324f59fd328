//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the rules of the telemetry loop: when a cycle
//! runs, what it checks, and how its outcome is classified. All
//! interaction with hardware happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod cycle;
pub mod events;
pub mod ports;
pub mod service;
