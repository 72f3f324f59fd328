//! GreenGuard telemetry node library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod publisher;
pub mod scheduler;
pub mod sensors;

// Adapters carry both halves; the ESP-IDF one is selected by target.
pub mod adapters;
