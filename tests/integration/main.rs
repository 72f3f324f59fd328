//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific part of the
//! telemetry loop against mock adapters. All tests run on the host with
//! no real hardware required.

mod agent_cycle_tests;
mod mock_ports;
mod startup_tests;
