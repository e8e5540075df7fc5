//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for the BreathSense device:
//! FSM orchestration, calibration sequencing, and the reading pipeline.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
