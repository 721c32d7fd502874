//! Application layer: the alarm service and its port boundary.
//!
//! ```text
//!   events ──▶ ┌───────────────────────┐ ──▶ DisplayPort
//!              │     AlarmService       │ ──▶ TelemetryPort
//!   tick()  ──▶│  (state machine core)  │
//!              └───────────────────────┘
//! ```

pub mod events;
pub mod ports;
pub mod service;
