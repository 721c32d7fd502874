//! Driven adapters behind the app-layer port traits.

pub mod nvs;
pub mod remote;
pub mod telemetry;
pub mod time;
