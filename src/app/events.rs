//! Outbound telemetry records.
//!
//! The service builds a [`TelemetryRecord`] on every state change and on
//! the fixed reporting interval; the [`TelemetryPort`] adapter decides
//! where it goes (serial log today, MQTT or a cloud link behind the same
//! trait tomorrow).
//!
//! [`TelemetryPort`]: super::ports::TelemetryPort

use serde::Serialize;

/// A point-in-time status report suitable for logging or transmission.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TelemetryRecord {
    /// Current alarm state, as its canonical name.
    pub state: &'static str,
    /// Last stable distance reading in cm; absent before the first valid
    /// measurement burst.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_cm: Option<u16>,
}
