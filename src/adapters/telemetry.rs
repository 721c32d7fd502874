//! Log-based telemetry sink adapter.
//!
//! Implements [`TelemetryPort`] by serialising each record to a JSON line
//! on the ESP-IDF logger (UART / USB-CDC in production). A future MQTT or
//! cloud adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::TelemetryRecord;
use crate::app::ports::TelemetryPort;

/// Adapter that logs every [`TelemetryRecord`] as a JSON line.
pub struct LogTelemetrySink;

impl LogTelemetrySink {
    pub fn new() -> Self {
        Self
    }
}

impl TelemetryPort for LogTelemetrySink {
    fn publish(&mut self, record: &TelemetryRecord) {
        match serde_json::to_string(record) {
            Ok(json) => info!("TELEM | {json}"),
            // Fire-and-forget: a serialisation failure costs one report.
            Err(e) => warn!("TELEM | serialisation failed: {e}"),
        }
    }
}
