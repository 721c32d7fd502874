//! System configuration parameters
//!
//! All tunable parameters for the HomeGuard alarm controller.
//! Values can be overridden via NVS (non-volatile storage).

use serde::{Deserialize, Serialize};

/// Factory-default disarm PIN, written to NVS on first boot when no
/// credential is stored.
pub const DEFAULT_PIN: [u8; 4] = *b"1234";

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Arming ---
    /// Grace period between arming and the system becoming fully armed (seconds)
    pub exit_delay_secs: u16,

    // --- Motion detection ---
    /// Distance at or below which an object counts as motion (cm)
    pub motion_threshold_cm: u16,
    /// Minimum physically plausible distance reading (cm)
    pub distance_min_cm: u16,
    /// Maximum physically plausible distance reading (cm)
    pub distance_max_cm: u16,
    /// Maximum allowed jump between consecutive stable readings (cm)
    pub distance_jump_cm: u16,
    /// Raw readings taken per measurement burst
    pub burst_samples: u8,

    // --- Timing ---
    /// Bounded wait on the event channel before a timer-service tick (milliseconds)
    pub event_receive_timeout_ms: u32,
    /// Distance sensor poll interval (milliseconds)
    pub sensor_poll_interval_ms: u32,
    /// Keypad scan interval (milliseconds)
    pub keypad_scan_interval_ms: u32,
    /// Remote command poll interval (milliseconds)
    pub remote_poll_interval_ms: u32,
    /// Telemetry report interval (seconds)
    pub telemetry_interval_secs: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Arming
            exit_delay_secs: 15,

            // Motion detection
            motion_threshold_cm: 100,
            distance_min_cm: 2,
            distance_max_cm: 400,
            distance_jump_cm: 10,
            burst_samples: 5,

            // Timing
            event_receive_timeout_ms: 100, // tick cadence for the alarm core
            sensor_poll_interval_ms: 150,
            keypad_scan_interval_ms: 40,
            remote_poll_interval_ms: 500,
            telemetry_interval_secs: 60,
        }
    }
}
