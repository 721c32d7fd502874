//! Port traits — the boundary between the alarm core and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AlarmService (domain)
//! ```
//!
//! Driven adapters (display, telemetry sink, credential/config storage)
//! implement these traits. The service consumes them via generics, so the
//! domain core never touches hardware directly. Every display and
//! telemetry call is fire-and-forget: adapters absorb their own failures,
//! the core's state is the source of truth.

use crate::config::SystemConfig;
use crate::pin_entry::PinCredential;

use super::events::TelemetryRecord;

// ───────────────────────────────────────────────────────────────
// Display port (domain → status display)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the status display.
///
/// Implementations take `&self` because the display is shared between the
/// alarm core and the keypad task; the adapter owns the lock that makes
/// each multi-step rendering sequence atomic.
pub trait DisplayPort {
    /// Replace the status line (state names, alarm banner).
    fn show_line1(&self, text: &str);

    /// Update the exit-delay countdown readout.
    fn show_countdown(&self, seconds: u16);

    /// Blank the whole display.
    fn clear(&self);
}

// ───────────────────────────────────────────────────────────────
// Telemetry port (domain → status reporting)
// ───────────────────────────────────────────────────────────────

/// The service publishes structured [`TelemetryRecord`]s through this
/// port on every state change and on the reporting interval.
pub trait TelemetryPort {
    fn publish(&mut self, record: &TelemetryRecord);
}

// ───────────────────────────────────────────────────────────────
// Storage ports (domain ↔ NVS)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the system configuration.
///
/// Implementations MUST validate before persisting; a corrupted or
/// missing blob loads as defaults rather than failing the boot.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    fn load(&self) -> Result<SystemConfig, StorageError>;

    /// Validate and persist configuration.
    fn save(&mut self, config: &SystemConfig) -> Result<(), StorageError>;
}

/// Loads and persists the disarm credential.
pub trait PinStorePort {
    /// Load the stored PIN. `Err(StorageError::NotFound)` on first boot.
    fn load_pin(&self) -> Result<PinCredential, StorageError>;

    /// Persist a PIN (first-boot default write, or provisioning).
    fn save_pin(&mut self, pin: &PinCredential) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from the storage-backed ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// No value stored under the requested key (first boot).
    NotFound,
    /// Stored blob failed deserialization or shape checks.
    Corrupted,
    /// A config field failed range validation; the message names it.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::Corrupted => write!(f, "stored blob corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
