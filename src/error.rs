#![allow(dead_code)] // Init/Config variants reserved for the provisioning path

//! Unified error types for the HomeGuard firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping
//! error handling in the startup path uniform. All variants are `Copy` so
//! they can be cheaply passed around without allocation. Note that the
//! alarm core itself has no error path: per the failure model, peripheral
//! faults are logged and absorbed, never propagated into the state machine.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read or returned out-of-range data.
    Sensor(SensorError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The echo pulse never started or never ended within the timeout bound.
    EchoTimeout,
    /// Reading is outside the physically plausible range.
    OutOfRange,
    /// A whole measurement burst produced no usable sample.
    NoValidSamples,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EchoTimeout => write!(f, "echo pulse timeout"),
            Self::OutOfRange => write!(f, "reading out of range"),
            Self::NoValidSamples => write!(f, "no valid samples in burst"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
