//! Shared read-only snapshots of alarm state.
//!
//! The current [`AlarmState`] is owned exclusively by the alarm core; other
//! tasks (speaker, indicator, telemetry) only ever read it through the
//! atomics below. A reader may observe a value that is one tick stale, but
//! never a torn one — each snapshot is a single machine word.
//!
//! Writers:
//! - `publish_state` / `publish_exit_seconds` — alarm core only.
//! - `publish_distance` — motion task only (feeds the telemetry payload).

use core::sync::atomic::{AtomicI32, AtomicU8, AtomicU16, Ordering};

use crate::fsm::AlarmState;

static CURRENT_STATE: AtomicU8 = AtomicU8::new(AlarmState::Disarmed as u8);
static EXIT_SECONDS_REMAINING: AtomicU16 = AtomicU16::new(0);

/// Last stable distance reading in cm; -1 = no reading yet.
static LAST_DISTANCE_CM: AtomicI32 = AtomicI32::new(-1);

/// Publish a new alarm state. Called only from the alarm core's
/// transition path.
pub fn publish_state(state: AlarmState) {
    CURRENT_STATE.store(state as u8, Ordering::Release);
}

/// Current alarm state snapshot (possibly one tick stale).
pub fn snapshot() -> AlarmState {
    AlarmState::from_index(CURRENT_STATE.load(Ordering::Acquire) as usize)
}

/// Publish the remaining exit-delay seconds. Alarm core only; zero
/// outside EXIT_DELAY.
pub fn publish_exit_seconds(secs: u16) {
    EXIT_SECONDS_REMAINING.store(secs, Ordering::Release);
}

/// Remaining exit-delay seconds as last published by the core.
pub fn exit_seconds_remaining() -> u16 {
    EXIT_SECONDS_REMAINING.load(Ordering::Acquire)
}

/// Publish the latest stable distance reading from the motion task.
pub fn publish_distance(cm: u16) {
    LAST_DISTANCE_CM.store(cm as i32, Ordering::Release);
}

/// Last stable distance, or `None` before the first valid burst.
pub fn last_distance_cm() -> Option<u16> {
    let raw = LAST_DISTANCE_CM.load(Ordering::Acquire);
    if raw < 0 { None } else { Some(raw as u16) }
}
