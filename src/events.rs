//! Cross-task alarm event delivery.
//!
//! Every producer task (motion detector, keypad reducer, remote poller)
//! converts raw activity into one small typed [`AlarmEvent`] and enqueues
//! it here. The alarm core is the single consumer, which serialises state
//! transitions: one event, one coherent transition.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ motion task │────▶│              │     │              │
//! │ keypad task │────▶│ Event Channel│────▶│  alarm task  │
//! │ remote task │────▶│ (bounded 16) │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! `send_event` never blocks: producers are time-sensitive pollers, so a
//! full queue drops the event (logged) rather than stalling the producer.
//! FIFO order is preserved across producers in enqueue order.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use log::warn;

/// Maximum number of pending events.
pub const EVENT_QUEUE_DEPTH: usize = 16;

/// Events the alarm core reacts to. Immutable once constructed; consumed
/// exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmEvent {
    /// Arm requested from the keypad.
    ArmLocal,
    /// Arm requested over the remote link.
    ArmRemote,
    /// A committed PIN entry matched the stored credential.
    DisarmPinOk,
    /// The keypad override key was pressed.
    DisarmOverride,
    /// Disarm requested over the remote link.
    DisarmRemote,
    /// The motion detector saw an object within the threshold distance.
    MotionDetected,
    /// Service reset request (accepted only while the siren is active).
    Reset,
}

/// The single event channel: many producers, one consumer (the alarm task).
pub static EVENT_CHANNEL: Channel<CriticalSectionRawMutex, AlarmEvent, EVENT_QUEUE_DEPTH> =
    Channel::new();

/// Enqueue an event without blocking.
///
/// Returns `false` if the queue was full and the event was dropped. Losing
/// an event from a high-frequency producer is preferred over stalling it;
/// the motion and remote pollers re-detect their condition on the next
/// cadence tick anyway.
pub fn send_event(event: AlarmEvent) -> bool {
    match EVENT_CHANNEL.try_send(event) {
        Ok(()) => true,
        Err(TrySendError::Full(ev)) => {
            warn!("event queue full, dropping {:?}", ev);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain() {
        while EVENT_CHANNEL.try_receive().is_ok() {}
    }

    #[test]
    fn send_receive_preserves_fifo_order_and_drops_when_full() {
        // The channel is a process-wide static, so all assertions about it
        // live in this one test to avoid cross-test interference.
        drain();

        assert!(send_event(AlarmEvent::ArmLocal));
        assert!(send_event(AlarmEvent::MotionDetected));
        assert!(send_event(AlarmEvent::DisarmRemote));

        assert_eq!(EVENT_CHANNEL.try_receive().ok(), Some(AlarmEvent::ArmLocal));
        assert_eq!(
            EVENT_CHANNEL.try_receive().ok(),
            Some(AlarmEvent::MotionDetected)
        );
        assert_eq!(
            EVENT_CHANNEL.try_receive().ok(),
            Some(AlarmEvent::DisarmRemote)
        );
        assert!(EVENT_CHANNEL.try_receive().is_err());

        // Fill to capacity; the overflowing send must not block and must
        // leave the queued events' order intact.
        for _ in 0..EVENT_QUEUE_DEPTH {
            assert!(send_event(AlarmEvent::MotionDetected));
        }
        assert!(!send_event(AlarmEvent::ArmLocal));

        for _ in 0..EVENT_QUEUE_DEPTH {
            assert_eq!(
                EVENT_CHANNEL.try_receive().ok(),
                Some(AlarmEvent::MotionDetected)
            );
        }
        assert!(EVENT_CHANNEL.try_receive().is_err());
    }
}
