//! Remote command source.
//!
//! The transport (BLE, WiFi, serial bridge) is out of scope for the alarm
//! core; whatever carries the bytes calls [`submit_raw`] with the decoded
//! command text, and the remote task polls [`RemoteLink`] on its cadence.
//! Unknown command text is logged and dropped — a malformed remote frame
//! must never disturb the alarm.

use core::sync::atomic::{AtomicU8, Ordering};

use log::{info, warn};

/// Commands the remote channel can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    Arm,
    Disarm,
}

const PENDING_NONE: u8 = 0;
const PENDING_ARM: u8 = 1;
const PENDING_DISARM: u8 = 2;

/// Single-slot pending command, written by the transport layer (or test
/// hooks) and consumed by the remote task. A newer command overwrites an
/// unconsumed older one.
static PENDING: AtomicU8 = AtomicU8::new(PENDING_NONE);

/// Hand a textual command from the transport to the poller.
/// Returns `false` (and logs) for unrecognised text.
pub fn submit_raw(command: &str) -> bool {
    match decode_command(command) {
        Some(RemoteCommand::Arm) => {
            PENDING.store(PENDING_ARM, Ordering::Release);
            true
        }
        Some(RemoteCommand::Disarm) => {
            PENDING.store(PENDING_DISARM, Ordering::Release);
            true
        }
        None => {
            warn!("remote: unknown command {command:?} ignored");
            false
        }
    }
}

fn decode_command(command: &str) -> Option<RemoteCommand> {
    match command.trim() {
        "ARM" => Some(RemoteCommand::Arm),
        "DISARM" => Some(RemoteCommand::Disarm),
        _ => None,
    }
}

/// Polled remote command source.
pub struct RemoteLink;

impl RemoteLink {
    pub fn new() -> Self {
        info!("remote link ready (polled)");
        Self
    }

    /// Take the pending command, if one arrived since the last poll.
    pub fn poll(&mut self) -> Option<RemoteCommand> {
        match PENDING.swap(PENDING_NONE, Ordering::AcqRel) {
            PENDING_ARM => {
                info!("remote: ARM command received");
                Some(RemoteCommand::Arm)
            }
            PENDING_DISARM => {
                info!("remote: DISARM command received");
                Some(RemoteCommand::Disarm)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_roundtrip_and_unknown_text_is_dropped() {
        let mut link = RemoteLink::new();
        assert_eq!(link.poll(), None);

        assert!(submit_raw("ARM"));
        assert_eq!(link.poll(), Some(RemoteCommand::Arm));
        assert_eq!(link.poll(), None); // consumed

        assert!(submit_raw(" DISARM \n"));
        assert_eq!(link.poll(), Some(RemoteCommand::Disarm));

        assert!(!submit_raw("SELF-DESTRUCT"));
        assert_eq!(link.poll(), None);
    }
}
