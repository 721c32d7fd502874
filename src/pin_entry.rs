//! Keypad input reducer: raw key presses → alarm events.
//!
//! Digits accumulate into a fixed-length entry buffer; `#` commits the
//! buffer against the stored credential; `*` abandons the entry. Two keys
//! bypass the buffer entirely: the arm key fires immediately, as does the
//! override key (physical access to the panel is the override credential).
//!
//! | Key     | Effect                                                  |
//! |---------|---------------------------------------------------------|
//! | `0`–`9` | Append to the entry buffer (extra digits ignored)       |
//! | `#`     | Commit: full + match → disarm; otherwise reject + clear |
//! | `*`     | Clear the buffer                                        |
//! | `A`     | Emit `ArmLocal`, abandoning any in-progress entry       |
//! | `D`     | Emit `DisarmOverride`, abandoning the entry             |
//!
//! The reducer is single-owner state inside the keypad task, so a commit
//! or clear resets the buffer atomically with respect to the next key
//! read — one press can never be counted against two entries.

use heapless::Vec;

use crate::events::AlarmEvent;

/// Length of the disarm PIN, in digits.
pub const PIN_LEN: usize = 4;

/// Key that arms the system immediately.
pub const ARM_KEY: char = 'A';
/// Key that disarms without a PIN (panel-access override).
pub const OVERRIDE_KEY: char = 'D';

// ---------------------------------------------------------------------------
// Credential
// ---------------------------------------------------------------------------

/// The stored disarm code: a fixed-length secret loaded once from
/// persistent storage at startup. Compared byte-for-byte against entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinCredential([u8; PIN_LEN]);

impl PinCredential {
    /// Build a credential from exactly [`PIN_LEN`] ASCII digits.
    /// Returns `None` for wrong length or non-digit bytes.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != PIN_LEN || !bytes.iter().all(u8::is_ascii_digit) {
            return None;
        }
        let mut code = [0u8; PIN_LEN];
        code.copy_from_slice(bytes);
        Some(Self(code))
    }

    /// Byte-for-byte comparison against a committed entry.
    pub fn matches(&self, entry: &[u8]) -> bool {
        entry == self.0.as_slice()
    }

    /// Raw digits, for persistence.
    pub fn as_bytes(&self) -> &[u8; PIN_LEN] {
        &self.0
    }
}

impl Default for PinCredential {
    fn default() -> Self {
        Self(crate::config::DEFAULT_PIN)
    }
}

// ---------------------------------------------------------------------------
// Reducer
// ---------------------------------------------------------------------------

/// Why a commit was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// A full entry did not match the stored credential.
    WrongPin,
    /// Commit pressed before all digits were entered.
    NeedMoreDigits,
}

/// Result of feeding one key press through the reducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// An alarm event to enqueue.
    Event(AlarmEvent),
    /// Commit rejected; buffer has been cleared. User-visible only — this
    /// is never an alarm event.
    Rejected(RejectReason),
    /// `*` pressed; buffer cleared without committing.
    Cleared,
    /// A digit was accepted; carries the current entry length for the
    /// masked display echo.
    Accumulating(usize),
    /// Key has no mapping in the current entry mode.
    Ignored,
}

/// Accumulates digits and turns committed entries into events.
pub struct PinEntry {
    pin: PinCredential,
    buf: Vec<u8, PIN_LEN>,
}

impl PinEntry {
    pub fn new(pin: PinCredential) -> Self {
        Self {
            pin,
            buf: Vec::new(),
        }
    }

    /// Feed one debounced key press. At most one [`KeyOutcome::Event`] is
    /// produced per press.
    pub fn push_key(&mut self, key: char) -> KeyOutcome {
        match key {
            ARM_KEY => {
                self.buf.clear();
                KeyOutcome::Event(AlarmEvent::ArmLocal)
            }
            OVERRIDE_KEY => {
                self.buf.clear();
                KeyOutcome::Event(AlarmEvent::DisarmOverride)
            }
            '0'..='9' => {
                // A full buffer swallows further digits until commit/clear.
                let _ = self.buf.push(key as u8);
                KeyOutcome::Accumulating(self.buf.len())
            }
            '#' => self.commit(),
            '*' => {
                self.buf.clear();
                KeyOutcome::Cleared
            }
            _ => KeyOutcome::Ignored,
        }
    }

    /// Digits currently buffered (for the masked echo).
    pub fn entered_len(&self) -> usize {
        self.buf.len()
    }

    fn commit(&mut self) -> KeyOutcome {
        if self.buf.len() < PIN_LEN {
            self.buf.clear();
            return KeyOutcome::Rejected(RejectReason::NeedMoreDigits);
        }
        let ok = self.pin.matches(&self.buf);
        self.buf.clear();
        if ok {
            KeyOutcome::Event(AlarmEvent::DisarmPinOk)
        } else {
            KeyOutcome::Rejected(RejectReason::WrongPin)
        }
    }
}
