//! Keypad task: scan, reduce, enqueue.
//!
//! The matrix driver hands over one debounced key at a time; the
//! [`PinEntry`] reducer turns presses into events or user feedback. The
//! entry echo and rejection messages render on the display's second line
//! through the same lock the alarm core uses, so the two writers never
//! interleave mid-sequence.

use core::fmt::Write as _;

use embassy_time::{Duration, Timer};
use heapless::String;

use crate::drivers::keypad::KeypadDriver;
use crate::drivers::lcd::{LCD_COLS, SharedDisplay};
use crate::events::send_event;
use crate::pin_entry::{KeyOutcome, PinCredential, PinEntry, RejectReason};

pub async fn keypad_task(
    mut driver: KeypadDriver,
    pin: PinCredential,
    display: &SharedDisplay,
    scan_interval_ms: u32,
) {
    let mut entry = PinEntry::new(pin);
    let scan_interval = Duration::from_millis(u64::from(scan_interval_ms));

    loop {
        if let Some(key) = driver.read_key().await {
            match entry.push_key(key) {
                KeyOutcome::Event(event) => {
                    send_event(event);
                    display.show_entry("");
                }
                KeyOutcome::Accumulating(count) => {
                    display.show_entry(&masked_echo(count));
                }
                KeyOutcome::Rejected(RejectReason::WrongPin) => {
                    log::warn!("keypad: wrong PIN entered");
                    display.show_entry("WRONG PIN");
                }
                KeyOutcome::Rejected(RejectReason::NeedMoreDigits) => {
                    display.show_entry("NEED 4 DIGITS");
                }
                KeyOutcome::Cleared => {
                    display.show_entry("");
                }
                KeyOutcome::Ignored => {}
            }
        }

        Timer::after(scan_interval).await;
    }
}

/// `PIN: ***` — digits are never echoed in the clear.
fn masked_echo(count: usize) -> String<LCD_COLS> {
    let mut line = String::new();
    let _ = write!(line, "PIN: ");
    for _ in 0..count {
        let _ = line.push('*');
    }
    line
}
