//! 4×4 matrix keypad driver with contact-settle debounce.
//!
//! ## Scan discipline
//!
//! Rows are outputs idling high; columns are inputs with pull-ups. Each
//! scan drives one row low, waits ~1 ms for the lines to settle, and reads
//! the columns. On a hit the driver waits out contact bounce (20 ms) and
//! then holds until the key is released (5 ms poll) before the next scan
//! begins — one physical press yields exactly one reported key, never a
//! burst.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: scans the matrix via hw_init GPIO wrappers. On host/test:
//! pops keys injected through [`sim_press_key`].

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU8, Ordering};

use embassy_time::{Duration, Timer};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
#[cfg(target_os = "espidf")]
use crate::pins;

const ROWS: usize = 4;
const COLS: usize = 4;

/// Key layout matching the physical overlay.
const KEYMAP: [[char; COLS]; ROWS] = [
    ['1', '2', '3', 'A'],
    ['4', '5', '6', 'B'],
    ['7', '8', '9', 'C'],
    ['*', '0', '#', 'D'],
];

/// Settle time after driving a row low, before reading columns.
#[cfg(target_os = "espidf")]
const ROW_SETTLE: Duration = Duration::from_millis(1);
/// Contact-bounce settle after a key is first seen.
#[cfg(target_os = "espidf")]
const CONTACT_SETTLE: Duration = Duration::from_millis(20);
/// Poll interval while waiting for release.
#[cfg(target_os = "espidf")]
const RELEASE_POLL: Duration = Duration::from_millis(5);

#[cfg(not(target_os = "espidf"))]
static SIM_KEY: AtomicU8 = AtomicU8::new(0);

/// Inject a key press for host-side tests and simulation. The next
/// [`KeypadDriver::read_key`] call returns it, already debounced.
#[cfg(not(target_os = "espidf"))]
pub fn sim_press_key(key: char) {
    SIM_KEY.store(key as u8, Ordering::Release);
}

pub struct KeypadDriver {
    #[cfg(target_os = "espidf")]
    row_pins: [i32; ROWS],
    #[cfg(target_os = "espidf")]
    col_pins: [i32; COLS],
}

impl KeypadDriver {
    pub fn new() -> Self {
        Self {
            #[cfg(target_os = "espidf")]
            row_pins: pins::KEYPAD_ROW_GPIOS,
            #[cfg(target_os = "espidf")]
            col_pins: pins::KEYPAD_COL_GPIOS,
        }
    }

    /// Run one scan pass and return the debounced key, if any.
    ///
    /// Returns after the key is released, so callers never observe the
    /// same physical press twice.
    #[cfg(target_os = "espidf")]
    pub async fn read_key(&mut self) -> Option<char> {
        for (r, &row_pin) in self.row_pins.iter().enumerate() {
            hw_init::gpio_write(row_pin, false);
            Timer::after(ROW_SETTLE).await;

            for (c, &col_pin) in self.col_pins.iter().enumerate() {
                if !hw_init::gpio_read(col_pin) {
                    // Contact settle, then hold until release.
                    Timer::after(CONTACT_SETTLE).await;
                    while !hw_init::gpio_read(col_pin) {
                        Timer::after(RELEASE_POLL).await;
                    }
                    hw_init::gpio_write(row_pin, true);
                    return Some(KEYMAP[r][c]);
                }
            }

            hw_init::gpio_write(row_pin, true);
        }
        None
    }

    #[cfg(not(target_os = "espidf"))]
    pub async fn read_key(&mut self) -> Option<char> {
        // Keep the await point so the task shape matches the target build.
        Timer::after(Duration::from_micros(1)).await;
        match SIM_KEY.swap(0, Ordering::AcqRel) {
            0 => None,
            raw => {
                let key = raw as char;
                KEYMAP
                    .iter()
                    .flatten()
                    .any(|&k| k == key)
                    .then_some(key)
            }
        }
    }
}
