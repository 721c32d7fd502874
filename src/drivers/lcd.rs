//! 16×2 character display driver (HD44780 behind a PCF8574 I²C backpack).
//!
//! ## Bus protocol
//!
//! The PCF8574 exposes eight pins; the usual backpack wiring is:
//!
//! ```text
//! P0 → RS   P1 → RW   P2 → EN   P3 → BACKLIGHT   P4–P7 → D4–D7
//! ```
//!
//! so every LCD byte goes out as two nibbles, each strobed with EN.
//!
//! ## Sharing
//!
//! The raw [`Lcd`] is single-owner. Both the alarm core and the keypad
//! task render to the display, so all access goes through
//! [`SharedDisplay`], which holds the lock for a complete rendering
//! sequence (cursor move + 16 characters) — partial writes from two tasks
//! can never interleave. The lock is a blocking mutex taken around pure
//! register writes; it is never held across an await point.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the I²C bus via hw_init. On host/test: renders into
//! in-memory line buffers that tests can inspect.

use core::cell::RefCell;
use core::fmt::Write as _;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use heapless::String;

use crate::app::ports::DisplayPort;
#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::pins;

/// Characters per display line.
pub const LCD_COLS: usize = 16;

// PCF8574 bit positions.
#[cfg(target_os = "espidf")]
const BIT_RS: u8 = 1 << 0;
#[cfg(target_os = "espidf")]
const BIT_EN: u8 = 1 << 2;
#[cfg(target_os = "espidf")]
const BIT_BACKLIGHT: u8 = 1 << 3;

// DDRAM addresses for the two lines.
const LINE1_ADDR: u8 = 0x00;
const LINE2_ADDR: u8 = 0x40;

/// The raw display driver.
pub struct Lcd {
    addr: u8,
    #[cfg(not(target_os = "espidf"))]
    line1: String<LCD_COLS>,
    #[cfg(not(target_os = "espidf"))]
    line2: String<LCD_COLS>,
}

impl Lcd {
    pub fn new() -> Self {
        Self {
            addr: pins::LCD_I2C_ADDR,
            #[cfg(not(target_os = "espidf"))]
            line1: String::new(),
            #[cfg(not(target_os = "espidf"))]
            line2: String::new(),
        }
    }

    /// Run the HD44780 4-bit initialisation sequence. Call once at boot,
    /// after the I²C bus is up.
    pub fn init(&mut self) {
        #[cfg(target_os = "espidf")]
        {
            // Datasheet power-on dance: three 0x3 nibbles, then switch to
            // 4-bit mode before any full-byte command works.
            hw_init::delay_us(50_000);
            for _ in 0..3 {
                self.write_nibble(0x03, false);
                hw_init::delay_us(4_500);
            }
            self.write_nibble(0x02, false);

            self.command(0x28); // 4-bit, 2 lines, 5x8 font
            self.command(0x0C); // display on, cursor off
            self.command(0x06); // entry mode: increment, no shift
            self.command(0x01); // clear
            hw_init::delay_us(2_000);
        }
        log::info!("lcd: initialised at 0x{:02x}", self.addr);
    }

    /// Blank both lines.
    pub fn clear(&mut self) {
        #[cfg(target_os = "espidf")]
        {
            self.command(0x01);
            hw_init::delay_us(2_000);
        }
        #[cfg(not(target_os = "espidf"))]
        {
            self.line1.clear();
            self.line2.clear();
        }
    }

    /// Write `text` to the first line, padded/truncated to the full width
    /// so stale characters never linger.
    pub fn show_line1(&mut self, text: &str) {
        self.write_line(LINE1_ADDR, text);
    }

    /// Write `text` to the second line.
    pub fn show_line2(&mut self, text: &str) {
        self.write_line(LINE2_ADDR, text);
    }

    /// Render the exit-delay countdown on the second line.
    pub fn show_countdown(&mut self, seconds: u16) {
        let mut buf: String<LCD_COLS> = String::new();
        let _ = write!(buf, "ARMING IN {seconds:>3}s");
        self.write_line(LINE2_ADDR, &buf);
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn line1(&self) -> &str {
        &self.line1
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn line2(&self) -> &str {
        &self.line2
    }

    // ── Internal ──────────────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn write_line(&mut self, ddram_addr: u8, text: &str) {
        self.command(0x80 | ddram_addr);
        let mut written = 0;
        for ch in text.chars().take(LCD_COLS) {
            let byte = if ch.is_ascii() { ch as u8 } else { b'?' };
            self.write_data(byte);
            written += 1;
        }
        for _ in written..LCD_COLS {
            self.write_data(b' ');
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_line(&mut self, ddram_addr: u8, text: &str) {
        let line = if ddram_addr == LINE1_ADDR {
            &mut self.line1
        } else {
            &mut self.line2
        };
        line.clear();
        for ch in text.chars().take(LCD_COLS) {
            let _ = line.push(if ch.is_ascii() { ch } else { '?' });
        }
    }

    #[cfg(target_os = "espidf")]
    fn command(&mut self, byte: u8) {
        self.send(byte, false);
        hw_init::delay_us(50);
    }

    #[cfg(target_os = "espidf")]
    fn write_data(&mut self, byte: u8) {
        self.send(byte, true);
        hw_init::delay_us(50);
    }

    #[cfg(target_os = "espidf")]
    fn send(&mut self, byte: u8, is_data: bool) {
        self.write_nibble(byte >> 4, is_data);
        self.write_nibble(byte & 0x0F, is_data);
    }

    /// Put one nibble on D4–D7 and strobe EN.
    #[cfg(target_os = "espidf")]
    fn write_nibble(&mut self, nibble: u8, is_data: bool) {
        let mut out = (nibble & 0x0F) << 4 | BIT_BACKLIGHT;
        if is_data {
            out |= BIT_RS;
        }
        hw_init::i2c_write_byte(self.addr, out | BIT_EN);
        hw_init::delay_us(1);
        hw_init::i2c_write_byte(self.addr, out);
        hw_init::delay_us(37);
    }
}

// ───────────────────────────────────────────────────────────────
// SharedDisplay
// ───────────────────────────────────────────────────────────────

/// Mutex-guarded display shared between the alarm core and the keypad
/// task. Each method takes the lock for the complete rendering sequence.
pub struct SharedDisplay {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Lcd>>,
}

impl SharedDisplay {
    pub fn new(lcd: Lcd) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(lcd)),
        }
    }

    /// Keypad entry feedback on the second line ("PIN: ***", rejections).
    pub fn show_entry(&self, text: &str) {
        self.inner.lock(|lcd| lcd.borrow_mut().show_line2(text));
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn lines(&self) -> (String<LCD_COLS>, String<LCD_COLS>) {
        self.inner.lock(|lcd| {
            let lcd = lcd.borrow();
            (
                String::try_from(lcd.line1()).unwrap_or_default(),
                String::try_from(lcd.line2()).unwrap_or_default(),
            )
        })
    }
}

impl DisplayPort for SharedDisplay {
    fn show_line1(&self, text: &str) {
        self.inner.lock(|lcd| lcd.borrow_mut().show_line1(text));
    }

    fn show_countdown(&self, seconds: u16) {
        self.inner.lock(|lcd| lcd.borrow_mut().show_countdown(seconds));
    }

    fn clear(&self) {
        self.inner.lock(|lcd| lcd.borrow_mut().clear());
    }
}
