//! GPIO pin assignment for the HomeGuard controller board.
//!
//! Kept in one place so a board respin only touches this file. Nothing
//! outside the driver layer reads these.

/// Ultrasonic trigger output.
pub const ULTRA_TRIG_GPIO: i32 = 5;
/// Ultrasonic echo input.
pub const ULTRA_ECHO_GPIO: i32 = 18;

/// Speaker PWM output.
pub const SPEAKER_GPIO: i32 = 17;

/// Status LEDs (green / blue / red).
pub const LED_DISARMED_GPIO: i32 = 15;
pub const LED_ARMED_GPIO: i32 = 23;
pub const LED_ALARM_GPIO: i32 = 4;

/// Keypad matrix rows (outputs, idle high).
pub const KEYPAD_ROW_GPIOS: [i32; 4] = [13, 12, 14, 27];
/// Keypad matrix columns (inputs with pull-ups).
pub const KEYPAD_COL_GPIOS: [i32; 4] = [26, 25, 33, 32];

/// I²C bus for the character display.
pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
/// PCF8574 backpack address (0x27 or 0x3F depending on the module).
pub const LCD_I2C_ADDR: u8 = 0x27;
