//! One-shot hardware peripheral initialization.
//!
//! Configures GPIO directions, the LEDC speaker channel, and the I²C bus
//! for the display using raw ESP-IDF sys calls, and exposes the thin
//! wrappers the drivers build on. Called once from `main()` before any
//! task starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    LedcInitFailed(i32),
    I2cInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::LedcInitFailed(rc) => write!(f, "LEDC timer/channel config failed (rc={})", rc),
            Self::I2cInitFailed(rc) => write!(f, "I2C bus init failed (rc={})", rc),
        }
    }
}

impl std::error::Error for HwInitError {}

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before any task is spawned;
    // single-threaded.
    unsafe {
        init_gpio()?;
        init_ledc()?;
        init_i2c()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── GPIO ──────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio() -> Result<(), HwInitError> {
    // Outputs: ultrasonic trigger, status LEDs, keypad rows (idle high).
    let mut output_mask: u64 = 1u64 << pins::ULTRA_TRIG_GPIO;
    for pin in [
        pins::LED_DISARMED_GPIO,
        pins::LED_ARMED_GPIO,
        pins::LED_ALARM_GPIO,
    ] {
        output_mask |= 1u64 << pin;
    }
    for pin in pins::KEYPAD_ROW_GPIOS {
        output_mask |= 1u64 << pin;
    }

    let out_cfg = gpio_config_t {
        pin_bit_mask: output_mask,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&out_cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    for pin in pins::KEYPAD_ROW_GPIOS {
        gpio_write(pin, true);
    }

    // Inputs: ultrasonic echo (no pull), keypad columns (pull-up).
    let echo_cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::ULTRA_ECHO_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&echo_cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }

    let mut col_mask: u64 = 0;
    for pin in pins::KEYPAD_COL_GPIOS {
        col_mask |= 1u64 << pin;
    }
    let col_cfg = gpio_config_t {
        pin_bit_mask: col_mask,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&col_cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }

    info!("hw_init: GPIO configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: read-only register access on an already-configured input pin.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(_pin: i32) -> bool {
    true
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: register write on an already-configured output pin.
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

// ── LEDC (speaker PWM) ────────────────────────────────────────

/// Speaker PWM duty out of 8191 (13-bit) — roughly 5%, loud enough
/// without clipping the piezo.
#[cfg(target_os = "espidf")]
const SPEAKER_DUTY: u32 = 400;

#[cfg(target_os = "espidf")]
unsafe fn init_ledc() -> Result<(), HwInitError> {
    let timer = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_13_BIT,
        timer_num: ledc_timer_t_LEDC_TIMER_0,
        freq_hz: 2000,
        ..Default::default()
    };
    let ret = unsafe { ledc_timer_config(&timer) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::LedcInitFailed(ret));
    }

    let channel = ledc_channel_config_t {
        gpio_num: pins::SPEAKER_GPIO,
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        channel: ledc_channel_t_LEDC_CHANNEL_0,
        timer_sel: ledc_timer_t_LEDC_TIMER_0,
        duty: 0, // start silent
        ..Default::default()
    };
    let ret = unsafe { ledc_channel_config(&channel) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::LedcInitFailed(ret));
    }

    info!("hw_init: LEDC speaker channel ready");
    Ok(())
}

/// Drive the speaker at `freq_hz`, or silence it when `on` is false.
#[cfg(target_os = "espidf")]
pub fn speaker_tone(freq_hz: u32, on: bool) {
    // SAFETY: LEDC channel 0 is configured once in init_ledc(); these are
    // plain register updates afterwards.
    unsafe {
        if on {
            ledc_set_freq(ledc_mode_t_LEDC_LOW_SPEED_MODE, ledc_timer_t_LEDC_TIMER_0, freq_hz);
            ledc_set_duty(
                ledc_mode_t_LEDC_LOW_SPEED_MODE,
                ledc_channel_t_LEDC_CHANNEL_0,
                SPEAKER_DUTY,
            );
        } else {
            ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, ledc_channel_t_LEDC_CHANNEL_0, 0);
        }
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, ledc_channel_t_LEDC_CHANNEL_0);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn speaker_tone(_freq_hz: u32, _on: bool) {}

// ── I²C (display bus) ─────────────────────────────────────────

#[cfg(target_os = "espidf")]
const I2C_PORT: i32 = 0;

#[cfg(target_os = "espidf")]
unsafe fn init_i2c() -> Result<(), HwInitError> {
    let mut cfg: i2c_config_t = unsafe { core::mem::zeroed() };
    cfg.mode = i2c_mode_t_I2C_MODE_MASTER;
    cfg.sda_io_num = pins::I2C_SDA_GPIO;
    cfg.scl_io_num = pins::I2C_SCL_GPIO;
    cfg.sda_pullup_en = true;
    cfg.scl_pullup_en = true;
    cfg.__bindgen_anon_1.master.clk_speed = 100_000;

    let ret = unsafe { i2c_param_config(I2C_PORT, &cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::I2cInitFailed(ret));
    }
    let ret = unsafe { i2c_driver_install(I2C_PORT, i2c_mode_t_I2C_MODE_MASTER, 0, 0, 0) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::I2cInitFailed(ret));
    }

    info!("hw_init: I2C master ready ({}kHz)", 100);
    Ok(())
}

/// Write one byte to an I²C device. Errors are logged, not propagated —
/// the display is a best-effort sink.
#[cfg(target_os = "espidf")]
pub fn i2c_write_byte(addr: u8, byte: u8) {
    let data = [byte];
    // SAFETY: the I2C driver is installed once in init_i2c().
    let ret = unsafe {
        i2c_master_write_to_device(
            I2C_PORT,
            addr,
            data.as_ptr(),
            data.len(),
            20, // ticks; bounded wait, never indefinite
        )
    };
    if ret != ESP_OK as i32 {
        log::warn!("i2c write to 0x{addr:02x} failed (rc={ret})");
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn i2c_write_byte(_addr: u8, _byte: u8) {}

// ── Busy-wait delay ───────────────────────────────────────────

/// Microsecond busy-wait for bit-banged waveforms (trigger pulses, LCD
/// enable strobes). Keep callers' waits short; anything over a few
/// milliseconds belongs on a timer.
#[cfg(target_os = "espidf")]
pub fn delay_us(us: u32) {
    // SAFETY: esp_rom_delay_us is a plain busy loop.
    unsafe {
        esp_rom_delay_us(us);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn delay_us(_us: u32) {}
