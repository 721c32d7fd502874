//! HC-SR04 ultrasonic ranging driver.
//!
//! One measurement: a 10 µs trigger pulse, then time the echo line's high
//! pulse and convert to centimetres (duration_us / 58). Both echo edges
//! are bounded by a fixed timeout counter, so a wedged or disconnected
//! sensor yields [`SensorError::EchoTimeout`] instead of hanging the
//! motion task.
//!
//! Range plausibility and spike filtering live in
//! [`crate::sensors::motion`] — this driver reports what the hardware
//! said, including nonsense.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: bit-bangs trigger/echo via hw_init. On host/test: returns
//! readings injected through [`sim_set_distance`].

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicI32, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::error::SensorError;
#[cfg(target_os = "espidf")]
use crate::pins;

/// Echo edge wait bound, in 1 µs busy-wait steps. 30 ms covers the
/// sensor's full range with margin.
#[cfg(target_os = "espidf")]
const ECHO_TIMEOUT_STEPS: u32 = 30_000;

#[cfg(not(target_os = "espidf"))]
static SIM_DISTANCE_CM: AtomicI32 = AtomicI32::new(-1);

/// Inject a reading for host-side simulation; `None` simulates an echo
/// timeout.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_distance(cm: Option<u16>) {
    SIM_DISTANCE_CM.store(cm.map_or(-1, i32::from), Ordering::Release);
}

pub struct UltrasonicDriver {
    #[cfg(target_os = "espidf")]
    trig_pin: i32,
    #[cfg(target_os = "espidf")]
    echo_pin: i32,
}

impl UltrasonicDriver {
    pub fn new() -> Self {
        Self {
            #[cfg(target_os = "espidf")]
            trig_pin: pins::ULTRA_TRIG_GPIO,
            #[cfg(target_os = "espidf")]
            echo_pin: pins::ULTRA_ECHO_GPIO,
        }
    }

    /// Take a single raw measurement. An `EchoTimeout` means the echo
    /// never arrived (or never ended) within the timeout bound.
    #[cfg(target_os = "espidf")]
    pub fn measure_once(&mut self) -> Result<u16, SensorError> {
        hw_init::gpio_write(self.trig_pin, false);
        hw_init::delay_us(2);
        hw_init::gpio_write(self.trig_pin, true);
        hw_init::delay_us(10);
        hw_init::gpio_write(self.trig_pin, false);

        // Wait for the echo pulse to start.
        let mut timeout = ECHO_TIMEOUT_STEPS;
        while !hw_init::gpio_read(self.echo_pin) {
            timeout -= 1;
            if timeout == 0 {
                return Err(SensorError::EchoTimeout);
            }
            hw_init::delay_us(1);
        }

        let start_us = Self::now_us();

        // Wait for it to end.
        let mut timeout = ECHO_TIMEOUT_STEPS;
        while hw_init::gpio_read(self.echo_pin) {
            timeout -= 1;
            if timeout == 0 {
                return Err(SensorError::EchoTimeout);
            }
            hw_init::delay_us(1);
        }

        let duration_us = Self::now_us().saturating_sub(start_us);
        Ok((duration_us / 58) as u16)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn measure_once(&mut self) -> Result<u16, SensorError> {
        let raw = SIM_DISTANCE_CM.load(Ordering::Acquire);
        if raw < 0 {
            Err(SensorError::EchoTimeout)
        } else {
            Ok(raw as u16)
        }
    }

    #[cfg(target_os = "espidf")]
    fn now_us() -> u64 {
        // SAFETY: esp_timer_get_time reads the monotonic high-resolution
        // timer; no preconditions.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }
}
