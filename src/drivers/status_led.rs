//! Status LED bank: three discrete LEDs mirror the alarm state.
//!
//! Green = disarmed, blue = armed, red = alarm. During EXIT_DELAY the
//! armed LED blinks, speeding up as the deadline approaches (same urgency
//! bands as the speaker cadence).
//!
//! On ESP-IDF the LEDs are plain GPIO outputs; on host the driver tracks
//! levels in memory for tests.

use crate::drivers::hw_init;
use crate::pins;

pub struct IndicatorLeds {
    /// Monotonic ms of the last exit-delay blink toggle.
    last_toggle_ms: u64,
    /// Current level of the armed LED while blinking.
    armed_level: bool,
    #[cfg(not(target_os = "espidf"))]
    sim_levels: (bool, bool, bool),
}

impl IndicatorLeds {
    pub fn new() -> Self {
        Self {
            last_toggle_ms: 0,
            armed_level: false,
            #[cfg(not(target_os = "espidf"))]
            sim_levels: (false, false, false),
        }
    }

    /// Steady green.
    pub fn set_disarmed(&mut self) {
        self.write(true, false, false);
    }

    /// Steady blue.
    pub fn set_armed(&mut self) {
        self.write(false, true, false);
    }

    /// Steady red.
    pub fn set_alarm(&mut self) {
        self.write(false, false, true);
    }

    /// Blink the armed LED with urgency proportional to the remaining
    /// exit-delay seconds. Call repeatedly; toggles happen on period
    /// boundaries relative to `now_ms`.
    pub fn set_exit_delay_intensity(&mut self, now_ms: u64, seconds_left: u16) {
        let period_ms: u64 = match seconds_left {
            s if s > 10 => 800,
            s if s > 5 => 400,
            _ => 150,
        };

        if now_ms.saturating_sub(self.last_toggle_ms) >= period_ms {
            self.last_toggle_ms = now_ms;
            self.armed_level = !self.armed_level;
            self.write(false, self.armed_level, false);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn levels(&self) -> (bool, bool, bool) {
        self.sim_levels
    }

    fn write(&mut self, disarmed: bool, armed: bool, alarm: bool) {
        hw_init::gpio_write(pins::LED_DISARMED_GPIO, disarmed);
        hw_init::gpio_write(pins::LED_ARMED_GPIO, armed);
        hw_init::gpio_write(pins::LED_ALARM_GPIO, alarm);
        #[cfg(not(target_os = "espidf"))]
        {
            self.sim_levels = (disarmed, armed, alarm);
        }
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn state_leds_are_mutually_exclusive() {
        let mut leds = IndicatorLeds::new();
        leds.set_disarmed();
        assert_eq!(leds.levels(), (true, false, false));
        leds.set_armed();
        assert_eq!(leds.levels(), (false, true, false));
        leds.set_alarm();
        assert_eq!(leds.levels(), (false, false, true));
    }

    #[test]
    fn exit_delay_blink_speeds_up_near_zero() {
        let mut leds = IndicatorLeds::new();

        // Relaxed band: a toggle at t=800, none again until t=1600.
        leds.set_exit_delay_intensity(800, 14);
        let after_first = leds.levels().1;
        leds.set_exit_delay_intensity(1_200, 14);
        assert_eq!(leds.levels().1, after_first);
        leds.set_exit_delay_intensity(1_600, 14);
        assert_ne!(leds.levels().1, after_first);

        // Urgent band: 150 ms period.
        leds.set_exit_delay_intensity(1_750, 3);
        let urgent = leds.levels().1;
        leds.set_exit_delay_intensity(1_900, 3);
        assert_ne!(leds.levels().1, urgent);
    }
}
