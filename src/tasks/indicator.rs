//! Indicator task: status LEDs derived from the state snapshot.
//!
//! Like the speaker task this reads only the atomic snapshot. Steady
//! colours for the settled states; during EXIT_DELAY the armed LED blinks
//! with the countdown's urgency.

use embassy_time::{Duration, Timer};

use crate::adapters::time::MonotonicClock;
use crate::drivers::status_led::IndicatorLeds;
use crate::fsm::AlarmState;
use crate::state;

const UPDATE_INTERVAL: Duration = Duration::from_millis(50);

pub async fn indicator_task(mut leds: IndicatorLeds, clock: &MonotonicClock) {
    let mut shown: Option<AlarmState> = None;

    loop {
        let current = state::snapshot();

        if shown != Some(current) {
            shown = Some(current);
            match current {
                AlarmState::Disarmed => leds.set_disarmed(),
                AlarmState::Armed => leds.set_armed(),
                AlarmState::Alarm => leds.set_alarm(),
                // Blink handling below owns the LED during the delay.
                AlarmState::ExitDelay => {}
            }
        }

        if current == AlarmState::ExitDelay {
            leds.set_exit_delay_intensity(clock.uptime_ms(), state::exit_seconds_remaining());
        }

        Timer::after(UPDATE_INTERVAL).await;
    }
}
