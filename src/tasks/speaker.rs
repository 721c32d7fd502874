//! Speaker task: audible feedback derived from the state snapshot.
//!
//! Reads the atomic alarm state — never the event queue — so it needs no
//! knowledge of transitions. ALARM holds the continuous siren; EXIT_DELAY
//! beeps with rising urgency as the countdown approaches zero; everything
//! else is silence.

use embassy_time::{Duration, Timer};

use crate::adapters::time::MonotonicClock;
use crate::drivers::speaker::SpeakerDriver;
use crate::fsm::AlarmState;
use crate::state;

/// Poll/update cadence; also bounds beep turn-off latency.
const UPDATE_INTERVAL: Duration = Duration::from_millis(20);

/// Length of one exit-delay beep.
const BEEP_MS: u32 = 80;

/// Beep spacing for the urgency bands (remaining >10 s, 6–10 s, ≤5 s).
fn beep_interval_ms(seconds_left: u16) -> u64 {
    match seconds_left {
        s if s > 10 => 800,
        s if s > 5 => 400,
        _ => 150,
    }
}

pub async fn speaker_task(mut speaker: SpeakerDriver, clock: &MonotonicClock) {
    let mut last_beep_ms = clock.uptime_ms();

    loop {
        let now_ms = clock.uptime_ms();
        speaker.update(now_ms);

        match state::snapshot() {
            AlarmState::Alarm => {
                speaker.set_continuous_tone(true);
            }
            AlarmState::ExitDelay => {
                speaker.set_continuous_tone(false);

                let seconds_left = state::exit_seconds_remaining();
                if now_ms.saturating_sub(last_beep_ms) >= beep_interval_ms(seconds_left) {
                    last_beep_ms = now_ms;
                    speaker.beep(now_ms, BEEP_MS);
                }
            }
            _ => {
                speaker.set_continuous_tone(false);
            }
        }

        Timer::after(UPDATE_INTERVAL).await;
    }
}
