//! Piezo speaker driver: continuous alarm tone and short beeps.
//!
//! The siren is a continuous 2 kHz tone; exit-delay feedback is short
//! 1.5 kHz beeps. A beep is non-blocking: `beep()` starts it and records
//! the end time, and the speaker task's periodic `update()` call silences
//! it once the duration has elapsed. The continuous tone always overrides
//! beeps.
//!
//! On ESP-IDF the tone comes from the LEDC PWM channel configured in
//! hw_init; on host the driver just tracks what it would be doing.

use crate::drivers::hw_init;

/// Continuous alarm tone frequency.
const ALARM_FREQ_HZ: u32 = 2000;
/// Short beep frequency.
const BEEP_FREQ_HZ: u32 = 1500;

pub struct SpeakerDriver {
    alarm_active: bool,
    /// Monotonic ms at which the current beep ends; 0 = no beep running.
    beep_end_ms: u64,
}

impl SpeakerDriver {
    pub fn new() -> Self {
        Self {
            alarm_active: false,
            beep_end_ms: 0,
        }
    }

    /// Start or stop the continuous alarm tone.
    pub fn set_continuous_tone(&mut self, on: bool) {
        if self.alarm_active == on {
            return;
        }
        self.alarm_active = on;
        hw_init::speaker_tone(ALARM_FREQ_HZ, on);
        if on {
            log::info!("speaker: alarm tone on");
        } else {
            log::info!("speaker: alarm tone off");
        }
    }

    /// Start a short beep ending `duration_ms` from `now_ms`. Ignored
    /// while the alarm tone is active.
    pub fn beep(&mut self, now_ms: u64, duration_ms: u32) {
        if self.alarm_active {
            return;
        }
        self.beep_end_ms = now_ms + u64::from(duration_ms);
        hw_init::speaker_tone(BEEP_FREQ_HZ, true);
    }

    /// Silence an elapsed beep. Call periodically from the speaker task.
    pub fn update(&mut self, now_ms: u64) {
        if self.alarm_active {
            return; // continuous tone overrides beep bookkeeping
        }
        if self.beep_end_ms != 0 && now_ms >= self.beep_end_ms {
            hw_init::speaker_tone(BEEP_FREQ_HZ, false);
            self.beep_end_ms = 0;
        }
    }

    /// True while the continuous alarm tone is active.
    pub fn alarm_tone_active(&self) -> bool {
        self.alarm_active
    }

    /// True while a beep is sounding.
    pub fn beep_active(&self) -> bool {
        self.beep_end_ms != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beep_ends_after_duration() {
        let mut spk = SpeakerDriver::new();
        spk.beep(1_000, 80);
        assert!(spk.beep_active());

        spk.update(1_050);
        assert!(spk.beep_active());
        spk.update(1_080);
        assert!(!spk.beep_active());
    }

    #[test]
    fn alarm_tone_overrides_beeps() {
        let mut spk = SpeakerDriver::new();
        spk.set_continuous_tone(true);
        assert!(spk.alarm_tone_active());

        // Beeps are swallowed while the siren sounds.
        spk.beep(0, 80);
        assert!(!spk.beep_active());

        spk.set_continuous_tone(false);
        assert!(!spk.alarm_tone_active());
    }
}
