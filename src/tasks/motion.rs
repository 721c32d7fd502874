//! Motion detection task.
//!
//! Every poll interval: take a burst of raw ultrasonic readings, fold
//! them through the detector's filters, publish the stable distance for
//! telemetry, and raise `MotionDetected` when something is inside the
//! threshold while the system is armed. Emission is gated on ARMED purely
//! to avoid flooding the queue — the state table ignores motion in every
//! other state anyway.

use embassy_time::{Duration, Timer};
use heapless::Vec;

use crate::config::SystemConfig;
use crate::drivers::ultrasonic::UltrasonicDriver;
use crate::events::{AlarmEvent, send_event};
use crate::fsm::AlarmState;
use crate::sensors::motion::MotionDetector;
use crate::state;

/// Spacing between the raw readings of one burst.
const SAMPLE_GAP: Duration = Duration::from_millis(10);

/// Upper bound on configurable burst length.
const MAX_BURST: usize = 16;

pub async fn motion_task(mut driver: UltrasonicDriver, config: SystemConfig) {
    let mut detector = MotionDetector::new(&config);
    let poll_interval = Duration::from_millis(u64::from(config.sensor_poll_interval_ms));
    let burst_len = usize::from(config.burst_samples).min(MAX_BURST);

    let mut samples: Vec<Option<u16>, MAX_BURST> = Vec::new();

    loop {
        samples.clear();
        for _ in 0..burst_len {
            let _ = samples.push(driver.measure_once().ok());
            Timer::after(SAMPLE_GAP).await;
        }

        // A fully invalid burst was already logged by the detector; the
        // previous stable reading stands until the sensor recovers.
        if let Ok(stable_cm) = detector.integrate_burst(&samples) {
            state::publish_distance(stable_cm);

            if detector.within_threshold(stable_cm) && state::snapshot() == AlarmState::Armed {
                send_event(AlarmEvent::MotionDetected);
            }
        }

        Timer::after(poll_interval).await;
    }
}
