//! The alarm core's consumer task.
//!
//! The only task that ever calls `EVENT_CHANNEL.receive()`, which keeps
//! state transitions serialised: one event, one coherent step. The wait
//! is bounded so `tick()` runs even through quiet spells — the exit-delay
//! countdown depends on it.

use embassy_time::{Duration, with_timeout};

use crate::adapters::telemetry::LogTelemetrySink;
use crate::adapters::time::MonotonicClock;
use crate::app::ports::TelemetryPort;
use crate::app::service::AlarmService;
use crate::drivers::lcd::SharedDisplay;
use crate::drivers::watchdog::Watchdog;
use crate::events::EVENT_CHANNEL;

pub async fn alarm_task(
    mut service: AlarmService,
    display: &SharedDisplay,
    clock: &MonotonicClock,
    watchdog: Watchdog,
    receive_timeout_ms: u32,
    telemetry_interval_secs: u32,
) {
    let mut telemetry = LogTelemetrySink::new();
    service.start(display, &mut telemetry);

    let receive_timeout = Duration::from_millis(u64::from(receive_timeout_ms));
    let telemetry_interval_ms = u64::from(telemetry_interval_secs) * 1000;
    let mut next_telemetry_ms = clock.uptime_ms() + telemetry_interval_ms;

    loop {
        // Bounded wait; a timeout just means "no event this round".
        if let Ok(event) = with_timeout(receive_timeout, EVENT_CHANNEL.receive()).await {
            service.handle_event(event, clock.uptime_ms(), display, &mut telemetry);
        }

        // Timer servicing runs every iteration, event or not.
        service.tick(clock.uptime_ms(), display, &mut telemetry);

        // Interval telemetry, in addition to the on-change reports the
        // service emits itself.
        let now_ms = clock.uptime_ms();
        if now_ms >= next_telemetry_ms {
            next_telemetry_ms = now_ms + telemetry_interval_ms;
            telemetry.publish(&service.build_telemetry());
        }

        watchdog.feed();
    }
}
