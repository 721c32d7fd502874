//! Alarm service — the single consumer of the event channel.
//!
//! [`AlarmService`] owns the FSM and its context, and translates the
//! core's requested side effects into port calls. All I/O flows through
//! port traits injected at call sites, making the entire service testable
//! with mock adapters. It is only ever driven from the alarm task, which
//! preserves the one-consumer invariant of the event channel.

use log::info;

use crate::config::SystemConfig;
use crate::events::AlarmEvent;
use crate::fsm::context::{CoreContext, DisplayRequest};
use crate::fsm::states::build_state_table;
use crate::fsm::{AlarmFsm, AlarmState};
use crate::state;

use super::events::TelemetryRecord;
use super::ports::{DisplayPort, TelemetryPort};

/// The application service orchestrating the alarm core.
pub struct AlarmService {
    fsm: AlarmFsm,
    ctx: CoreContext,
}

impl AlarmService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM — call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        let ctx = CoreContext::new(config);
        let fsm = AlarmFsm::new(build_state_table(), AlarmState::Disarmed);
        Self { fsm, ctx }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start the FSM in DISARMED and render the initial display.
    pub fn start(&mut self, display: &impl DisplayPort, telemetry: &mut impl TelemetryPort) {
        self.fsm.start(&mut self.ctx);
        self.flush_display(display);
        telemetry.publish(&self.build_telemetry());
        info!("alarm service started in {}", self.state().name());
    }

    // ── Per-step orchestration ────────────────────────────────

    /// Feed one dequeued event through the core.
    ///
    /// `now_ms` is the monotonic time of this step; side effects requested
    /// by the handlers are applied fire-and-forget after the transition.
    pub fn handle_event(
        &mut self,
        event: AlarmEvent,
        now_ms: u64,
        display: &impl DisplayPort,
        telemetry: &mut impl TelemetryPort,
    ) {
        let prev = self.fsm.current_state();
        self.ctx.now_ms = now_ms;
        self.fsm.process(&mut self.ctx, event);
        self.finish_step(prev, display, telemetry);
    }

    /// Service the core's timers. Called every consumer loop iteration,
    /// including receive timeouts, so EXIT_DELAY expires without any
    /// externally delivered event.
    pub fn tick(
        &mut self,
        now_ms: u64,
        display: &impl DisplayPort,
        telemetry: &mut impl TelemetryPort,
    ) {
        let prev = self.fsm.current_state();
        self.ctx.now_ms = now_ms;
        self.fsm.tick(&mut self.ctx);
        self.finish_step(prev, display, telemetry);
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current alarm state.
    pub fn state(&self) -> AlarmState {
        self.fsm.current_state()
    }

    /// Build a telemetry snapshot: state name plus the last stable
    /// distance published by the motion task.
    pub fn build_telemetry(&self) -> TelemetryRecord {
        TelemetryRecord {
            state: self.fsm.current_state().name(),
            distance_cm: state::last_distance_cm(),
        }
    }

    // ── Internal ──────────────────────────────────────────────

    /// Apply the display request from the last step and report a state
    /// change, if any. Telemetry fires only when old ≠ new — ticks that
    /// stay in place are silent.
    fn finish_step(
        &mut self,
        prev: AlarmState,
        display: &impl DisplayPort,
        telemetry: &mut impl TelemetryPort,
    ) {
        self.flush_display(display);
        if self.fsm.current_state() != prev {
            telemetry.publish(&self.build_telemetry());
        }
    }

    fn flush_display(&mut self, display: &impl DisplayPort) {
        if let Some(request) = self.ctx.display.take() {
            match request {
                DisplayRequest::Line(text) => display.show_line1(text),
                DisplayRequest::Countdown(secs) => display.show_countdown(secs),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;

    #[derive(Default)]
    struct RecordingDisplay {
        lines: RefCell<Vec<String>>,
        countdowns: RefCell<Vec<u16>>,
    }

    impl DisplayPort for RecordingDisplay {
        fn show_line1(&self, text: &str) {
            self.lines.borrow_mut().push(text.to_string());
        }
        fn show_countdown(&self, seconds: u16) {
            self.countdowns.borrow_mut().push(seconds);
        }
        fn clear(&self) {}
    }

    #[derive(Default)]
    struct RecordingTelemetry {
        records: Vec<TelemetryRecord>,
    }

    impl TelemetryPort for RecordingTelemetry {
        fn publish(&mut self, record: &TelemetryRecord) {
            self.records.push(record.clone());
        }
    }

    #[test]
    fn telemetry_fires_on_change_not_on_idle_ticks() {
        let display = RecordingDisplay::default();
        let mut telemetry = RecordingTelemetry::default();
        let mut svc = AlarmService::new(SystemConfig::default());
        svc.start(&display, &mut telemetry);
        assert_eq!(telemetry.records.len(), 1); // startup snapshot

        for step in 1..=5u64 {
            svc.tick(step * 100, &display, &mut telemetry);
        }
        assert_eq!(telemetry.records.len(), 1); // no transitions, no reports

        svc.handle_event(AlarmEvent::ArmLocal, 600, &display, &mut telemetry);
        assert_eq!(telemetry.records.len(), 2);
        assert_eq!(telemetry.records[1].state, "EXIT_DELAY");
    }

    #[test]
    fn display_follows_the_state_banner() {
        let display = RecordingDisplay::default();
        let mut telemetry = RecordingTelemetry::default();
        let mut svc = AlarmService::new(SystemConfig::default());
        svc.start(&display, &mut telemetry);

        svc.handle_event(AlarmEvent::ArmLocal, 0, &display, &mut telemetry);
        svc.handle_event(AlarmEvent::DisarmRemote, 500, &display, &mut telemetry);

        assert_eq!(
            *display.lines.borrow(),
            vec!["DISARMED", "EXIT DELAY", "DISARMED"]
        );
    }
}
