//! Integration tests: event flow through AlarmService → display/telemetry.

use core::cell::RefCell;

use homeguard::app::events::TelemetryRecord;
use homeguard::app::ports::{DisplayPort, TelemetryPort};
use homeguard::app::service::AlarmService;
use homeguard::config::SystemConfig;
use homeguard::events::AlarmEvent;
use homeguard::fsm::AlarmState;
use homeguard::pin_entry::{KeyOutcome, PinCredential, PinEntry};

// ── Mock implementations ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum DisplayCall {
    Line(String),
    Countdown(u16),
    Clear,
}

#[derive(Default)]
struct MockDisplay {
    calls: RefCell<Vec<DisplayCall>>,
}

impl MockDisplay {
    fn calls(&self) -> Vec<DisplayCall> {
        self.calls.borrow().clone()
    }

    fn countdowns(&self) -> Vec<u16> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                DisplayCall::Countdown(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    fn last_line(&self) -> Option<String> {
        self.calls
            .borrow()
            .iter()
            .rev()
            .find_map(|c| match c {
                DisplayCall::Line(t) => Some(t.clone()),
                _ => None,
            })
    }
}

impl DisplayPort for MockDisplay {
    fn show_line1(&self, text: &str) {
        self.calls
            .borrow_mut()
            .push(DisplayCall::Line(text.to_string()));
    }
    fn show_countdown(&self, seconds: u16) {
        self.calls.borrow_mut().push(DisplayCall::Countdown(seconds));
    }
    fn clear(&self) {
        self.calls.borrow_mut().push(DisplayCall::Clear);
    }
}

#[derive(Default)]
struct MockTelemetry {
    records: Vec<TelemetryRecord>,
}

impl TelemetryPort for MockTelemetry {
    fn publish(&mut self, record: &TelemetryRecord) {
        self.records.push(record.clone());
    }
}

fn started_service() -> (AlarmService, MockDisplay, MockTelemetry) {
    let display = MockDisplay::default();
    let mut telemetry = MockTelemetry::default();
    let mut svc = AlarmService::new(SystemConfig::default());
    svc.start(&display, &mut telemetry);
    (svc, display, telemetry)
}

/// Run ticks at the consumer cadence (100 ms) from `from_ms` to `to_ms`
/// inclusive.
fn run_ticks(
    svc: &mut AlarmService,
    display: &MockDisplay,
    telemetry: &mut MockTelemetry,
    from_ms: u64,
    to_ms: u64,
) {
    let mut now = from_ms;
    while now <= to_ms {
        svc.tick(now, display, telemetry);
        now += 100;
    }
}

// ── Scenarios ─────────────────────────────────────────────────

#[test]
fn arm_countdown_and_implicit_arming() {
    let (mut svc, display, mut telemetry) = started_service();

    svc.handle_event(AlarmEvent::ArmLocal, 0, &display, &mut telemetry);
    assert_eq!(svc.state(), AlarmState::ExitDelay);
    assert_eq!(display.last_line().as_deref(), Some("EXIT DELAY"));

    // 15 seconds of 100 ms ticks with no further events.
    run_ticks(&mut svc, &display, &mut telemetry, 100, 15_000);

    assert_eq!(svc.state(), AlarmState::Armed);
    assert_eq!(display.last_line().as_deref(), Some("ARMED"));

    // The countdown surfaced each whole second exactly once, no skips.
    let expected: Vec<u16> = (1..=14).rev().collect();
    assert_eq!(display.countdowns(), expected);
}

#[test]
fn intrusion_and_pin_disarm() {
    let (mut svc, display, mut telemetry) = started_service();

    // Arm and let the exit delay run out.
    svc.handle_event(AlarmEvent::ArmLocal, 0, &display, &mut telemetry);
    run_ticks(&mut svc, &display, &mut telemetry, 100, 15_000);
    assert_eq!(svc.state(), AlarmState::Armed);

    svc.handle_event(AlarmEvent::MotionDetected, 20_000, &display, &mut telemetry);
    assert_eq!(svc.state(), AlarmState::Alarm);
    assert_eq!(display.last_line().as_deref(), Some("ALARM TRIGGERED"));

    // The correct PIN, committed through the reducer, produces the event
    // that silences the alarm.
    let mut entry = PinEntry::new(PinCredential::default());
    for key in ['1', '2', '3', '4'] {
        entry.push_key(key);
    }
    let KeyOutcome::Event(event) = entry.push_key('#') else {
        panic!("commit of the correct PIN must yield an event");
    };
    assert_eq!(event, AlarmEvent::DisarmPinOk);

    svc.handle_event(event, 25_000, &display, &mut telemetry);
    assert_eq!(svc.state(), AlarmState::Disarmed);
    assert_eq!(display.last_line().as_deref(), Some("DISARMED"));
}

#[test]
fn wrong_pin_leaves_the_alarm_sounding() {
    let (mut svc, display, mut telemetry) = started_service();

    svc.handle_event(AlarmEvent::ArmLocal, 0, &display, &mut telemetry);
    run_ticks(&mut svc, &display, &mut telemetry, 100, 15_000);
    svc.handle_event(AlarmEvent::MotionDetected, 16_000, &display, &mut telemetry);
    assert_eq!(svc.state(), AlarmState::Alarm);

    // A wrong PIN produces no event at all, so the core never hears it.
    let mut entry = PinEntry::new(PinCredential::default());
    for key in ['9', '9', '9', '9'] {
        entry.push_key(key);
    }
    assert!(matches!(entry.push_key('#'), KeyOutcome::Rejected(_)));

    assert_eq!(svc.state(), AlarmState::Alarm);
}

#[test]
fn remote_disarm_cancels_exit_delay_midway() {
    let (mut svc, display, mut telemetry) = started_service();

    svc.handle_event(AlarmEvent::ArmRemote, 0, &display, &mut telemetry);
    run_ticks(&mut svc, &display, &mut telemetry, 100, 7_000);
    assert_eq!(svc.state(), AlarmState::ExitDelay);

    svc.handle_event(AlarmEvent::DisarmRemote, 7_100, &display, &mut telemetry);
    assert_eq!(svc.state(), AlarmState::Disarmed);

    // Ticks far past the original deadline must not arm the system — the
    // timer died with the exit delay.
    run_ticks(&mut svc, &display, &mut telemetry, 7_200, 30_000);
    assert_eq!(svc.state(), AlarmState::Disarmed);
}

#[test]
fn telemetry_reports_every_state_change_once() {
    let (mut svc, display, mut telemetry) = started_service();

    svc.handle_event(AlarmEvent::ArmLocal, 0, &display, &mut telemetry);
    run_ticks(&mut svc, &display, &mut telemetry, 100, 15_000);
    svc.handle_event(AlarmEvent::MotionDetected, 16_000, &display, &mut telemetry);
    svc.handle_event(AlarmEvent::DisarmOverride, 17_000, &display, &mut telemetry);

    let states: Vec<&str> = telemetry.records.iter().map(|r| r.state).collect();
    assert_eq!(
        states,
        vec!["DISARMED", "EXIT_DELAY", "ARMED", "ALARM", "DISARMED"]
    );
}

#[test]
fn motion_before_arming_is_ignored() {
    let (mut svc, display, mut telemetry) = started_service();

    svc.handle_event(AlarmEvent::MotionDetected, 1_000, &display, &mut telemetry);
    assert_eq!(svc.state(), AlarmState::Disarmed);

    // During the exit delay motion is equally harmless.
    svc.handle_event(AlarmEvent::ArmLocal, 2_000, &display, &mut telemetry);
    svc.handle_event(AlarmEvent::MotionDetected, 3_000, &display, &mut telemetry);
    assert_eq!(svc.state(), AlarmState::ExitDelay);

    // And it costs nothing: the delay still expires on schedule.
    run_ticks(&mut svc, &display, &mut telemetry, 3_100, 17_000);
    assert_eq!(svc.state(), AlarmState::Armed);
}

#[test]
fn rearming_after_disarm_restarts_a_full_countdown() {
    let (mut svc, display, mut telemetry) = started_service();

    svc.handle_event(AlarmEvent::ArmLocal, 0, &display, &mut telemetry);
    run_ticks(&mut svc, &display, &mut telemetry, 100, 10_000);
    svc.handle_event(AlarmEvent::DisarmPinOk, 10_100, &display, &mut telemetry);
    assert_eq!(svc.state(), AlarmState::Disarmed);

    svc.handle_event(AlarmEvent::ArmLocal, 60_000, &display, &mut telemetry);
    assert_eq!(svc.state(), AlarmState::ExitDelay);

    // 14 seconds in, the second countdown is still running...
    run_ticks(&mut svc, &display, &mut telemetry, 60_100, 74_000);
    assert_eq!(svc.state(), AlarmState::ExitDelay);
    // ...and completes at its own 15 s mark.
    run_ticks(&mut svc, &display, &mut telemetry, 74_100, 75_000);
    assert_eq!(svc.state(), AlarmState::Armed);
}
