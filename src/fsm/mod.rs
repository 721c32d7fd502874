//! Function-pointer finite state machine engine for the alarm core.
//!
//! Classic embedded FSM pattern expressed in safe Rust:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  StateTable                                                   │
//! │  ┌───────────┬──────────┬──────────┬──────────┬────────────┐  │
//! │  │ AlarmState │ on_enter │ on_exit  │ on_event │ on_tick    │  │
//! │  ├───────────┼──────────┼──────────┼──────────┼────────────┤  │
//! │  │ Disarmed  │ fn(ctx)  │ —        │ fn→Opt<> │ —          │  │
//! │  │ ExitDelay │ fn(ctx)  │ fn(ctx)  │ fn→Opt<> │ fn→Opt<>   │  │
//! │  │ Armed     │ fn(ctx)  │ —        │ fn→Opt<> │ —          │  │
//! │  │ Alarm     │ fn(ctx)  │ —        │ fn→Opt<> │ —          │  │
//! │  └───────────┴──────────┴──────────┴──────────┴────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! The consumer task calls `process()` for every dequeued [`AlarmEvent`]
//! and `tick()` on every loop iteration (including receive timeouts), so
//! the timer-driven EXIT_DELAY expiry flows through the same transition
//! path as event-driven changes. `on_event` handlers return `None` for
//! every (state, event) pair outside the transition table — the table is
//! total, and unmatched pairs are defined no-ops rather than errors.

pub mod context;
pub mod states;

use context::CoreContext;
use log::info;

use crate::events::AlarmEvent;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all alarm states.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AlarmState {
    Disarmed = 0,
    ExitDelay = 1,
    Armed = 2,
    Alarm = 3,
}

impl AlarmState {
    /// Total number of states — used to size the table array.
    pub const COUNT: usize = 4;

    /// Convert a `u8` index back to `AlarmState`. Panics on out-of-range in
    /// debug builds; returns `Alarm` in release (the fail-loud fallback for
    /// a security device).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Disarmed,
            1 => Self::ExitDelay,
            2 => Self::Armed,
            3 => Self::Alarm,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Alarm
            }
        }
    }

    /// Canonical state name, as reported in telemetry and logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Disarmed => "DISARMED",
            Self::ExitDelay => "EXIT_DELAY",
            Self::Armed => "ARMED",
            Self::Alarm => "ALARM",
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut CoreContext);

/// Signature for the event handler of a state.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateEventFn = fn(&mut CoreContext, AlarmEvent) -> Option<AlarmState>;

/// Signature for the periodic tick handler (timer servicing).
pub type StateTickFn = fn(&mut CoreContext) -> Option<AlarmState>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single alarm state.
/// Stored in a fixed-size array — no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: AlarmState,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_event: StateEventFn,
    pub on_tick: Option<StateTickFn>,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The alarm state machine engine.
///
/// Owns the state table (array of [`StateDescriptor`]) and dispatches
/// events and ticks through it. The mutable [`CoreContext`] is threaded
/// through every handler call.
pub struct AlarmFsm {
    /// Fixed-size table indexed by `AlarmState as usize`.
    table: [StateDescriptor; AlarmState::COUNT],
    /// Index of the currently active state.
    current: usize,
}

impl AlarmFsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; AlarmState::COUNT], initial: AlarmState) -> Self {
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Run the initial `on_enter` for the starting state and publish the
    /// first snapshot. Call once after construction.
    pub fn start(&mut self, ctx: &mut CoreContext) {
        info!("alarm core starting in {}", self.current_state().name());
        crate::state::publish_state(self.current_state());
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Feed one dequeued event through the current state's handler.
    /// Unmatched (state, event) pairs return `None` and nothing changes.
    pub fn process(&mut self, ctx: &mut CoreContext, event: AlarmEvent) {
        if let Some(next) = (self.table[self.current].on_event)(ctx, event) {
            self.transition(next, ctx);
        }
    }

    /// Service the current state's timers. Called every consumer loop
    /// iteration, whether or not an event arrived.
    pub fn tick(&mut self, ctx: &mut CoreContext) {
        if let Some(tick) = self.table[self.current].on_tick {
            if let Some(next) = tick(ctx) {
                self.transition(next, ctx);
            }
        }
    }

    /// Force an immediate transition (tests and service tooling).
    pub fn force_transition(&mut self, next: AlarmState, ctx: &mut CoreContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    /// The current state's identity.
    pub fn current_state(&self) -> AlarmState {
        AlarmState::from_index(self.current)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: AlarmState, ctx: &mut CoreContext) {
        info!(
            "state change: {} -> {}",
            self.current_state().name(),
            next_id.name()
        );

        // Exit current state
        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        // Update pointer and expose the new snapshot to reader tasks
        self.current = next_id as usize;
        crate::state::publish_state(next_id);

        // Enter new state
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::context::{CoreContext, DisplayRequest};
    use super::*;
    use crate::config::SystemConfig;

    fn make_ctx() -> CoreContext {
        CoreContext::new(SystemConfig::default())
    }

    fn make_fsm() -> AlarmFsm {
        AlarmFsm::new(states::build_state_table(), AlarmState::Disarmed)
    }

    const DISARM_EVENTS: [AlarmEvent; 3] = [
        AlarmEvent::DisarmPinOk,
        AlarmEvent::DisarmOverride,
        AlarmEvent::DisarmRemote,
    ];

    const ALL_EVENTS: [AlarmEvent; 7] = [
        AlarmEvent::ArmLocal,
        AlarmEvent::ArmRemote,
        AlarmEvent::DisarmPinOk,
        AlarmEvent::DisarmOverride,
        AlarmEvent::DisarmRemote,
        AlarmEvent::MotionDetected,
        AlarmEvent::Reset,
    ];

    #[test]
    fn starts_disarmed() {
        let fsm = make_fsm();
        assert_eq!(fsm.current_state(), AlarmState::Disarmed);
    }

    #[test]
    fn start_requests_disarmed_display() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        assert_eq!(ctx.display, Some(DisplayRequest::Line("DISARMED")));
    }

    #[test]
    fn arm_starts_exit_delay_with_full_countdown() {
        for arm in [AlarmEvent::ArmLocal, AlarmEvent::ArmRemote] {
            let mut fsm = make_fsm();
            let mut ctx = make_ctx();
            fsm.start(&mut ctx);

            ctx.now_ms = 5_000;
            fsm.process(&mut ctx, arm);
            assert_eq!(fsm.current_state(), AlarmState::ExitDelay);
            assert_eq!(ctx.display, Some(DisplayRequest::Line("EXIT DELAY")));
            assert_eq!(ctx.exit_deadline_ms, Some(5_000 + 15_000));
            assert_eq!(ctx.last_exit_seconds, 15);
        }
    }

    #[test]
    fn disarm_cancels_exit_delay() {
        for disarm in DISARM_EVENTS {
            let mut fsm = make_fsm();
            let mut ctx = make_ctx();
            fsm.start(&mut ctx);
            fsm.process(&mut ctx, AlarmEvent::ArmLocal);

            fsm.process(&mut ctx, disarm);
            assert_eq!(fsm.current_state(), AlarmState::Disarmed);
            assert_eq!(ctx.display, Some(DisplayRequest::Line("DISARMED")));
            assert_eq!(ctx.exit_deadline_ms, None);
        }
    }

    #[test]
    fn exit_delay_expiry_arms_without_an_event() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);

        ctx.now_ms = 0;
        fsm.process(&mut ctx, AlarmEvent::ArmLocal);

        // One tick shy of the deadline: still in exit delay.
        ctx.now_ms = 14_900;
        fsm.tick(&mut ctx);
        assert_eq!(fsm.current_state(), AlarmState::ExitDelay);

        ctx.now_ms = 15_000;
        fsm.tick(&mut ctx);
        assert_eq!(fsm.current_state(), AlarmState::Armed);
        assert_eq!(ctx.display, Some(DisplayRequest::Line("ARMED")));
        assert_eq!(ctx.last_exit_seconds, 0);
        assert_eq!(ctx.exit_deadline_ms, None);
    }

    #[test]
    fn countdown_updates_exactly_once_per_second() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);

        ctx.now_ms = 0;
        fsm.process(&mut ctx, AlarmEvent::ArmLocal);
        ctx.display = None;

        let mut updates = Vec::new();
        // Tick at the consumer cadence (100 ms) right up to the deadline.
        for step in 1..150 {
            ctx.now_ms = step * 100;
            fsm.tick(&mut ctx);
            if let Some(DisplayRequest::Countdown(secs)) = ctx.display.take() {
                updates.push(secs);
            }
        }
        // 15 → entry value; ticks surface 14 down to 1, each exactly once.
        let expected: Vec<u16> = (1..=14).rev().collect();
        assert_eq!(updates, expected);
        assert_eq!(fsm.current_state(), AlarmState::ExitDelay);

        ctx.now_ms = 15_000;
        fsm.tick(&mut ctx);
        assert_eq!(fsm.current_state(), AlarmState::Armed);
    }

    #[test]
    fn motion_while_armed_raises_alarm() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        fsm.force_transition(AlarmState::Armed, &mut ctx);

        fsm.process(&mut ctx, AlarmEvent::MotionDetected);
        assert_eq!(fsm.current_state(), AlarmState::Alarm);
        assert_eq!(ctx.display, Some(DisplayRequest::Line("ALARM TRIGGERED")));
    }

    #[test]
    fn motion_is_a_noop_outside_armed() {
        for start in [AlarmState::Disarmed, AlarmState::ExitDelay, AlarmState::Alarm] {
            let mut fsm = make_fsm();
            let mut ctx = make_ctx();
            fsm.start(&mut ctx);
            if start != AlarmState::Disarmed {
                fsm.force_transition(start, &mut ctx);
            }
            ctx.display = None;

            fsm.process(&mut ctx, AlarmEvent::MotionDetected);
            assert_eq!(fsm.current_state(), start);
            assert_eq!(ctx.display, None);
        }
    }

    #[test]
    fn armed_disarms_on_any_disarm_event() {
        for disarm in DISARM_EVENTS {
            let mut fsm = make_fsm();
            let mut ctx = make_ctx();
            fsm.start(&mut ctx);
            fsm.force_transition(AlarmState::Armed, &mut ctx);

            fsm.process(&mut ctx, disarm);
            assert_eq!(fsm.current_state(), AlarmState::Disarmed);
        }
    }

    #[test]
    fn alarm_clears_on_disarm_or_reset() {
        for ev in [
            AlarmEvent::DisarmPinOk,
            AlarmEvent::DisarmOverride,
            AlarmEvent::DisarmRemote,
            AlarmEvent::Reset,
        ] {
            let mut fsm = make_fsm();
            let mut ctx = make_ctx();
            fsm.start(&mut ctx);
            fsm.force_transition(AlarmState::Alarm, &mut ctx);

            fsm.process(&mut ctx, ev);
            assert_eq!(fsm.current_state(), AlarmState::Disarmed);
            assert_eq!(ctx.display, Some(DisplayRequest::Line("DISARMED")));
        }
    }

    #[test]
    fn reset_is_a_noop_outside_alarm() {
        for start in [AlarmState::Disarmed, AlarmState::ExitDelay, AlarmState::Armed] {
            let mut fsm = make_fsm();
            let mut ctx = make_ctx();
            fsm.start(&mut ctx);
            if start != AlarmState::Disarmed {
                fsm.force_transition(start, &mut ctx);
            }
            ctx.display = None;

            fsm.process(&mut ctx, AlarmEvent::Reset);
            assert_eq!(fsm.current_state(), start);
            assert_eq!(ctx.display, None);
        }
    }

    #[test]
    fn every_unmatched_pair_is_a_noop() {
        // The transition table, by (state, event) pairs that DO transition.
        let table: &[(AlarmState, AlarmEvent)] = &[
            (AlarmState::Disarmed, AlarmEvent::ArmLocal),
            (AlarmState::Disarmed, AlarmEvent::ArmRemote),
            (AlarmState::ExitDelay, AlarmEvent::DisarmPinOk),
            (AlarmState::ExitDelay, AlarmEvent::DisarmOverride),
            (AlarmState::ExitDelay, AlarmEvent::DisarmRemote),
            (AlarmState::Armed, AlarmEvent::MotionDetected),
            (AlarmState::Armed, AlarmEvent::DisarmPinOk),
            (AlarmState::Armed, AlarmEvent::DisarmOverride),
            (AlarmState::Armed, AlarmEvent::DisarmRemote),
            (AlarmState::Alarm, AlarmEvent::DisarmPinOk),
            (AlarmState::Alarm, AlarmEvent::DisarmOverride),
            (AlarmState::Alarm, AlarmEvent::DisarmRemote),
            (AlarmState::Alarm, AlarmEvent::Reset),
        ];

        for start_idx in 0..AlarmState::COUNT {
            let start = AlarmState::from_index(start_idx);
            for ev in ALL_EVENTS {
                if table.contains(&(start, ev)) {
                    continue;
                }
                let mut fsm = make_fsm();
                let mut ctx = make_ctx();
                fsm.start(&mut ctx);
                if start != AlarmState::Disarmed {
                    fsm.force_transition(start, &mut ctx);
                }
                let deadline_before = ctx.exit_deadline_ms;
                ctx.display = None;

                fsm.process(&mut ctx, ev);
                assert_eq!(fsm.current_state(), start, "{start:?} x {ev:?}");
                assert_eq!(ctx.display, None, "{start:?} x {ev:?}");
                assert_eq!(ctx.exit_deadline_ms, deadline_before, "{start:?} x {ev:?}");
            }
        }
    }

    #[test]
    fn state_id_from_index_roundtrip() {
        for i in 0..AlarmState::COUNT {
            let id = AlarmState::from_index(i);
            assert_eq!(id as usize, i);
        }
    }
}
