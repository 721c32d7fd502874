//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers — no closures, no dynamic
//! dispatch, no heap. The transition table:
//!
//! ```text
//!  DISARMED ──[arm local/remote]──▶ EXIT_DELAY
//!      ▲                                │
//!      │◀──────[disarm]────────────────┤
//!      │                        [deadline elapsed]
//!      │                                ▼
//!      │◀──────[disarm]───────────── ARMED
//!      │                                │
//!      │                           [motion]
//!      │                                ▼
//!      └──────[disarm / reset]────── ALARM
//! ```
//!
//! Every (state, event) pair not drawn above is a defined no-op: the
//! handlers return `None` and the engine leaves state and outputs alone.

use super::context::{CoreContext, DisplayRequest};
use super::{AlarmState, StateDescriptor};
use crate::events::AlarmEvent;
use crate::state;
use log::{info, warn};

/// Build the static state table. Called once at startup.
pub fn build_state_table() -> [StateDescriptor; AlarmState::COUNT] {
    [
        // Index 0 — Disarmed
        StateDescriptor {
            id: AlarmState::Disarmed,
            on_enter: Some(disarmed_enter),
            on_exit: None,
            on_event: disarmed_on_event,
            on_tick: None,
        },
        // Index 1 — ExitDelay
        StateDescriptor {
            id: AlarmState::ExitDelay,
            on_enter: Some(exit_delay_enter),
            on_exit: Some(exit_delay_exit),
            on_event: exit_delay_on_event,
            on_tick: Some(exit_delay_tick),
        },
        // Index 2 — Armed
        StateDescriptor {
            id: AlarmState::Armed,
            on_enter: Some(armed_enter),
            on_exit: None,
            on_event: armed_on_event,
            on_tick: None,
        },
        // Index 3 — Alarm
        StateDescriptor {
            id: AlarmState::Alarm,
            on_enter: Some(alarm_enter),
            on_exit: None,
            on_event: alarm_on_event,
            on_tick: None,
        },
    ]
}

fn is_disarm(event: AlarmEvent) -> bool {
    matches!(
        event,
        AlarmEvent::DisarmPinOk | AlarmEvent::DisarmOverride | AlarmEvent::DisarmRemote
    )
}

// ═══════════════════════════════════════════════════════════════════════════
//  DISARMED
// ═══════════════════════════════════════════════════════════════════════════

fn disarmed_enter(ctx: &mut CoreContext) {
    ctx.display = Some(DisplayRequest::Line("DISARMED"));
}

fn disarmed_on_event(_ctx: &mut CoreContext, event: AlarmEvent) -> Option<AlarmState> {
    match event {
        AlarmEvent::ArmLocal | AlarmEvent::ArmRemote => Some(AlarmState::ExitDelay),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  EXIT_DELAY — grace period before the system is fully armed
// ═══════════════════════════════════════════════════════════════════════════

fn exit_delay_enter(ctx: &mut CoreContext) {
    let secs = ctx.config.exit_delay_secs;
    ctx.exit_deadline_ms = Some(ctx.now_ms + u64::from(secs) * 1000);
    ctx.last_exit_seconds = secs;
    state::publish_exit_seconds(secs);
    ctx.display = Some(DisplayRequest::Line("EXIT DELAY"));
    info!("exit delay started ({secs}s)");
}

fn exit_delay_exit(ctx: &mut CoreContext) {
    ctx.exit_deadline_ms = None;
    ctx.last_exit_seconds = 0;
    state::publish_exit_seconds(0);
}

fn exit_delay_on_event(_ctx: &mut CoreContext, event: AlarmEvent) -> Option<AlarmState> {
    if is_disarm(event) {
        info!("exit delay cancelled");
        return Some(AlarmState::Disarmed);
    }
    None
}

fn exit_delay_tick(ctx: &mut CoreContext) -> Option<AlarmState> {
    let deadline = ctx.exit_deadline_ms?;

    if ctx.now_ms >= deadline {
        // The one transition not driven by an external event.
        return Some(AlarmState::Armed);
    }

    // Edge-triggered countdown: only surface a new value on a whole-second
    // boundary, so the display is not rewritten on every 100 ms tick.
    let remaining = ctx.remaining_exit_secs();
    if remaining != ctx.last_exit_seconds {
        ctx.last_exit_seconds = remaining;
        state::publish_exit_seconds(remaining);
        ctx.display = Some(DisplayRequest::Countdown(remaining));
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  ARMED
// ═══════════════════════════════════════════════════════════════════════════

fn armed_enter(ctx: &mut CoreContext) {
    ctx.display = Some(DisplayRequest::Line("ARMED"));
    info!("system armed");
}

fn armed_on_event(_ctx: &mut CoreContext, event: AlarmEvent) -> Option<AlarmState> {
    if event == AlarmEvent::MotionDetected {
        warn!("motion detected while armed");
        return Some(AlarmState::Alarm);
    }
    if is_disarm(event) {
        return Some(AlarmState::Disarmed);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  ALARM — siren active until disarmed or reset
// ═══════════════════════════════════════════════════════════════════════════

fn alarm_enter(ctx: &mut CoreContext) {
    ctx.display = Some(DisplayRequest::Line("ALARM TRIGGERED"));
    warn!("intrusion alarm raised");
}

fn alarm_on_event(_ctx: &mut CoreContext, event: AlarmEvent) -> Option<AlarmState> {
    if is_disarm(event) || event == AlarmEvent::Reset {
        return Some(AlarmState::Disarmed);
    }
    None
}
