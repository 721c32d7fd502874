//! Shared mutable context threaded through every state handler.
//!
//! `CoreContext` is the blackboard the handlers read from and write to:
//! configuration, the consumer loop's notion of "now", the exit-delay
//! deadline, and the display side effect requested by the last step. The
//! service drains `display` after each `process()`/`tick()` and forwards
//! it to the display port — handlers never touch hardware.

use crate::config::SystemConfig;

/// A display write requested by a state handler, applied fire-and-forget
/// by the service after the step completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayRequest {
    /// Replace the status line.
    Line(&'static str),
    /// Update the exit-delay countdown readout.
    Countdown(u16),
}

/// The shared context passed to every state handler function.
pub struct CoreContext {
    /// System configuration (tunable parameters).
    pub config: SystemConfig,

    /// Monotonic time of the current step, in milliseconds. Set by the
    /// service before each `process()`/`tick()` call.
    pub now_ms: u64,

    /// Absolute deadline of the running exit delay. `Some` only while the
    /// FSM is in EXIT_DELAY.
    pub exit_deadline_ms: Option<u64>,

    /// Remaining-seconds value most recently surfaced to the display and
    /// the snapshot atomics. Countdown updates are edge-triggered on this.
    pub last_exit_seconds: u16,

    /// Display side effect requested by the current step, if any.
    pub display: Option<DisplayRequest>,
}

impl CoreContext {
    /// Create a new context with the given configuration.
    pub fn new(config: SystemConfig) -> Self {
        Self {
            config,
            now_ms: 0,
            exit_deadline_ms: None,
            last_exit_seconds: 0,
            display: None,
        }
    }

    /// Whole seconds left until the exit-delay deadline:
    /// `max(0, ceil((deadline − now) / 1s))`. Zero when no delay is running.
    pub fn remaining_exit_secs(&self) -> u16 {
        match self.exit_deadline_ms {
            Some(deadline) => {
                let left_ms = deadline.saturating_sub(self.now_ms);
                left_ms.div_ceil(1000) as u16
            }
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_rounds_up_to_whole_seconds() {
        let mut ctx = CoreContext::new(SystemConfig::default());
        ctx.exit_deadline_ms = Some(15_000);

        ctx.now_ms = 0;
        assert_eq!(ctx.remaining_exit_secs(), 15);
        ctx.now_ms = 1;
        assert_eq!(ctx.remaining_exit_secs(), 15);
        ctx.now_ms = 14_001;
        assert_eq!(ctx.remaining_exit_secs(), 1);
        ctx.now_ms = 15_000;
        assert_eq!(ctx.remaining_exit_secs(), 0);
        // Past the deadline the counter clamps at zero.
        ctx.now_ms = 20_000;
        assert_eq!(ctx.remaining_exit_secs(), 0);
    }

    #[test]
    fn remaining_is_zero_without_a_deadline() {
        let ctx = CoreContext::new(SystemConfig::default());
        assert_eq!(ctx.remaining_exit_secs(), 0);
    }
}
