//! Long-running tasks, one per responsibility.
//!
//! Producers (motion, keypad, remote) convert raw activity into
//! [`AlarmEvent`](crate::events::AlarmEvent)s; the alarm task is the
//! single consumer; speaker and indicator read only the atomic state
//! snapshot. All tasks are spawned once at startup on the executor in
//! `main` and run for the lifetime of the process.
//!
//! ```text
//!  motion ──┐                       ┌──▶ display (mutex)
//!  keypad ──┼──▶ events ──▶ alarm ──┼──▶ telemetry log
//!  remote ──┘                 │     └──▶ state snapshot ──┬──▶ speaker
//!                             └── tick (100 ms bound)     └──▶ indicator
//! ```

pub mod alarm;
pub mod indicator;
pub mod keypad;
pub mod motion;
pub mod remote;
pub mod speaker;
