//! Remote command polling task.
//!
//! Polls the remote link on a relaxed cadence and converts its commands
//! into alarm events. The link itself decides what counts as a valid
//! command; malformed input is dropped and logged there, so this task
//! only ever sees well-formed requests.

use embassy_time::{Duration, Timer};

use crate::adapters::remote::{RemoteCommand, RemoteLink};
use crate::events::{AlarmEvent, send_event};

pub async fn remote_task(mut link: RemoteLink, poll_interval_ms: u32) {
    let poll_interval = Duration::from_millis(u64::from(poll_interval_ms));

    loop {
        match link.poll() {
            Some(RemoteCommand::Arm) => {
                send_event(AlarmEvent::ArmRemote);
            }
            Some(RemoteCommand::Disarm) => {
                send_event(AlarmEvent::DisarmRemote);
            }
            None => {}
        }

        Timer::after(poll_interval).await;
    }
}
