//! HomeGuard Firmware — Main Entry Point
//!
//! Event-driven alarm controller with one task per responsibility:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                       edge-executor                            │
//! │                                                                │
//! │  motion ──┐                        ┌──▶ SharedDisplay (mutex)  │
//! │  keypad ──┼─▶ EVENT_CHANNEL ─▶ alarm ──▶ telemetry log         │
//! │  remote ──┘        (16)         │  └──▶ state snapshot         │
//! │                                 ▼            │        │        │
//! │                            tick (100 ms)  speaker  indicator   │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `main` owns bootstrap only: peripherals, NVS, driver construction,
//! task spawn. Everything stateful lives in the tasks.
#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
pub mod app;
pub mod config;
pub mod events;
pub mod fsm;
pub mod pin_entry;
pub mod state;

mod error;
mod pins;

pub mod adapters;
pub mod drivers;
pub mod esp_link_shims;
pub mod sensors;
pub mod tasks;

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{info, warn};

use adapters::nvs::NvsAdapter;
use adapters::remote::RemoteLink;
use adapters::time::MonotonicClock;
use app::ports::ConfigPort;
use app::service::AlarmService;
use config::SystemConfig;
use drivers::keypad::KeypadDriver;
use drivers::lcd::{Lcd, SharedDisplay};
use drivers::speaker::SpeakerDriver;
use drivers::status_led::IndicatorLeds;
use drivers::ultrasonic::UltrasonicDriver;
use drivers::watchdog::Watchdog;
use pin_entry::PinCredential;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("HomeGuard v{} starting", env!("CARGO_PKG_VERSION"));

    // ── 2. Hardware peripherals ───────────────────────────────
    if let Err(e) = drivers::hw_init::init_peripherals() {
        // Peripheral init failure is critical — log and halt.
        // In production this triggers the watchdog reset after timeout.
        log::error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }
    let watchdog = Watchdog::new();

    // ── 3. Load config + credential from NVS (or defaults) ───
    let (config, pin) = match NvsAdapter::new() {
        Ok(mut nvs) => {
            let config = match nvs.load() {
                Ok(cfg) => {
                    info!("config loaded from NVS");
                    cfg
                }
                Err(e) => {
                    warn!("NVS config load failed ({e}), using defaults");
                    SystemConfig::default()
                }
            };
            let pin = nvs.load_pin_or_default();
            (config, pin)
        }
        Err(e) => {
            // Continue without persistence — the alarm function matters
            // more than remembering settings. NVS should self-heal on the
            // next reboot.
            warn!("NVS init failed ({e}), running with defaults and no persistence");
            (SystemConfig::default(), PinCredential::default())
        }
    };

    // ── 4. Construct shared resources and drivers ─────────────
    let mut lcd = Lcd::new();
    lcd.init();
    let display = SharedDisplay::new(lcd);
    let clock = MonotonicClock::new();

    let service = AlarmService::new(config.clone());

    // ── 5. Spawn the task set ─────────────────────────────────
    let executor: edge_executor::LocalExecutor<'_, 8> = edge_executor::LocalExecutor::new();

    executor
        .spawn(tasks::alarm::alarm_task(
            service,
            &display,
            &clock,
            watchdog,
            config.event_receive_timeout_ms,
            config.telemetry_interval_secs,
        ))
        .detach();
    executor
        .spawn(tasks::motion::motion_task(
            UltrasonicDriver::new(),
            config.clone(),
        ))
        .detach();
    executor
        .spawn(tasks::keypad::keypad_task(
            KeypadDriver::new(),
            pin,
            &display,
            config.keypad_scan_interval_ms,
        ))
        .detach();
    executor
        .spawn(tasks::remote::remote_task(
            RemoteLink::new(),
            config.remote_poll_interval_ms,
        ))
        .detach();
    executor
        .spawn(tasks::speaker::speaker_task(SpeakerDriver::new(), &clock))
        .detach();
    executor
        .spawn(tasks::indicator::indicator_task(IndicatorLeds::new(), &clock))
        .detach();

    info!("all tasks spawned, system ready");

    // Drive the executor forever; no task ever completes.
    futures_lite::future::block_on(executor.run(core::future::pending::<()>()));

    Ok(())
}
