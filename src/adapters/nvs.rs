//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`ConfigPort`] and [`PinStorePort`] for the HomeGuard
//! controller. The system configuration is stored as a postcard blob and
//! range-validated before every save; the disarm PIN lives in its own
//! namespace as raw digits.
//!
//! Storage failures are never fatal: the boot path falls back to compiled
//! defaults (and, for the PIN, persists the default so the next boot finds
//! it — first-boot provisioning, same as losing the blob to corruption).

use log::{info, warn};

use crate::app::ports::{ConfigPort, PinStorePort, StorageError};
use crate::config::SystemConfig;
use crate::pin_entry::{PIN_LEN, PinCredential};

#[cfg(not(target_os = "espidf"))]
use std::cell::RefCell;
#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const CONFIG_NAMESPACE: &str = "homeguard";
const CONFIG_KEY: &str = "syscfg";

const PIN_NAMESPACE: &str = "alarm";
const PIN_KEY: &str = "pin";

/// Upper bound for the config blob; generous for the struct's size.
const MAX_BLOB_SIZE: usize = 256;

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Create the adapter and initialise NVS flash.
    ///
    /// On first boot or after a partition-layout change the NVS partition
    /// is erased and re-initialised automatically.
    pub fn new() -> Result<Self, StorageError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(StorageError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(StorageError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(StorageError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: RefCell::new(HashMap::new()),
        })
    }

    /// Load the stored PIN, falling back to (and persisting) the default
    /// when nothing usable is stored. Never fails the boot.
    pub fn load_pin_or_default(&mut self) -> PinCredential {
        match self.load_pin() {
            Ok(pin) => pin,
            Err(StorageError::NotFound) => {
                warn!("PIN not found in NVS, writing default");
                let pin = PinCredential::default();
                if let Err(e) = self.save_pin(&pin) {
                    warn!("failed to persist default PIN: {e}");
                }
                pin
            }
            Err(e) => {
                warn!("PIN load failed ({e}), using default without persisting");
                PinCredential::default()
            }
        }
    }

    // ── Raw blob access ───────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn read_blob(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        Self::with_handle(namespace, false, |handle| {
            let ckey = Self::cstr(key);
            let mut len = buf.len();
            // SAFETY: handle is open; buf/len describe a valid buffer.
            let ret =
                unsafe { nvs_get_blob(handle, ckey.as_ptr().cast(), buf.as_mut_ptr().cast(), &mut len) };
            match ret {
                x if x == ESP_OK => Ok(len),
                x if x == ESP_ERR_NVS_NOT_FOUND => Err(StorageError::NotFound),
                _ => Err(StorageError::IoError),
            }
        })
    }

    #[cfg(target_os = "espidf")]
    fn write_blob(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        Self::with_handle(namespace, true, |handle| {
            let ckey = Self::cstr(key);
            // SAFETY: handle is open read-write; data/len describe a valid buffer.
            let ret =
                unsafe { nvs_set_blob(handle, ckey.as_ptr().cast(), data.as_ptr().cast(), data.len()) };
            if ret != ESP_OK {
                return Err(StorageError::IoError);
            }
            if unsafe { nvs_commit(handle) } != ESP_OK {
                return Err(StorageError::IoError);
            }
            Ok(())
        })
    }

    /// Open an NVS namespace, run `f` with the handle, then close it.
    #[cfg(target_os = "espidf")]
    fn with_handle<T>(
        namespace: &str,
        write: bool,
        f: impl FnOnce(nvs_handle_t) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let cns = Self::cstr(namespace);
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let mut handle: nvs_handle_t = 0;
        // SAFETY: cns is a NUL-terminated buffer; handle receives the result.
        let ret = unsafe { nvs_open(cns.as_ptr().cast(), mode, &mut handle) };
        if ret == ESP_ERR_NVS_NOT_FOUND {
            // Namespace doesn't exist yet on a read-only open.
            return Err(StorageError::NotFound);
        }
        if ret != ESP_OK {
            return Err(StorageError::IoError);
        }

        let result = f(handle);
        // SAFETY: handle was opened above.
        unsafe {
            nvs_close(handle);
        }
        result
    }

    /// NUL-terminated copy of a short name (NVS limits these to 15 chars).
    #[cfg(target_os = "espidf")]
    fn cstr(name: &str) -> [u8; 16] {
        let mut buf = [0u8; 16];
        let len = name.len().min(15);
        buf[..len].copy_from_slice(&name.as_bytes()[..len]);
        buf
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_blob(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        match self.store.borrow().get(&format!("{namespace}::{key}")) {
            Some(v) => {
                let n = v.len().min(buf.len());
                buf[..n].copy_from_slice(&v[..n]);
                Ok(n)
            }
            None => Err(StorageError::NotFound),
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_blob(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.store
            .borrow_mut()
            .insert(format!("{namespace}::{key}"), data.to_vec());
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Config validation
// ───────────────────────────────────────────────────────────────

fn validate_config(cfg: &SystemConfig) -> Result<(), StorageError> {
    if !(1..=600).contains(&cfg.exit_delay_secs) {
        return Err(StorageError::ValidationFailed(
            "exit_delay_secs must be 1–600",
        ));
    }
    if cfg.distance_min_cm >= cfg.distance_max_cm {
        return Err(StorageError::ValidationFailed(
            "distance_min_cm must be < distance_max_cm",
        ));
    }
    if !(cfg.distance_min_cm..=cfg.distance_max_cm).contains(&cfg.motion_threshold_cm) {
        return Err(StorageError::ValidationFailed(
            "motion_threshold_cm must lie within the plausible distance band",
        ));
    }
    if cfg.distance_jump_cm == 0 {
        return Err(StorageError::ValidationFailed(
            "distance_jump_cm must be non-zero",
        ));
    }
    if cfg.burst_samples == 0 {
        return Err(StorageError::ValidationFailed(
            "burst_samples must be non-zero",
        ));
    }
    if !(10..1000).contains(&cfg.event_receive_timeout_ms) {
        return Err(StorageError::ValidationFailed(
            "event_receive_timeout_ms must be 10–999 to service the countdown",
        ));
    }
    if !(5..=3600).contains(&cfg.telemetry_interval_secs) {
        return Err(StorageError::ValidationFailed(
            "telemetry_interval_secs must be 5–3600",
        ));
    }
    Ok(())
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<SystemConfig, StorageError> {
        let mut buf = [0u8; MAX_BLOB_SIZE];
        let n = self.read_blob(CONFIG_NAMESPACE, CONFIG_KEY, &mut buf)?;
        let cfg: SystemConfig =
            postcard::from_bytes(&buf[..n]).map_err(|_| StorageError::Corrupted)?;
        validate_config(&cfg)?;
        Ok(cfg)
    }

    fn save(&mut self, config: &SystemConfig) -> Result<(), StorageError> {
        validate_config(config)?;
        let bytes = postcard::to_allocvec(config).map_err(|_| StorageError::IoError)?;
        self.write_blob(CONFIG_NAMESPACE, CONFIG_KEY, &bytes)
    }
}

impl PinStorePort for NvsAdapter {
    fn load_pin(&self) -> Result<PinCredential, StorageError> {
        let mut buf = [0u8; PIN_LEN];
        let n = self.read_blob(PIN_NAMESPACE, PIN_KEY, &mut buf)?;
        PinCredential::from_bytes(&buf[..n]).ok_or(StorageError::Corrupted)
    }

    fn save_pin(&mut self, pin: &PinCredential) -> Result<(), StorageError> {
        self.write_blob(PIN_NAMESPACE, PIN_KEY, pin.as_bytes())
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn config_roundtrips_through_storage() {
        let mut nvs = NvsAdapter::new().unwrap();
        assert!(matches!(nvs.load(), Err(StorageError::NotFound)));

        let mut cfg = SystemConfig::default();
        cfg.exit_delay_secs = 30;
        nvs.save(&cfg).unwrap();

        let loaded = nvs.load().unwrap();
        assert_eq!(loaded.exit_delay_secs, 30);
    }

    #[test]
    fn invalid_config_is_rejected_before_persisting() {
        let mut nvs = NvsAdapter::new().unwrap();
        let mut cfg = SystemConfig::default();
        cfg.exit_delay_secs = 0;
        assert!(matches!(
            nvs.save(&cfg),
            Err(StorageError::ValidationFailed(_))
        ));
        // Nothing was written.
        assert!(matches!(nvs.load(), Err(StorageError::NotFound)));
    }

    #[test]
    fn corrupted_config_blob_reports_corrupted() {
        let mut nvs = NvsAdapter::new().unwrap();
        nvs.write_blob(CONFIG_NAMESPACE, CONFIG_KEY, &[0xFF; 3]).unwrap();
        assert!(matches!(nvs.load(), Err(StorageError::Corrupted)));
    }

    #[test]
    fn first_boot_persists_the_default_pin() {
        let mut nvs = NvsAdapter::new().unwrap();
        assert_eq!(nvs.load_pin(), Err(StorageError::NotFound));

        let pin = nvs.load_pin_or_default();
        assert!(pin.matches(b"1234"));
        // The fallback write makes the default durable.
        assert_eq!(nvs.load_pin(), Ok(pin));
    }

    #[test]
    fn stored_pin_roundtrips() {
        let mut nvs = NvsAdapter::new().unwrap();
        let pin = PinCredential::from_bytes(b"8642").unwrap();
        nvs.save_pin(&pin).unwrap();
        assert_eq!(nvs.load_pin(), Ok(pin));
        assert!(nvs.load_pin_or_default().matches(b"8642"));
    }
}
