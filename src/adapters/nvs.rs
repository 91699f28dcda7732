//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`ConfigPort`] for the alarm thresholds.
//!
//! - The blob is `ThresholdConfig::to_blob` output: a magic byte then the
//!   postcard payload.  Decoding re-validates the ordering rules, so an
//!   inverted or truncated blob comes back as `Corrupted`, never as data.
//! - Atomic writes: ESP-IDF NVS commits are atomic per `nvs_commit()`.
//! - Host builds keep the blob in memory.

use log::{info, warn};

use crate::app::ports::ConfigPort;
use crate::config::{BLOB_LEN, ThresholdConfig};
use crate::error::ConfigError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
const NAMESPACE: &core::ffi::CStr = c"depotwatch";
#[cfg(target_os = "espidf")]
const THRESHOLD_KEY: &core::ffi::CStr = c"thresholds";

pub struct ThresholdStore {
    #[cfg(not(target_os = "espidf"))]
    blob: Option<heapless::Vec<u8, BLOB_LEN>>,
}

impl ThresholdStore {
    /// Initialise NVS flash.
    ///
    /// On a full partition or a version mismatch the partition is erased
    /// and re-initialised, which loses the stored thresholds.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called once from the main task before any NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as esp_err_t
                || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as esp_err_t
            {
                warn!("NVS: erasing and re-initialising flash partition");
                esp!(unsafe { nvs_flash_erase() }).map_err(|_| ConfigError::Storage)?;
                esp!(unsafe { nvs_flash_init() }).map_err(|_| ConfigError::Storage)?;
            } else {
                esp!(ret).map_err(|_| ConfigError::Storage)?;
            }
            info!("ThresholdStore: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("ThresholdStore: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            blob: None,
        })
    }

    /// Seed the simulated flash with raw bytes.
    #[cfg(not(target_os = "espidf"))]
    pub fn with_raw(bytes: &[u8]) -> Self {
        Self {
            blob: heapless::Vec::from_slice(bytes).ok(),
        }
    }

    /// Open the namespace, run `f` with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_handle<T>(
        write: bool,
        f: impl FnOnce(nvs_handle_t) -> Result<T, EspError>,
    ) -> Result<T, EspError> {
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };
        let mut handle: nvs_handle_t = 0;
        esp!(unsafe { nvs_open(NAMESPACE.as_ptr(), mode, &mut handle) })?;
        let result = f(handle);
        unsafe { nvs_close(handle) };
        result
    }
}

impl ConfigPort for ThresholdStore {
    fn load(&self) -> Result<ThresholdConfig, ConfigError> {
        #[cfg(not(target_os = "espidf"))]
        let config = match &self.blob {
            Some(bytes) => ThresholdConfig::from_blob(bytes),
            None => Err(ConfigError::NotFound),
        };

        #[cfg(target_os = "espidf")]
        let config = {
            let mut buf = [0u8; BLOB_LEN];
            let read = Self::with_handle(false, |handle| {
                let mut size = BLOB_LEN;
                esp!(unsafe {
                    nvs_get_blob(handle, THRESHOLD_KEY.as_ptr(), buf.as_mut_ptr().cast(), &mut size)
                })?;
                Ok(size)
            });
            match read {
                Ok(size) => ThresholdConfig::from_blob(&buf[..size]),
                Err(e) if e.code() == ESP_ERR_NVS_NOT_FOUND as esp_err_t => Err(ConfigError::NotFound),
                Err(e) if e.code() == ESP_ERR_NVS_INVALID_LENGTH as esp_err_t => {
                    Err(ConfigError::Corrupted)
                }
                Err(e) => {
                    warn!("ThresholdStore: NVS read error {e}");
                    Err(ConfigError::Storage)
                }
            }
        };

        if let Ok(c) = &config {
            info!("ThresholdStore: loaded {c:?}");
        }
        config
    }

    fn save(&mut self, config: &ThresholdConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let mut buf = [0u8; BLOB_LEN];
        let len = config.to_blob(&mut buf)?;

        #[cfg(not(target_os = "espidf"))]
        {
            self.blob = heapless::Vec::from_slice(&buf[..len]).ok();
            info!("ThresholdStore: saved (simulation)");
        }

        #[cfg(target_os = "espidf")]
        {
            Self::with_handle(true, |handle| {
                esp!(unsafe { nvs_set_blob(handle, THRESHOLD_KEY.as_ptr(), buf.as_ptr().cast(), len) })?;
                esp!(unsafe { nvs_commit(handle) })
            })
            .map_err(|e| {
                warn!("ThresholdStore: NVS write error {e}");
                ConfigError::Storage
            })?;
            info!("ThresholdStore: saved {len} bytes");
        }

        Ok(())
    }
}
