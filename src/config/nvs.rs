//! NVS persistence for the power configuration, with schema versioning.
//!
//! Each `set-config` key is stored as its own `u32` entry (`cfg_<key>`), so
//! a value written by an older firmware stays readable after keys are
//! appended to the table.
//!
//! # Version History
//!
//! - **v1** (current): keys 1..=26

use core::cmp::Ordering;
use core::fmt::Write;

use thiserror::Error;

use super::{ConfigError, PowerConfig, CONFIG_KEY_MAX};

#[cfg(target_os = "espidf")]
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};
#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::EspError;

#[cfg(target_os = "espidf")]
use crate::hal::{ConfigSink, HalError};

/// Current NVS schema version
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// NVS namespace for the power configuration
pub const NVS_NAMESPACE: &str = "strompi_cfg";

/// NVS key for schema version
#[cfg(target_os = "espidf")]
const VERSION_KEY: &str = "schema_ver";

/// Number of persisted keys (the action key 0 is not stored)
pub const PERSISTED_KEYS: usize = CONFIG_KEY_MAX as usize;

/// Load result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadResult {
    /// Nothing stored yet, defaults kept
    FreshInstall,
    /// Schema up-to-date, loaded successfully
    UpToDate,
}

/// NVS operation errors
#[derive(Debug, Error)]
pub enum NvsError {
    /// NVS initialization failed
    #[cfg(target_os = "espidf")]
    #[error("nvs init failed: {0:?}")]
    InitFailed(EspError),
    /// NVS read/write error
    #[cfg(target_os = "espidf")]
    #[error("nvs i/o failed: {0:?}")]
    IoError(EspError),
    /// Schema version too new (downgrade not supported)
    #[error("stored schema v{stored_version} is newer than this firmware")]
    TooNew { stored_version: u32 },
    /// A stored value no longer passes validation
    #[error("stored value rejected: {0}")]
    Corrupt(ConfigError),
}

#[cfg(target_os = "espidf")]
impl From<EspError> for NvsError {
    fn from(e: EspError) -> Self {
        NvsError::IoError(e)
    }
}

/// Decide what to do with the stored schema version (0 = nothing stored).
pub fn check_version(stored_version: u32) -> Result<LoadResult, NvsError> {
    match stored_version.cmp(&CURRENT_SCHEMA_VERSION) {
        Ordering::Equal => Ok(LoadResult::UpToDate),
        Ordering::Less => Ok(LoadResult::FreshInstall),
        Ordering::Greater => Err(NvsError::TooNew { stored_version }),
    }
}

/// Flatten the configuration into `set-config` values, index `i` = key `i + 1`.
pub fn encode(config: &PowerConfig) -> [u32; PERSISTED_KEYS] {
    let b = |v: bool| u32::from(v);
    [
        u32::from(config.mode.number()),
        config.alarm_mode as u32,
        b(config.poweroff_alarm_enabled),
        u32::from(config.alarm_minute),
        u32::from(config.alarm_hour),
        u32::from(config.poweroff_minute),
        u32::from(config.poweroff_hour),
        u32::from(config.alarm_day),
        u32::from(config.alarm_month),
        u32::from(config.alarm_weekday),
        b(config.alarm_enabled),
        b(config.shutdown_enabled),
        u32::from(config.shutdown_seconds),
        b(config.warning_enabled),
        b(config.serial_less_mode),
        config.battery_shutdown_level as u32,
        b(config.interval_alarm_enabled),
        u32::from(config.interval_on_minutes),
        u32::from(config.interval_off_minutes),
        b(config.power_button_enabled),
        u32::from(config.power_button_seconds),
        b(config.wakeup_time_enabled),
        u32::from(config.wakeup_minutes),
        b(config.poweroff_mode_enabled),
        b(config.powersave_enabled),
        b(config.weekend_wakeup_enabled),
    ]
}

/// Rebuild a configuration from stored values. Missing entries keep defaults.
pub fn decode(values: &[Option<u32>; PERSISTED_KEYS]) -> Result<PowerConfig, NvsError> {
    let mut config = PowerConfig::default();
    for (i, value) in values.iter().enumerate() {
        if let Some(v) = value {
            config.apply(i as u32 + 1, *v).map_err(NvsError::Corrupt)?;
        }
    }
    Ok(config)
}

/// NVS entry name for a key
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
fn entry_name(key: usize) -> heapless::String<16> {
    let mut name = heapless::String::new();
    let _ = write!(name, "cfg_{}", key);
    name
}

/// Opened configuration namespace.
#[cfg(target_os = "espidf")]
pub struct ConfigStore {
    storage: EspNvs<NvsDefault>,
}

#[cfg(target_os = "espidf")]
impl ConfigStore {
    /// Open the namespace on the default partition
    pub fn open(partition: EspDefaultNvsPartition) -> Result<Self, NvsError> {
        let storage = EspNvs::new(partition, NVS_NAMESPACE, true).map_err(NvsError::InitFailed)?;
        Ok(Self { storage })
    }

    /// Load into `config`, leaving it untouched on a fresh install.
    pub fn load(&self, config: &mut PowerConfig) -> Result<LoadResult, NvsError> {
        let stored_version = self.storage.get_u32(VERSION_KEY)?.unwrap_or(0);
        let result = check_version(stored_version)?;
        if result == LoadResult::FreshInstall {
            return Ok(result);
        }

        let mut values = [None; PERSISTED_KEYS];
        for (i, slot) in values.iter_mut().enumerate() {
            *slot = self.storage.get_u32(&entry_name(i + 1))?;
        }
        *config = decode(&values)?;
        Ok(result)
    }

    /// Save with version stamp
    pub fn save(&mut self, config: &PowerConfig) -> Result<(), NvsError> {
        // Write version first
        self.storage.set_u32(VERSION_KEY, CURRENT_SCHEMA_VERSION)?;

        for (i, value) in encode(config).iter().enumerate() {
            self.storage.set_u32(&entry_name(i + 1), *value)?;
        }
        Ok(())
    }
}

#[cfg(target_os = "espidf")]
impl ConfigSink for ConfigStore {
    fn save(&mut self, config: &PowerConfig) -> Result<(), HalError> {
        ConfigStore::save(self, config).map_err(|e| {
            log::error!("[nvs] config save failed: {}", e);
            HalError::Flash
        })
    }
}
