use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::{
    alerts::AlertPolicy,
    auth::{AuthorizationGate, SharedSecret},
    core::utils::{app_data_dir, config_file_in, ensure_dir, records_dir_in, write_atomic},
    errors::{LedgerError, LedgerResult},
    ledger::{DEFAULT_DUE_SOON_DAYS, DEFAULT_LOW_STOCK_THRESHOLD},
    storage::OwnerId,
};

const DEFAULT_REMINDER_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub owner: OwnerId,
    pub low_stock_threshold: i64,
    pub due_soon_days: f64,
    pub reminder_interval_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_pin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            owner: OwnerId::default(),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            due_soon_days: DEFAULT_DUE_SOON_DAYS,
            reminder_interval_secs: DEFAULT_REMINDER_INTERVAL_SECS,
            access_pin: None,
            data_dir: None,
        }
    }
}

impl EngineConfig {
    pub fn alert_policy(&self) -> AlertPolicy {
        AlertPolicy {
            low_stock_threshold: self.low_stock_threshold,
            due_soon_days: self.due_soon_days,
        }
    }

    /// A gate keyed on the configured PIN, or a locked gate if none is set.
    pub fn gate(&self) -> AuthorizationGate {
        match self.access_pin.as_deref() {
            Some(pin) if !pin.is_empty() => AuthorizationGate::new(SharedSecret::new(pin)),
            _ => AuthorizationGate::locked(),
        }
    }

    pub fn reminder_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.reminder_interval_secs)
    }

    fn validate(&self) -> LedgerResult<()> {
        if self.low_stock_threshold < 0 {
            return Err(LedgerError::Config(format!(
                "low_stock_threshold must not be negative, got {}",
                self.low_stock_threshold
            )));
        }
        if !self.due_soon_days.is_finite() || self.due_soon_days < 0.0 {
            return Err(LedgerError::Config(format!(
                "due_soon_days must be a non-negative number, got {}",
                self.due_soon_days
            )));
        }
        if self.reminder_interval_secs == 0 {
            return Err(LedgerError::Config(
                "reminder_interval_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> LedgerResult<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> LedgerResult<Self> {
        ensure_dir(&base)?;
        Ok(Self {
            path: config_file_in(&base),
            base,
        })
    }

    /// Reads the config file, falling back to defaults when it does not exist yet.
    pub fn load(&self) -> LedgerResult<EngineConfig> {
        let config = if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data)?
        } else {
            debug!(path = %self.path.display(), "no config file, using defaults");
            EngineConfig::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &EngineConfig) -> LedgerResult<()> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)?;
        Ok(())
    }

    /// Where the JSON store should keep records for this config.
    pub fn records_dir(&self, config: &EngineConfig) -> PathBuf {
        config
            .data_dir
            .clone()
            .unwrap_or_else(|| records_dir_in(&self.base))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.alert_policy(), AlertPolicy::default());
        assert!(!config.gate().has_secret());
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = EngineConfig {
            owner: OwnerId::new("kiosk-7"),
            low_stock_threshold: 2,
            access_pin: Some("4321".into()),
            ..EngineConfig::default()
        };
        manager.save(&config).unwrap();
        assert!(manager.path().exists());

        let loaded = manager.load().unwrap();
        assert_eq!(loaded, config);
        assert!(loaded.gate().verify("4321"));
        assert_eq!(loaded.alert_policy().low_stock_threshold, 2);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        write_atomic(manager.path(), r#"{ "owner": "corner-shop" }"#).unwrap();
        let loaded = manager.load().unwrap();
        assert_eq!(loaded.owner, OwnerId::new("corner-shop"));
        assert_eq!(loaded.reminder_interval_secs, DEFAULT_REMINDER_INTERVAL_SECS);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = EngineConfig {
            reminder_interval_secs: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(manager.save(&config), Err(LedgerError::Config(_))));
    }

    #[test]
    fn records_dir_prefers_explicit_data_dir() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut config = EngineConfig::default();
        assert_eq!(manager.records_dir(&config), dir.path().join("records"));
        config.data_dir = Some(dir.path().join("elsewhere"));
        assert_eq!(manager.records_dir(&config), dir.path().join("elsewhere"));
    }
}
