//! Protocol settings loaded from TOML
//!
//! Every field has a default, so a partial file (or none at all) works.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::control::Pacing;
use crate::error::ConfigError;
use crate::protocol::{control, timing};
use crate::report::transaction;

/// Per-device protocol parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Transaction id stamped on requests built by a session
    pub transaction_id: u8,
    /// wIndex for request writes
    pub request_index: u16,
    /// wIndex for response reads
    pub response_index: u16,
    /// Lower pacing bound (µs)
    pub wait_min_us: u64,
    /// Upper pacing bound (µs)
    pub wait_max_us: u64,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            transaction_id: transaction::FALLBACK,
            request_index: control::DEFAULT_INDEX,
            response_index: control::DEFAULT_INDEX,
            wait_min_us: timing::WAIT_MIN_US,
            wait_max_us: timing::WAIT_MAX_US,
        }
    }
}

impl ProtocolConfig {
    /// Default config location
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("razer_driver")
            .join("protocol.toml")
    }

    /// Load config from a file, or return defaults if it doesn't exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config, creating the parent directory if needed
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Parse and validate
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ProtocolConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transaction_id == 0 {
            return Err(ConfigError::Invalid(
                "transaction_id 0x00 is never valid on the wire".into(),
            ));
        }
        if self.wait_min_us > self.wait_max_us {
            return Err(ConfigError::Invalid(format!(
                "wait_min_us ({}) is greater than wait_max_us ({})",
                self.wait_min_us, self.wait_max_us
            )));
        }
        Ok(())
    }

    pub fn pacing(&self) -> Pacing {
        Pacing::from_micros(self.wait_min_us, self.wait_max_us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let config = ProtocolConfig::default();
        assert_eq!(config.transaction_id, 0xFF);
        assert_eq!(config.request_index, 0x02);
        assert_eq!(config.response_index, 0x02);
        assert_eq!(config.pacing(), Pacing::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = ProtocolConfig::from_toml_str("transaction_id = 0x3F\nresponse_index = 3\n")
            .unwrap();
        assert_eq!(config.transaction_id, 0x3F);
        assert_eq!(config.response_index, 3);
        assert_eq!(config.request_index, 0x02);
        assert_eq!(config.wait_max_us, 800);
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(
            ProtocolConfig::from_toml_str("").unwrap(),
            ProtocolConfig::default()
        );
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ProtocolConfig {
            transaction_id: 0x1F,
            request_index: 0x00,
            response_index: 0x01,
            wait_min_us: 1000,
            wait_max_us: 1500,
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(ProtocolConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_zero_transaction_id_rejected() {
        let err = ProtocolConfig::from_toml_str("transaction_id = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_inverted_wait_rejected() {
        let err =
            ProtocolConfig::from_toml_str("wait_min_us = 900\nwait_max_us = 100").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let err = ProtocolConfig::from_toml_str("transaction_id = \"abc\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_pacing_bounds() {
        let config = ProtocolConfig {
            wait_min_us: 100,
            wait_max_us: 250,
            ..Default::default()
        };
        let pacing = config.pacing();
        assert_eq!(pacing.min, Duration::from_micros(100));
        assert_eq!(pacing.max, Duration::from_micros(250));
    }

    #[test]
    fn test_default_path_ignores_empty_xdg_dir() {
        std::env::set_var("XDG_CONFIG_HOME", "");
        let path = ProtocolConfig::default_path();
        assert!(path.ends_with("razer_driver/protocol.toml"));
        if let Some(dir) = dirs::config_dir() {
            assert!(path.is_absolute());
            assert_eq!(path, dir.join("razer_driver").join("protocol.toml"));
        }
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = std::env::temp_dir().join("razer_driver_missing_config_test.toml");
        let _ = std::fs::remove_file(&path);
        assert_eq!(
            ProtocolConfig::load(&path).unwrap(),
            ProtocolConfig::default()
        );
    }

    #[test]
    fn test_save_then_load() {
        let dir = std::env::temp_dir().join(format!("razer_driver_cfg_{}", std::process::id()));
        let path = dir.join("protocol.toml");
        let config = ProtocolConfig {
            request_index: 0x03,
            ..Default::default()
        };

        config.save(&path).unwrap();
        assert_eq!(ProtocolConfig::load(&path).unwrap(), config);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
