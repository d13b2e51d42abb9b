use std::path::PathBuf;

use cocktail_types::{CocktailError, CocktailResult};
use serde::{Deserialize, Serialize};

use super::api::ApiConfig;
use super::logging::LoggingConfig;
use super::system::SystemConfig;

/// Top-level configuration for one daemon instance: where it persists its
/// state, the cell's physical constants, its HTTP surface, and whether it
/// should drive real hardware or a simulator.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub data_dir: PathBuf,
    pub robot_address: String,
    pub pump_serial_port: String,
    pub fake_system: bool,
    pub system: SystemConfig,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            robot_address: "127.0.0.1:10000".to_string(),
            pump_serial_port: "/dev/ttyUSB0".to_string(),
            fake_system: false,
            system: SystemConfig::default(),
            api: ApiConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl DaemonConfig {
    pub fn load(path: &std::path::Path) -> CocktailResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| CocktailError::Config(format!("failed to read {path:?}: {e}")))?;
        toml::from_str(&text).map_err(|e| CocktailError::Config(format!("failed to parse {path:?}: {e}")))
    }

    pub fn save(&self, path: &std::path::Path) -> CocktailResult<()> {
        let text = toml::to_string_pretty(self).map_err(|e| CocktailError::Config(e.to_string()))?;
        std::fs::write(path, text).map_err(|e| CocktailError::Config(format!("failed to write {path:?}: {e}")))
    }

    pub fn validate(&self) -> CocktailResult<()> {
        if self.system.ml_per_zapf <= 0.0 {
            return Err(CocktailError::Config("ml_per_zapf must be positive".to_string()));
        }
        if self.system.ml_per_second <= 0.0 {
            return Err(CocktailError::Config("ml_per_second must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(DaemonConfig::default().validate().is_ok());
    }

    #[test]
    fn serializes_round_trip() {
        let config = DaemonConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: DaemonConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.robot_address, config.robot_address);
    }
}
