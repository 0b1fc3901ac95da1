use std::fs;
use std::path::Path;

use crate::shared::errors::AppError;
use crate::shared::types::AppConfig;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with the usual lookup order: an explicit path when
    /// given, `Config.toml` in the working directory when present, built-in
    /// defaults otherwise. An explicit path that fails to load is fatal.
    pub fn load(path: Option<&str>) -> Result<AppConfig, AppError> {
        match path {
            Some(p) => Self::from_file(p),
            None if Path::new("Config.toml").exists() => Self::from_file("Config.toml"),
            None => Ok(AppConfig::default()),
        }
    }

    fn from_file(path: &str) -> Result<AppConfig, AppError> {
        let config_content = fs::read_to_string(path)
            .map_err(|e| AppError::ConfigError(format!("Failed to read config file {}: {}", path, e)))?;

        let config: AppConfig = toml::from_str(&config_content)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse config file {}: {}", path, e)))?;

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            database_path = "test.db"

            [thresholds]
            min_discount_percent = 60.0
            "#,
        )
        .unwrap();

        assert_eq!(config.database_path, "test.db");
        assert_eq!(config.thresholds.min_discount_percent, 60.0);
        assert_eq!(config.thresholds.price_tolerance_percent, 5.0);
        assert_eq!(config.check_interval_hours, 6);
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let mut config = AppConfig::default();
        config.thresholds.min_discount_percent = 140.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.max_concurrent_entries = 0;
        assert!(config.validate().is_err());
    }
}
