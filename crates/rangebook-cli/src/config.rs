//! Application configuration.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use rangebook_core::TokenDecimals;
use rangebook_fee::FeeConfig;
use rangebook_sdk::StaticDecimals;
use rangebook_strategy::StrategyConfig;

use crate::error::{AppError, AppResult};

/// Top-level configuration file.
///
/// ```toml
/// [strategy]
/// default_spread_percentage = "0.05"
///
/// [fee]
/// trading_fee_ppm = 2000
///
/// [tokens]
/// "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2" = 18
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub strategy: StrategyConfig,

    #[serde(default)]
    pub fee: FeeConfig,

    /// Token address → decimals.
    #[serde(default)]
    pub tokens: BTreeMap<String, TokenDecimals>,
}

impl AppConfig {
    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Like [`from_file`](Self::from_file), but a missing file yields the
    /// defaults. A file that exists and fails to parse is still an error.
    pub fn load(path: &str) -> AppResult<Self> {
        if !Path::new(path).exists() {
            warn!(path, "Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// Decimals resolver backed by the `[tokens]` table.
    pub fn resolver(&self) -> StaticDecimals {
        self.tokens
            .iter()
            .map(|(token, decimals)| (token.as_str(), *decimals))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.fee.trading_fee_ppm, 2_000);
        assert_eq!(config.strategy.default_spread_percentage, dec!(0.05));
        assert!(config.tokens.is_empty());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let toml_str = r#"
[fee]
trading_fee_ppm = 500

[tokens]
"0xWETH" = 18
"0xusdc" = 6
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.fee.trading_fee_ppm, 500);
        assert_eq!(config.strategy.max_spread_percentage, dec!(99));
        assert_eq!(config.tokens.len(), 2);
        assert_eq!(config.resolver().len(), 2);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = AppConfig::load("/nonexistent/rangebook.toml").unwrap();
        assert!(config.tokens.is_empty());
        assert!(AppConfig::from_file("/nonexistent/rangebook.toml").is_err());
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let path =
            std::env::temp_dir().join(format!("rangebook-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "[fee]\ntrading_fee_ppm = \"lots\"\n").unwrap();

        let result = AppConfig::load(path.to_str().unwrap());
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_bundled_default_config_parses() {
        let content = include_str!("../../../config/default.toml");
        let config: AppConfig = toml::from_str(content).unwrap();
        assert!(!config.tokens.is_empty());
    }
}
