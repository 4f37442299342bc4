//! Strategy construction configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use rangebook_core::{EngineError, EngineResult};

/// Defaults applied when a caller leaves construction parameters out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Spread (percent of the outer range) for overlapping strategies.
    #[serde(default = "default_spread_percentage")]
    pub default_spread_percentage: Decimal,

    /// Upper bound accepted for a requested spread, in percent.
    /// Anything at or above 100 leaves no buy range.
    #[serde(default = "default_max_spread_percentage")]
    pub max_spread_percentage: Decimal,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            default_spread_percentage: default_spread_percentage(),
            max_spread_percentage: default_max_spread_percentage(),
        }
    }
}

impl StrategyConfig {
    /// Pick the requested spread or the default, bounded by the maximum.
    pub fn resolve_spread(&self, requested: Option<Decimal>) -> EngineResult<Decimal> {
        let spread = requested.unwrap_or(self.default_spread_percentage);
        if spread > self.max_spread_percentage {
            return Err(EngineError::InvalidSpread(format!(
                "{spread}% exceeds configured maximum {}%",
                self.max_spread_percentage
            )));
        }
        Ok(spread)
    }
}

fn default_spread_percentage() -> Decimal {
    Decimal::new(5, 2) // 0.05%
}
fn default_max_spread_percentage() -> Decimal {
    Decimal::new(99, 0) // 99%
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config() {
        let config = StrategyConfig::default();
        assert_eq!(config.default_spread_percentage, dec!(0.05));
        assert_eq!(config.max_spread_percentage, dec!(99));
    }

    #[test]
    fn test_config_serde_defaults() {
        let toml_str = r#"
default_spread_percentage = "0.5"
"#;
        let config: StrategyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.default_spread_percentage, dec!(0.5));
        assert_eq!(config.max_spread_percentage, dec!(99));
    }

    #[test]
    fn test_resolve_spread() {
        let config = StrategyConfig::default();
        assert_eq!(config.resolve_spread(None).unwrap(), dec!(0.05));
        assert_eq!(config.resolve_spread(Some(dec!(2))).unwrap(), dec!(2));
        assert!(matches!(
            config.resolve_spread(Some(dec!(99.5))),
            Err(EngineError::InvalidSpread(_))
        ));
    }
}
