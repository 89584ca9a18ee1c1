use serde::{Deserialize, Serialize};

use crate::curve::CurveConfig;
use crate::difficulty::DifficultyConfig;
use crate::error::Result;
use crate::scoring::ScoringConfig;

/// Tunables for the whole engine. Every section is optional in TOML; missing
/// keys keep their defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub curve: CurveConfig,
    pub difficulty: DifficultyConfig,
    pub scoring: ScoringConfig,
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.curve.validate()?;
        self.difficulty.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::Increment;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = EngineConfig::from_toml_str(
            r#"
            [difficulty]
            dwell = 2
            fast_response_ms = 5000

            [scoring]
            daily_bonus = 75
            "#,
        )
        .unwrap();
        assert_eq!(config.difficulty.dwell, 2);
        assert_eq!(config.difficulty.fast_response_ms, 5000);
        assert_eq!(config.difficulty.window_size, 10);
        assert_eq!(config.scoring.daily_bonus, 75);
        assert_eq!(config.curve, CurveConfig::default());
    }

    #[test]
    fn test_custom_curve() {
        let config = EngineConfig::from_toml_str(
            r#"
            [curve]
            max_level = 30

            [[curve.regimes]]
            start = 1
            end = 10
            increment = { kind = "constant", xp = 50 }

            [[curve.regimes]]
            start = 11
            end = 30
            increment = { kind = "geometric", base = 100, ratio = 1.1 }
            "#,
        )
        .unwrap();
        assert_eq!(config.curve.max_level, 30);
        assert_eq!(config.curve.regimes[0].increment, Increment::Constant { xp: 50 });
    }

    #[test]
    fn test_invalid_curve_rejected() {
        let err = EngineConfig::from_toml_str(
            r#"
            [curve]
            max_level = 30

            [[curve.regimes]]
            start = 1
            end = 10
            increment = { kind = "constant", xp = 50 }
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid config"));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(EngineConfig::from_toml_str("[difficulty\n").is_err());
    }
}
