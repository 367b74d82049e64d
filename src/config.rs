use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{LpError, Result};

/// Version tag of the built-in scoring policy
pub const DEFAULT_SCORING_VERSION: &str = "lpc-2026.1";

/// Global lpcheck configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Scoring policy (weights, caps, gate table)
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// HTTP surface settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Settings for `lpcheck serve`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Listen address, e.g. "127.0.0.1:3000"
    #[serde(default = "default_addr")]
    pub addr: String,
}

fn default_addr() -> String {
    "127.0.0.1:3000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
        }
    }
}

/// Inclusive character-length band for title / meta description
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LengthBand {
    pub min: usize,
    pub max: usize,
}

impl LengthBand {
    pub fn contains(&self, len: usize) -> bool {
        len >= self.min && len <= self.max
    }
}

/// Weights of the conversion-path (BoFu) pillar
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BofuWeights {
    pub primary_cta: f64,
    pub multiple_ctas: f64,
    pub lead_path: f64,
    pub explicit_form: f64,
    pub explicit_contact: f64,
    pub pricing: f64,
}

impl Default for BofuWeights {
    fn default() -> Self {
        Self {
            primary_cta: 5.0,
            multiple_ctas: 1.0,
            lead_path: 4.0,
            explicit_form: 2.0,
            explicit_contact: 2.0,
            pricing: 3.0,
        }
    }
}

/// Weights of the proof (Convincing) pillar
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConvincingWeights {
    pub benefits: f64,
    pub trust: f64,
    pub objections: f64,
    pub visuals: f64,
    pub numeric_claims: f64,
    /// Number of numeric claims at which their contribution saturates
    pub numeric_claims_saturation: u32,
}

impl Default for ConvincingWeights {
    fn default() -> Self {
        Self {
            benefits: 3.0,
            trust: 4.0,
            objections: 3.0,
            visuals: 2.0,
            numeric_claims: 1.0,
            numeric_claims_saturation: 3,
        }
    }
}

/// Weights of the Structure / message-match pillar
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StructureWeights {
    pub h1: f64,
    pub title: f64,
    pub message_match: f64,
}

impl Default for StructureWeights {
    fn default() -> Self {
        Self {
            h1: 2.0,
            title: 1.0,
            message_match: 3.0,
        }
    }
}

/// Additive technical-hygiene score on a neutral baseline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TechnicalPoints {
    pub baseline: f64,
    pub https: f64,
    pub title: f64,
    pub meta: f64,
    pub h1: f64,
    pub viewport: f64,
    pub canonical: f64,
    pub alt_penalty: f64,
    /// Alt ratio below this (with at least one image) triggers the penalty
    pub alt_ratio_min: f64,
}

impl Default for TechnicalPoints {
    fn default() -> Self {
        Self {
            baseline: 40.0,
            https: 15.0,
            title: 12.0,
            meta: 10.0,
            h1: 10.0,
            viewport: 8.0,
            canonical: 5.0,
            alt_penalty: 8.0,
            alt_ratio_min: 0.8,
        }
    }
}

/// Coverage caps: ceilings applied when a required signal is absent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CoverageCaps {
    pub no_primary_cta: f64,
    pub no_lead_path: f64,
    pub no_pricing: f64,
    pub no_trust: f64,
    pub no_benefits: f64,
    pub no_objections: f64,
}

impl Default for CoverageCaps {
    fn default() -> Self {
        Self {
            no_primary_cta: 50.0,
            no_lead_path: 60.0,
            no_pricing: 70.0,
            no_trust: 60.0,
            no_benefits: 65.0,
            no_objections: 65.0,
        }
    }
}

/// Blend weights of the overall score
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OverallWeights {
    pub bofu: f64,
    pub convincing: f64,
    pub technical: f64,
    pub structure: f64,
}

impl OverallWeights {
    pub fn sum(&self) -> f64 {
        self.bofu + self.convincing + self.technical + self.structure
    }
}

impl Default for OverallWeights {
    fn default() -> Self {
        Self {
            bofu: 0.50,
            convincing: 0.35,
            technical: 0.15,
            structure: 0.0,
        }
    }
}

/// Overall ceiling by number of missing core pillars
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MissingPillarGate {
    pub missing1: f64,
    pub missing2: f64,
    pub missing3plus: f64,
}

impl MissingPillarGate {
    /// Ceiling for `missing` absent core pillars, if any
    pub fn ceiling(&self, missing: usize) -> Option<f64> {
        match missing {
            0 => None,
            1 => Some(self.missing1),
            2 => Some(self.missing2),
            _ => Some(self.missing3plus),
        }
    }
}

impl Default for MissingPillarGate {
    fn default() -> Self {
        Self {
            missing1: 79.0,
            missing2: 69.0,
            missing3plus: 49.0,
        }
    }
}

/// Bounds of the optional vote-based adjustment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeedbackPolicy {
    pub max_delta: f64,
    pub min_votes: u32,
}

impl Default for FeedbackPolicy {
    fn default() -> Self {
        Self {
            max_delta: 8.0,
            min_votes: 5,
        }
    }
}

/// The complete, versioned scoring policy
///
/// Every constant the engine uses lives here. A partial TOML file only
/// overrides the sections it names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    pub version: String,
    /// Minimum message-match score that counts as satisfied
    pub message_match_threshold: f64,
    pub title_band: LengthBand,
    pub meta_band: LengthBand,
    pub bofu_weights: BofuWeights,
    pub convincing_weights: ConvincingWeights,
    pub structure_weights: StructureWeights,
    pub technical: TechnicalPoints,
    pub caps: CoverageCaps,
    pub overall: OverallWeights,
    pub gate: MissingPillarGate,
    pub feedback: FeedbackPolicy,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_SCORING_VERSION.to_string(),
            message_match_threshold: 50.0,
            title_band: LengthBand { min: 30, max: 65 },
            meta_band: LengthBand { min: 50, max: 160 },
            bofu_weights: BofuWeights::default(),
            convincing_weights: ConvincingWeights::default(),
            structure_weights: StructureWeights::default(),
            technical: TechnicalPoints::default(),
            caps: CoverageCaps::default(),
            overall: OverallWeights::default(),
            gate: MissingPillarGate::default(),
            feedback: FeedbackPolicy::default(),
        }
    }
}

impl ScoringConfig {
    /// Reject policies the engine cannot score with sensibly
    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("bofu_weights.primary_cta", self.bofu_weights.primary_cta),
            ("bofu_weights.multiple_ctas", self.bofu_weights.multiple_ctas),
            ("bofu_weights.lead_path", self.bofu_weights.lead_path),
            ("bofu_weights.explicit_form", self.bofu_weights.explicit_form),
            ("bofu_weights.explicit_contact", self.bofu_weights.explicit_contact),
            ("bofu_weights.pricing", self.bofu_weights.pricing),
            ("convincing_weights.benefits", self.convincing_weights.benefits),
            ("convincing_weights.trust", self.convincing_weights.trust),
            ("convincing_weights.objections", self.convincing_weights.objections),
            ("convincing_weights.visuals", self.convincing_weights.visuals),
            ("convincing_weights.numeric_claims", self.convincing_weights.numeric_claims),
            ("structure_weights.h1", self.structure_weights.h1),
            ("structure_weights.title", self.structure_weights.title),
            ("structure_weights.message_match", self.structure_weights.message_match),
            ("overall.bofu", self.overall.bofu),
            ("overall.convincing", self.overall.convincing),
            ("overall.technical", self.overall.technical),
            ("overall.structure", self.overall.structure),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(LpError::ConfigError(format!(
                    "{} must be a non-negative number (got {})",
                    name, value
                )));
            }
        }

        if self.overall.sum() <= 0.0 {
            return Err(LpError::ConfigError(
                "overall weights must not all be zero".into(),
            ));
        }

        let ceilings = [
            ("caps.no_primary_cta", self.caps.no_primary_cta),
            ("caps.no_lead_path", self.caps.no_lead_path),
            ("caps.no_pricing", self.caps.no_pricing),
            ("caps.no_trust", self.caps.no_trust),
            ("caps.no_benefits", self.caps.no_benefits),
            ("caps.no_objections", self.caps.no_objections),
            ("gate.missing1", self.gate.missing1),
            ("gate.missing2", self.gate.missing2),
            ("gate.missing3plus", self.gate.missing3plus),
            ("message_match_threshold", self.message_match_threshold),
        ];
        for (name, value) in ceilings {
            if !(0.0..=100.0).contains(&value) {
                return Err(LpError::ConfigError(format!(
                    "{} must be within 0..=100 (got {})",
                    name, value
                )));
            }
        }

        for (name, band) in [("title_band", self.title_band), ("meta_band", self.meta_band)] {
            if band.min > band.max {
                return Err(LpError::ConfigError(format!(
                    "{} is inverted ({} > {})",
                    name, band.min, band.max
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.technical.alt_ratio_min) {
            return Err(LpError::ConfigError(
                "technical.alt_ratio_min must be within 0..=1".into(),
            ));
        }

        if self.feedback.max_delta < 0.0 {
            return Err(LpError::ConfigError(
                "feedback.max_delta must be non-negative".into(),
            ));
        }

        Ok(())
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.scoring.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&config_path, self.to_toml()?)?;
        Ok(())
    }

    /// Render as pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| LpError::ConfigError(e.to_string()))
    }

    /// Get the config file path
    ///
    /// Supports LPCHECK_CONFIG environment variable for test isolation
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("LPCHECK_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        let dirs = ProjectDirs::from("", "", "lpcheck")
            .ok_or_else(|| LpError::ConfigError("Could not determine config directory".into()))?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.scoring.version, DEFAULT_SCORING_VERSION);
        assert_eq!(config.server.addr, "127.0.0.1:3000");
        assert!((config.scoring.overall.sum() - 1.0).abs() < 1e-9);
        assert!(config.scoring.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml = r#"
            [scoring.caps]
            no_primary_cta = 45.0
        "#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.scoring.caps.no_primary_cta, 45.0);
        assert_eq!(config.scoring.caps.no_pricing, 70.0);
        assert_eq!(config.scoring.gate.missing3plus, 49.0);
        assert_eq!(config.scoring.title_band, LengthBand { min: 30, max: 65 });
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = Config::default();
        let text = config.to_toml().unwrap();
        let back = Config::from_toml(&text).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_validate_rejects_bad_policy() {
        let mut scoring = ScoringConfig::default();
        scoring.bofu_weights.pricing = -1.0;
        assert!(scoring.validate().is_err());

        let mut scoring = ScoringConfig::default();
        scoring.caps.no_trust = 120.0;
        assert!(scoring.validate().is_err());

        let mut scoring = ScoringConfig::default();
        scoring.title_band = LengthBand { min: 70, max: 30 };
        assert!(scoring.validate().is_err());

        let mut scoring = ScoringConfig::default();
        scoring.overall = OverallWeights {
            bofu: 0.0,
            convincing: 0.0,
            technical: 0.0,
            structure: 0.0,
        };
        assert!(scoring.validate().is_err());
    }

    #[test]
    fn test_gate_ceiling() {
        let gate = MissingPillarGate::default();
        assert_eq!(gate.ceiling(0), None);
        assert_eq!(gate.ceiling(1), Some(79.0));
        assert_eq!(gate.ceiling(2), Some(69.0));
        assert_eq!(gate.ceiling(4), Some(49.0));
    }
}
