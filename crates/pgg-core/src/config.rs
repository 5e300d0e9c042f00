//! Configuration System
//!
//! Loads game parameters from a TOML file. Every constant the engine consults
//! lives here and is passed to the systems as an immutable resource.

use bevy_ecs::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::policy::BAND_COUNT;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "pgg.toml";

/// Top-level configuration structure
#[derive(Resource, Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub simulation: SimulationConfig,
    pub grid: GridConfig,
    pub population: PopulationConfig,
    pub payoff: PayoffConfig,
    pub policy: PolicyConfig,
    pub punishment: PunishmentConfig,
    pub ledger: LedgerConfig,
}

/// Order in which agents act within a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationMode {
    /// Reshuffled every tick
    #[default]
    Random,
    /// Ascending agent id
    Sequential,
}

/// Run parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub max_ticks: u64,
    pub activation: ActivationMode,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_ticks: 1000,
            activation: ActivationMode::Random,
        }
    }
}

/// Grid dimensions
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: u32,
    pub height: u32,
    /// Edges wrap around
    pub torus: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            torus: true,
        }
    }
}

/// Population seeding
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub num_cooperators: usize,
    /// Defectors spawned per cooperator
    pub defector_ratio: f64,
    pub initial_wealth: f64,
    pub moral_worth_mean: f64,
    pub moral_worth_sd: f64,
}

impl PopulationConfig {
    pub fn num_defectors(&self) -> usize {
        (self.num_cooperators as f64 * self.defector_ratio).round() as usize
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            num_cooperators: 20,
            defector_ratio: 0.25,
            initial_wealth: 20.0,
            moral_worth_mean: 5.0,
            moral_worth_sd: 3.5,
        }
    }
}

/// Common pool economics
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PayoffConfig {
    pub multiplier: f64,
    /// Investment made when the contribution draw fails
    pub fixed_loss: f64,
}

impl Default for PayoffConfig {
    fn default() -> Self {
        Self {
            multiplier: 1.6,
            fixed_loss: 2.0,
        }
    }
}

/// Per-band contribution odds and amounts for one archetype.
///
/// Bands in order: `[-20,-11]`, `[-10,-1]`, `{0}`, `[1,10]`, `[11,20]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContributionTable {
    pub probabilities: [f64; BAND_COUNT],
    pub amounts: [f64; BAND_COUNT],
}

impl ContributionTable {
    pub fn cooperator() -> Self {
        Self {
            probabilities: [0.4, 0.5, 0.6, 0.7, 0.8],
            amounts: [17.7; BAND_COUNT],
        }
    }

    pub fn defector() -> Self {
        Self {
            probabilities: [0.2, 0.3, 0.4, 0.5, 0.6],
            amounts: [17.7; BAND_COUNT],
        }
    }
}

/// Contribution tables for both archetypes
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub cooperator: ContributionTable,
    pub defector: ContributionTable,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            cooperator: ContributionTable::cooperator(),
            defector: ContributionTable::defector(),
        }
    }
}

/// Thresholds a punishment draw must not exceed
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PunishmentProbabilities {
    pub altruistic_minor: f64,
    pub altruistic_major: f64,
    pub antisocial_minor: f64,
    pub antisocial_major: f64,
    /// Fifth entry of the reference table; not consulted by the protocol
    pub reserved: f64,
}

impl Default for PunishmentProbabilities {
    fn default() -> Self {
        Self {
            altruistic_minor: 0.43,
            altruistic_major: 0.77,
            antisocial_minor: 0.01,
            antisocial_major: 0.15,
            reserved: 0.13,
        }
    }
}

impl PunishmentProbabilities {
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.altruistic_minor,
            self.altruistic_major,
            self.antisocial_minor,
            self.antisocial_major,
            self.reserved,
        ]
    }
}

/// Inclusive range over investments or investment gaps
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GapBand {
    pub min: f64,
    pub max: f64,
}

impl GapBand {
    pub fn contains(&self, gap: f64) -> bool {
        self.min <= gap && gap <= self.max
    }
}

/// Who an acting agent may punish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpponentScope {
    /// Any other live agent
    #[default]
    Population,
    /// Agents in the Moore neighborhood of the acting agent's cell
    Neighborhood,
}

/// Punishment protocol parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PunishmentConfig {
    /// Paid by the punisher
    pub cost_punish_agent: f64,
    /// Taken from the punished agent
    pub agent_punishment: f64,
    pub probabilities: PunishmentProbabilities,
    pub minor_gap: GapBand,
    pub major_gap: GapBand,
    pub opponent_scope: OpponentScope,
}

impl Default for PunishmentConfig {
    fn default() -> Self {
        Self {
            cost_punish_agent: 1.0,
            agent_punishment: 3.0,
            probabilities: PunishmentProbabilities::default(),
            minor_gap: GapBand { min: 1.0, max: 10.0 },
            major_gap: GapBand { min: 11.0, max: 20.0 },
            opponent_scope: OpponentScope::Population,
        }
    }
}

/// Moral-worth rewards by investment.
///
/// Investing within `modest` earns +1, within `generous` +2. Investing at or
/// below `payoff.fixed_loss` costs 1.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub modest: GapBand,
    pub generous: GapBand,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            modest: GapBand { min: 3.0, max: 10.0 },
            generous: GapBand { min: 11.0, max: 20.0 },
        }
    }
}

impl GameConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the given path, or use defaults if it cannot be read
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Could not load game config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(ConfigError::Invalid("grid dimensions must be positive".into()));
        }
        if self.payoff.multiplier <= 0.0 {
            return Err(ConfigError::Invalid("payoff multiplier must be positive".into()));
        }
        if self.payoff.fixed_loss < 0.0 {
            return Err(ConfigError::Invalid("fixed loss must not be negative".into()));
        }
        if self.punishment.cost_punish_agent < 0.0 || self.punishment.agent_punishment < 0.0 {
            return Err(ConfigError::Invalid("punishment costs must not be negative".into()));
        }
        if self.population.defector_ratio < 0.0 {
            return Err(ConfigError::Invalid("defector ratio must not be negative".into()));
        }
        if self.population.moral_worth_sd < 0.0 {
            return Err(ConfigError::Invalid(
                "moral worth standard deviation must not be negative".into(),
            ));
        }

        let punishment = self.punishment.probabilities.as_array();
        let probabilities = self
            .policy
            .cooperator
            .probabilities
            .iter()
            .chain(self.policy.defector.probabilities.iter())
            .chain(punishment.iter());
        for p in probabilities {
            if !(0.0..=1.0).contains(p) {
                return Err(ConfigError::Invalid(format!(
                    "probability {} is outside [0, 1]",
                    p
                )));
            }
        }

        for (band, (coop, defect)) in self
            .policy
            .cooperator
            .probabilities
            .iter()
            .zip(self.policy.defector.probabilities.iter())
            .enumerate()
        {
            if coop <= defect {
                return Err(ConfigError::Invalid(format!(
                    "cooperator probability must exceed defector probability in band {}",
                    band
                )));
            }
        }

        let amounts = self
            .policy
            .cooperator
            .amounts
            .iter()
            .chain(self.policy.defector.amounts.iter());
        for amount in amounts {
            if *amount <= self.payoff.fixed_loss {
                return Err(ConfigError::Invalid(format!(
                    "contribution amount {} must exceed the fixed loss {}",
                    amount, self.payoff.fixed_loss
                )));
            }
        }

        Ok(())
    }
}

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.simulation.max_ticks, 1000);
        assert_eq!(config.payoff.multiplier, 1.6);
        assert_eq!(config.payoff.fixed_loss, 2.0);
        assert_eq!(config.punishment.cost_punish_agent, 1.0);
        assert_eq!(config.punishment.agent_punishment, 3.0);
        assert_eq!(
            config.punishment.probabilities.as_array(),
            [0.43, 0.77, 0.01, 0.15, 0.13]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defector_count_rounds() {
        let mut population = PopulationConfig::default();
        population.num_cooperators = 10;
        population.defector_ratio = 0.25;
        assert_eq!(population.num_defectors(), 3);
        population.defector_ratio = 0.0;
        assert_eq!(population.num_defectors(), 0);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = GameConfig::from_toml_str(
            r#"
            [payoff]
            multiplier = 2.0

            [punishment]
            opponent_scope = "neighborhood"

            [simulation]
            activation = "sequential"
            "#,
        )
        .unwrap();

        assert_eq!(config.payoff.multiplier, 2.0);
        assert_eq!(config.payoff.fixed_loss, 2.0);
        assert_eq!(config.punishment.opponent_scope, OpponentScope::Neighborhood);
        assert_eq!(config.simulation.activation, ActivationMode::Sequential);
        assert_eq!(config.grid.width, 10);
    }

    #[test]
    fn test_custom_table_from_toml() {
        let config = GameConfig::from_toml_str(
            r#"
            [policy.defector]
            probabilities = [0.1, 0.1, 0.1, 0.1, 0.1]
            amounts = [5.0, 5.0, 5.0, 5.0, 5.0]
            "#,
        )
        .unwrap();

        assert_eq!(config.policy.defector.amounts, [5.0; BAND_COUNT]);
        assert_eq!(config.policy.cooperator, ContributionTable::cooperator());
    }

    #[test]
    fn test_rejects_inverted_tables() {
        let mut config = GameConfig::default();
        config.policy.defector.probabilities[2] = 0.6;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_amount_below_fixed_loss() {
        let mut config = GameConfig::default();
        config.policy.cooperator.amounts[0] = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_probability_out_of_range() {
        let mut config = GameConfig::default();
        config.punishment.probabilities.altruistic_major = 1.2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_reserved_probability_out_of_range() {
        let result = GameConfig::from_toml_str("[punishment.probabilities]\nreserved = -0.1\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_parse_error() {
        let result = GameConfig::from_toml_str("[payoff\nmultiplier = ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = GameConfig::load_or_default("definitely/not/here.toml");
        assert_eq!(config.population.initial_wealth, 20.0);
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let config = GameConfig::from_toml_str(include_str!("../../../pgg.toml")).unwrap();
        let defaults = GameConfig::default();
        assert_eq!(config.simulation.activation, defaults.simulation.activation);
        assert_eq!(config.policy.cooperator, defaults.policy.cooperator);
        assert_eq!(config.policy.defector, defaults.policy.defector);
        assert_eq!(config.punishment.probabilities, defaults.punishment.probabilities);
        assert_eq!(config.punishment.major_gap, defaults.punishment.major_gap);
        assert_eq!(config.punishment.opponent_scope, defaults.punishment.opponent_scope);
        assert_eq!(config.ledger.modest, defaults.ledger.modest);
        assert_eq!(config.ledger.generous, defaults.ledger.generous);
        assert_eq!(config.population.num_defectors(), 5);
    }

    #[test]
    fn test_ledger_bands_from_toml() {
        let config =
            GameConfig::from_toml_str("[ledger]\ngenerous = { min = 12.0, max = 25.0 }\n").unwrap();
        assert_eq!(config.ledger.modest, GapBand { min: 3.0, max: 10.0 });
        assert_eq!(config.ledger.generous, GapBand { min: 12.0, max: 25.0 });
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_PATH);
        fs::write(&path, "[grid]\nwidth = 25\ntorus = false\n").unwrap();

        let config = GameConfig::load(&path).unwrap();
        assert_eq!(config.grid.width, 25);
        assert_eq!(config.grid.height, 10);
        assert!(!config.grid.torus);
        assert!(matches!(
            GameConfig::load(dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_gap_band_inclusive() {
        let band = GapBand { min: 11.0, max: 20.0 };
        assert!(band.contains(11.0));
        assert!(band.contains(15.7));
        assert!(band.contains(20.0));
        assert!(!band.contains(10.5));
        assert!(!band.contains(20.5));
    }
}
