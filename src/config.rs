use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::schedule::mutation::MutationType;
use crate::violation::DEFAULT_MAX_STREAK;

/// Options recognised by the search strategies. Every field has a default, so a TOML
/// file only needs to name what it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    pub max_streak: usize,
    /// Schedule odd team counts with a virtual bye team.
    pub allow_bye: bool,
    pub annealing: AnnealingConfig,
    pub plant_propagation: PlantPropagationConfig,
    pub mutation: MutationConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_streak: DEFAULT_MAX_STREAK,
            allow_bye: false,
            annealing: AnnealingConfig::default(),
            plant_propagation: PlantPropagationConfig::default(),
            mutation: MutationConfig::default(),
        }
    }
}

#[allow(non_camel_case_types)]
#[derive(Clone, Copy, ValueEnum, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoolingSchedule {
    /// `T <- T * cooling_rate`
    #[serde(rename = "geometric")]
    GEOMETRIC,
    /// `T <- T - cooling_rate`
    #[serde(rename = "linear")]
    LINEAR,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnnealingConfig {
    pub initial_temperature: f64,
    pub cooling_rate: f64,
    pub cooling: CoolingSchedule,
    /// Cooling never goes below this value.
    pub min_temperature: f64,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 1000.0,
            cooling_rate: 0.9999,
            cooling: CoolingSchedule::GEOMETRIC,
            min_temperature: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlantPropagationConfig {
    pub population_size: usize,
    pub max_offspring_per_runner: usize,
    /// Number of plants kept for the next generation.
    pub selection_size: usize,
    /// Upper bound of chained mutations for the worst-ranked runner.
    pub max_mutations_per_offspring: usize,
}

impl Default for PlantPropagationConfig {
    fn default() -> Self {
        Self {
            population_size: 10,
            max_offspring_per_runner: 10,
            selection_size: 10,
            max_mutations_per_offspring: 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MutationConfig {
    pub weights: MutationWeights,
    /// Resample attempts before giving up with `MutationExhausted`.
    pub max_retries: usize,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            weights: MutationWeights::default(),
            max_retries: 100,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MutationWeights {
    pub swap_rounds: u32,
    pub swap_homes: u32,
    pub partial_swap_teams: u32,
    pub swap_teams: u32,
    pub invert_round: u32,
}

impl Default for MutationWeights {
    fn default() -> Self {
        Self {
            swap_rounds: 1,
            swap_homes: 1,
            partial_swap_teams: 1,
            swap_teams: 1,
            invert_round: 1,
        }
    }
}

impl MutationWeights {
    pub fn weight(&self, mutation_type: MutationType) -> u32 {
        match mutation_type {
            MutationType::SwapRounds => self.swap_rounds,
            MutationType::SwapHomes => self.swap_homes,
            MutationType::PartialSwapTeams => self.partial_swap_teams,
            MutationType::SwapTeams => self.swap_teams,
            MutationType::InvertRound => self.invert_round,
        }
    }

    pub fn only(mutation_type: MutationType) -> Self {
        let mut weights = Self {
            swap_rounds: 0,
            swap_homes: 0,
            partial_swap_teams: 0,
            swap_teams: 0,
            invert_round: 0,
        };
        match mutation_type {
            MutationType::SwapRounds => weights.swap_rounds = 1,
            MutationType::SwapHomes => weights.swap_homes = 1,
            MutationType::PartialSwapTeams => weights.partial_swap_teams = 1,
            MutationType::SwapTeams => weights.swap_teams = 1,
            MutationType::InvertRound => weights.invert_round = 1,
        }
        weights
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), ScheduleError> {
        let invalid = |reason: String| Err(ScheduleError::Configuration(reason));

        if self.max_streak == 0 {
            return invalid("max_streak must be positive".to_string());
        }

        let annealing = &self.annealing;
        if !(annealing.initial_temperature > 0.0) || !annealing.initial_temperature.is_finite() {
            return invalid(format!(
                "initial temperature must be positive (got {})",
                annealing.initial_temperature
            ));
        }
        if !(annealing.min_temperature >= 0.0) {
            return invalid(format!(
                "minimum temperature must not be negative (got {})",
                annealing.min_temperature
            ));
        }
        match annealing.cooling {
            CoolingSchedule::GEOMETRIC => {
                if !(annealing.cooling_rate > 0.0 && annealing.cooling_rate <= 1.0) {
                    return invalid(format!(
                        "geometric cooling rate must be in (0, 1] (got {})",
                        annealing.cooling_rate
                    ));
                }
            }
            CoolingSchedule::LINEAR => {
                if !(annealing.cooling_rate >= 0.0) || !annealing.cooling_rate.is_finite() {
                    return invalid(format!(
                        "linear cooling rate must not be negative (got {})",
                        annealing.cooling_rate
                    ));
                }
            }
        }

        let ppa = &self.plant_propagation;
        if ppa.population_size == 0
            || ppa.selection_size == 0
            || ppa.max_offspring_per_runner == 0
            || ppa.max_mutations_per_offspring == 0
        {
            return invalid(format!(
                "plant propagation sizes must be positive (got {:?})",
                ppa
            ));
        }

        if self.mutation.max_retries == 0 {
            return invalid("max_retries must be positive".to_string());
        }
        if MutationType::ALL
            .iter()
            .all(|&it| self.mutation.weights.weight(it) == 0)
        {
            return invalid("at least one mutation type needs a positive weight".to_string());
        }

        Ok(())
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let mut s = String::new();
        File::open(path)
            .with_context(|| format!("cannot open search config {}", path.display()))?
            .read_to_string(&mut s)?;
        Self::from_toml_str(s.as_str())
            .with_context(|| format!("invalid search config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SearchConfig::default();
        assert_eq!(config.max_streak, 3);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn partial_toml_keeps_defaults() -> anyhow::Result<()> {
        let config = SearchConfig::from_toml_str(
            r#"
            max_streak = 2

            [annealing]
            initial_temperature = 50.0
            cooling = "linear"
            cooling_rate = 0.01

            [mutation.weights]
            invert_round = 0
            "#,
        )?;
        assert_eq!(config.max_streak, 2);
        assert_eq!(config.annealing.cooling, CoolingSchedule::LINEAR);
        assert_eq!(config.annealing.initial_temperature, 50.0);
        assert_eq!(config.plant_propagation, PlantPropagationConfig::default());
        assert_eq!(config.mutation.weights.invert_round, 0);
        assert_eq!(config.mutation.weights.swap_rounds, 1);
        Ok(())
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(SearchConfig::from_toml_str("max_streek = 2").is_err());
    }

    #[test]
    fn invalid_values_are_configuration_errors() {
        let mut config = SearchConfig::default();
        config.max_streak = 0;
        assert!(matches!(
            config.validate(),
            Err(ScheduleError::Configuration(_))
        ));

        let mut config = SearchConfig::default();
        config.annealing.cooling_rate = 1.5;
        assert!(config.validate().is_err());

        let mut config = SearchConfig::default();
        config.plant_propagation.selection_size = 0;
        assert!(config.validate().is_err());

        let mut config = SearchConfig::default();
        config.mutation.weights = MutationWeights::only(MutationType::SwapHomes);
        config.mutation.weights.swap_homes = 0;
        assert!(config.validate().is_err());
    }
}
