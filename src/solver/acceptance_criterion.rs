use rand::Rng;

use crate::config::{AnnealingConfig, CoolingSchedule};
use crate::utils::Random;

#[derive(Clone)]
pub struct MetropolisCriteria {
    min_temperature: f64,
    current_temperature: f64,
    cooling_rate: f64,
    cooling: CoolingSchedule,
}

impl MetropolisCriteria {
    pub fn new(config: &AnnealingConfig) -> Self {
        Self {
            min_temperature: config.min_temperature,
            current_temperature: config.initial_temperature,
            cooling_rate: config.cooling_rate,
            cooling: config.cooling,
        }
    }
}

/// Accepts any candidate that is not worse than the current schedule.
#[derive(Clone)]
pub struct NonWorseningCriteria;

pub trait AcceptanceCriterion: Clone + Sync + Send {
    fn update(&mut self, num_iterations: usize);
    fn check_acceptance(
        &self,
        new_violations: usize,
        best_violations: usize,
        current_violations: usize,
        rng: &mut Random,
    ) -> bool;

    fn get_current_temperature(&self) -> f64;
}

impl AcceptanceCriterion for MetropolisCriteria {
    fn update(&mut self, num_iterations: usize) {
        let cooled = match self.cooling {
            CoolingSchedule::GEOMETRIC => {
                self.current_temperature * self.cooling_rate.powi(num_iterations as i32)
            }
            CoolingSchedule::LINEAR => {
                self.current_temperature - self.cooling_rate * (num_iterations as f64)
            }
        };
        self.current_temperature = cooled.max(self.min_temperature);
    }
    fn check_acceptance(
        &self,
        new_violations: usize,
        _best_violations: usize,
        current_violations: usize,
        rng: &mut Random,
    ) -> bool {
        if new_violations <= current_violations {
            return true;
        }
        if self.current_temperature <= 0.0 {
            return false;
        }
        // u < exp(-delta / T), written as new < current - T * ln(u)
        (new_violations as f64)
            < (current_violations as f64)
                - self.current_temperature * (rng.gen_range(0.0..=1.0f64).ln())
    }
    fn get_current_temperature(&self) -> f64 {
        self.current_temperature
    }
}

impl AcceptanceCriterion for NonWorseningCriteria {
    fn update(&mut self, _num_iterations: usize) {}
    fn check_acceptance(
        &self,
        new_violations: usize,
        _best_violations: usize,
        current_violations: usize,
        _rng: &mut Random,
    ) -> bool {
        new_violations <= current_violations
    }
    fn get_current_temperature(&self) -> f64 {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::create_seeded_rng;

    fn annealing(
        initial_temperature: f64,
        cooling_rate: f64,
        cooling: CoolingSchedule,
    ) -> AnnealingConfig {
        AnnealingConfig {
            initial_temperature,
            cooling_rate,
            cooling,
            min_temperature: 0.0,
        }
    }

    #[test]
    fn non_worsening_accepts_ties_but_not_regressions() {
        let mut rng = create_seeded_rng(0);
        let criterion = NonWorseningCriteria;
        assert!(criterion.check_acceptance(4, 4, 5, &mut rng));
        assert!(criterion.check_acceptance(5, 4, 5, &mut rng));
        assert!(!criterion.check_acceptance(6, 4, 5, &mut rng));
    }

    #[test]
    fn geometric_cooling_multiplies() {
        let mut criterion =
            MetropolisCriteria::new(&annealing(100.0, 0.5, CoolingSchedule::GEOMETRIC));
        criterion.update(1);
        assert!((criterion.get_current_temperature() - 50.0).abs() < 1e-9);
        criterion.update(2);
        assert!((criterion.get_current_temperature() - 12.5).abs() < 1e-9);
    }

    #[test]
    fn linear_cooling_stops_at_the_minimum() {
        let mut config = annealing(1.0, 0.4, CoolingSchedule::LINEAR);
        config.min_temperature = 0.1;
        let mut criterion = MetropolisCriteria::new(&config);
        criterion.update(1);
        assert!((criterion.get_current_temperature() - 0.6).abs() < 1e-9);
        criterion.update(5);
        assert_eq!(criterion.get_current_temperature(), 0.1);
    }

    #[test]
    fn frozen_metropolis_behaves_like_hill_climbing() {
        let mut rng = create_seeded_rng(1);
        let mut criterion =
            MetropolisCriteria::new(&annealing(1.0, 2.0, CoolingSchedule::LINEAR));
        criterion.update(1);
        assert_eq!(criterion.get_current_temperature(), 0.0);
        for _ in 0..100 {
            assert!(!criterion.check_acceptance(11, 3, 10, &mut rng));
            assert!(criterion.check_acceptance(10, 3, 10, &mut rng));
        }
    }

    #[test]
    fn acceptance_rate_follows_the_boltzmann_factor() {
        let mut rng = create_seeded_rng(2);
        let criterion = MetropolisCriteria::new(&annealing(2.0, 1.0, CoolingSchedule::GEOMETRIC));
        let trials = 20_000;
        let accepted = (0..trials)
            .filter(|_| criterion.check_acceptance(12, 10, 10, &mut rng))
            .count();
        let rate = accepted as f64 / trials as f64;
        // exp(-2 / 2) ~ 0.368
        assert!((rate - (-1.0f64).exp()).abs() < 0.02, "rate {}", rate);
    }
}
