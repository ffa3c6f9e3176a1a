use std::time::Duration;

use clap::ValueEnum;
use log::info;
use serde::{Deserialize, Serialize};
use took::{Timer, Took};

use crate::config::SearchConfig;
use crate::error::ScheduleError;
use crate::schedule::mutation::{MutationSampler, MutationSource, MutationStats};
use crate::schedule::Schedule;
use crate::utils::logging::format_log_method_report_timed;
use crate::utils::{
    create_seeded_rng, Countdown, DefaultSearchTracker, Random, SearchProgressIterationTracker,
    TimeLimit,
};
use crate::violation::{evaluate, ViolationReport};

pub mod acceptance_criterion;
pub mod local_search;
pub mod plant_propagation;

use acceptance_criterion::{MetropolisCriteria, NonWorseningCriteria};
use local_search::TrajectorySearch;
use plant_propagation::PlantPropagation;

#[allow(non_camel_case_types)]
#[derive(Clone, Copy, ValueEnum, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    #[serde(rename = "hill-climbing")]
    HILL_CLIMBING,
    #[serde(rename = "simulated-annealing")]
    SIMULATED_ANNEALING,
    #[serde(rename = "plant-propagation")]
    PLANT_PROPAGATION,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::HILL_CLIMBING => "hill climbing",
            Strategy::SIMULATED_ANNEALING => "simulated annealing",
            Strategy::PLANT_PROPAGATION => "plant propagation",
        }
    }
}

/// Limits of one search run. An iteration is one evaluated candidate schedule.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub max_iterations: usize,
    pub max_seconds: Option<f64>,
}

impl Budget {
    pub fn iterations(max_iterations: usize) -> Self {
        Self {
            max_iterations,
            max_seconds: None,
        }
    }

    pub fn with_seconds(mut self, max_seconds: f64) -> Self {
        self.max_seconds = Some(max_seconds);
        self
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.max_iterations == 0 {
            return Err(ScheduleError::Configuration(
                "iteration budget must be positive".to_string(),
            ));
        }
        match self.max_seconds {
            Some(seconds)
                if !(seconds > 0.0) || Duration::try_from_secs_f64(seconds).is_err() =>
            {
                Err(ScheduleError::Configuration(format!(
                    "time limit must be a positive, representable number of seconds (got {})",
                    seconds
                )))
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn is_spent(&self, iterations: usize, countdown: &Countdown) -> bool {
        iterations >= self.max_iterations || countdown.is_finished()
    }
}

/// Lifecycle of a search run. `Converged` and `Exhausted` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Init,
    Searching,
    Converged,
    Exhausted,
}

impl Phase {
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            Phase::Converged => Some(Outcome::Converged),
            Phase::Exhausted => Some(Outcome::Exhausted),
            Phase::Init | Phase::Searching => None,
        }
    }

    /// Phase before the next iteration. `Init` and `Searching` move on to a terminal phase
    /// once the run is solved or its budget is spent, and to `Searching` otherwise.
    pub(crate) fn advance(
        self,
        best_violations: usize,
        iterations: usize,
        budget: &Budget,
        countdown: &Countdown,
    ) -> Phase {
        match self {
            Phase::Converged | Phase::Exhausted => self,
            Phase::Init | Phase::Searching => {
                if best_violations == 0 {
                    Phase::Converged
                } else if budget.is_spent(iterations, countdown) {
                    Phase::Exhausted
                } else {
                    Phase::Searching
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Converged,
    Exhausted,
}

impl Outcome {
    pub fn is_converged(&self) -> bool {
        matches!(self, Outcome::Converged)
    }
}

/// What a strategy hands back to `run`.
#[derive(Clone, Debug)]
pub struct SearchOutput {
    pub best: Schedule,
    pub best_violations: usize,
    /// Violations of the schedule the search held when it stopped.
    pub current_violations: usize,
    pub outcome: Outcome,
    pub iterations: usize,
    pub mutation_stats: MutationStats,
}

/// A search strategy over schedules, driven by a mutation source.
pub trait Metaheuristic {
    fn search<M, T>(
        &mut self,
        initial: Schedule,
        mutations: &mut M,
        rng: &mut Random,
        budget: &Budget,
        countdown: &Countdown,
        tracker: &mut T,
    ) -> Result<SearchOutput, ScheduleError>
    where
        M: MutationSource,
        T: SearchProgressIterationTracker;
}

pub struct SolverResult {
    pub strategy: Strategy,
    pub final_schedule: Schedule,
    pub final_violations: usize,
    pub report: ViolationReport,
    pub current_violations: usize,
    pub outcome: Outcome,
    pub iterations: usize,
    pub mutation_stats: MutationStats,
    pub time: Took,
}

/// Repairs `initial` with `strategy` until no violation is left or `budget` runs out.
pub fn run(
    strategy: Strategy,
    initial: Schedule,
    config: &SearchConfig,
    seed: i128,
    budget: Budget,
) -> Result<SolverResult, ScheduleError> {
    let mut rng = create_seeded_rng(seed);
    let mut sampler = MutationSampler::new(&config.mutation)?;
    let mut tracker = DefaultSearchTracker::new(budget.max_iterations as u64);
    run_with(
        strategy,
        initial,
        config,
        &mut rng,
        budget,
        &mut sampler,
        &mut tracker,
    )
}

pub fn run_with<M, T>(
    strategy: Strategy,
    initial: Schedule,
    config: &SearchConfig,
    rng: &mut Random,
    budget: Budget,
    mutations: &mut M,
    tracker: &mut T,
) -> Result<SolverResult, ScheduleError>
where
    M: MutationSource,
    T: SearchProgressIterationTracker,
{
    config.validate()?;
    budget.validate()?;

    let timer = Timer::new();
    let countdown = Countdown::new(timer.clone(), TimeLimit::from_seconds(budget.max_seconds));

    info!(
        "{} on {} teams (max. iterations: {}, time limit: {:?})",
        strategy.name(),
        initial.tournament().num_teams,
        budget.max_iterations,
        budget.max_seconds
    );

    let output = match strategy {
        Strategy::HILL_CLIMBING => TrajectorySearch::new(config, NonWorseningCriteria).search(
            initial, mutations, rng, &budget, &countdown, tracker,
        ),
        Strategy::SIMULATED_ANNEALING => {
            TrajectorySearch::new(config, MetropolisCriteria::new(&config.annealing))
                .search(initial, mutations, rng, &budget, &countdown, tracker)
        }
        Strategy::PLANT_PROPAGATION => PlantPropagation::new(config).search(
            initial, mutations, rng, &budget, &countdown, tracker,
        ),
    }?;

    #[cfg(feature = "search_assertions")]
    crate::schedule::validator::assert_valid_schedule(&output.best);

    let report = evaluate(&output.best, config.max_streak);
    let time = timer.took();
    info!(
        "{} after {} iterations ({:?})",
        format_log_method_report_timed(strategy.name(), &report, timer.took()),
        output.iterations,
        output.outcome
    );

    Ok(SolverResult {
        strategy,
        final_violations: report.total(),
        final_schedule: output.best,
        report,
        current_violations: output.current_violations,
        outcome: output.outcome,
        iterations: output.iterations,
        mutation_stats: output.mutation_stats,
        time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construction::{construct, construct_randomized};
    use crate::problem::Tournament;

    fn scrambled(num_teams: usize, seed: i128) -> anyhow::Result<Schedule> {
        let tournament = Tournament::with_even_teams(num_teams)?;
        Ok(construct_randomized(&tournament, &mut create_seeded_rng(seed)))
    }

    #[test]
    fn invalid_budgets_are_rejected() -> anyhow::Result<()> {
        let schedule = construct(4)?;
        let config = SearchConfig::default();
        for budget in [
            Budget::iterations(0),
            Budget::iterations(10).with_seconds(0.0),
            Budget::iterations(10).with_seconds(-1.0),
            Budget::iterations(10).with_seconds(1e20),
            Budget::iterations(10).with_seconds(f64::INFINITY),
        ] {
            let result = run(Strategy::HILL_CLIMBING, schedule.clone(), &config, 0, budget);
            assert!(matches!(result, Err(ScheduleError::Configuration(_))));
        }
        Ok(())
    }

    #[test]
    fn valid_input_converges_without_iterations() -> anyhow::Result<()> {
        let config = SearchConfig::default();
        let schedule = construct(4)?;
        assert_eq!(evaluate(&schedule, config.max_streak).total(), 0);

        for strategy in Strategy::value_variants() {
            let result = run(*strategy, schedule.clone(), &config, 1, Budget::iterations(100))?;
            assert_eq!(result.outcome, Outcome::Converged);
            assert_eq!(result.iterations, 0);
            assert_eq!(result.final_schedule, schedule);
        }
        Ok(())
    }

    #[test]
    fn repaired_schedules_stay_double_round_robins() -> anyhow::Result<()> {
        let config = SearchConfig::default();
        let initial = scrambled(6, 1)?;
        for strategy in Strategy::value_variants() {
            let result = run(*strategy, initial.clone(), &config, 0, Budget::iterations(2_000))?;
            assert_eq!(
                crate::schedule::validator::validate_schedule(&result.final_schedule),
                Ok(())
            );
            assert_eq!(result.final_violations, result.report.total());
            assert_eq!(
                result.final_violations,
                evaluate(&result.final_schedule, config.max_streak).total()
            );
        }
        Ok(())
    }

    #[test]
    fn runs_are_reproducible() -> anyhow::Result<()> {
        let config = SearchConfig::default();
        let initial = scrambled(8, 4)?;
        for strategy in Strategy::value_variants() {
            let a = run(*strategy, initial.clone(), &config, 17, Budget::iterations(300))?;
            let b = run(*strategy, initial.clone(), &config, 17, Budget::iterations(300))?;
            assert_eq!(a.final_schedule, b.final_schedule);
            assert_eq!(a.iterations, b.iterations);
            assert_eq!(a.mutation_stats, b.mutation_stats);
        }
        Ok(())
    }

    #[test]
    fn neighbouring_seeds_search_differently() -> anyhow::Result<()> {
        let config = SearchConfig::default();
        let initial = scrambled(10, 4)?;
        let budget = Budget::iterations(300);
        for seed in [0, 2, 42] {
            let strategy = Strategy::SIMULATED_ANNEALING;
            let a = run(strategy, initial.clone(), &config, seed, budget)?;
            let b = run(strategy, initial.clone(), &config, seed + 1, budget)?;
            assert_ne!(
                a.final_schedule, b.final_schedule,
                "seeds {} and {}",
                seed,
                seed + 1
            );
        }
        Ok(())
    }

    #[test]
    fn trajectory_searches_repair_four_teams() -> anyhow::Result<()> {
        let mut config = SearchConfig::default();
        config.annealing.initial_temperature = 1.0;
        config.annealing.cooling_rate = 0.999;

        let mut repaired = 0;
        for seed in 0..10 {
            let initial = scrambled(4, seed)?;
            if evaluate(&initial, config.max_streak).total() == 0 {
                continue;
            }
            for strategy in [Strategy::HILL_CLIMBING, Strategy::SIMULATED_ANNEALING] {
                let budget = Budget::iterations(10_000);
                let result = run(strategy, initial.clone(), &config, 0, budget)?;
                assert_eq!(
                    result.outcome,
                    Outcome::Converged,
                    "{:?} from seed {}",
                    strategy,
                    seed
                );
                assert_eq!(result.final_violations, 0);
                assert!(result.iterations > 0);
            }
            repaired += 1;
        }
        assert!(repaired > 0);
        Ok(())
    }

    #[test]
    fn result_never_worse_than_input() -> anyhow::Result<()> {
        let config = SearchConfig::default();
        let initial = scrambled(10, 8)?;
        let before = evaluate(&initial, config.max_streak).total();
        for strategy in Strategy::value_variants() {
            let result = run(*strategy, initial.clone(), &config, 3, Budget::iterations(200))?;
            assert!(result.final_violations <= before);
            assert!(result.iterations <= 200);
            if result.outcome == Outcome::Exhausted {
                assert_eq!(result.iterations, 200);
            }
        }
        Ok(())
    }

    #[test]
    fn phase_transitions() {
        let countdown = Countdown::empty();
        let budget = Budget::iterations(5);
        assert_eq!(
            Phase::Init.advance(0, 0, &budget, &countdown),
            Phase::Converged
        );
        assert_eq!(
            Phase::Init.advance(2, 0, &budget, &countdown),
            Phase::Searching
        );
        assert_eq!(
            Phase::Searching.advance(2, 4, &budget, &countdown),
            Phase::Searching
        );
        assert_eq!(
            Phase::Searching.advance(2, 5, &budget, &countdown),
            Phase::Exhausted
        );
        assert_eq!(
            Phase::Exhausted.advance(0, 0, &budget, &countdown),
            Phase::Exhausted
        );
        assert_eq!(Phase::Init.outcome(), None);
        assert_eq!(Phase::Exhausted.outcome(), Some(Outcome::Exhausted));
    }
}
