use log::{debug, trace};

use crate::config::SearchConfig;
use crate::error::ScheduleError;
use crate::schedule::mutation::{MutationSource, MutationStats};
use crate::schedule::Schedule;
use crate::solver::acceptance_criterion::AcceptanceCriterion;
use crate::solver::{Budget, Metaheuristic, Phase, SearchOutput};
use crate::utils::{Countdown, Random, SearchProgressIterationTracker};
use crate::violation::evaluate;

/// Single-schedule search: one neighbor per iteration, kept or dropped by the
/// acceptance criterion. Hill climbing and simulated annealing only differ in `A`.
pub struct TrajectorySearch<'a, A: AcceptanceCriterion> {
    config: &'a SearchConfig,
    acceptance_criterion: A,
}

impl<'a, A: AcceptanceCriterion> TrajectorySearch<'a, A> {
    pub fn new(config: &'a SearchConfig, acceptance_criterion: A) -> Self {
        Self {
            config,
            acceptance_criterion,
        }
    }
}

impl<'a, A: AcceptanceCriterion> Metaheuristic for TrajectorySearch<'a, A> {
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
        T: SearchProgressIterationTracker,
    {
        let max_streak = self.config.max_streak;
        let mut stats = MutationStats::default();

        let mut current_violations = evaluate(&initial, max_streak).total();
        let mut current = initial;
        let mut best = current.clone();
        let mut best_violations = current_violations;

        let mut iteration = 0;
        tracker.update(Some(best_violations), Some(current_violations));

        let mut phase = Phase::Init;
        let outcome = loop {
            phase = phase.advance(best_violations, iteration, budget, countdown);
            if let Some(outcome) = phase.outcome() {
                break outcome;
            }

            let (mutation, candidate) = mutations.sample_neighbor(&current, rng)?;
            let mutation_type = mutation.mutation_type();
            stats.record_proposed(mutation_type);
            iteration += 1;

            let candidate_violations = evaluate(&candidate, max_streak).total();
            if self.acceptance_criterion.check_acceptance(
                candidate_violations,
                best_violations,
                current_violations,
                rng,
            ) {
                stats.record_accepted(mutation_type);
                current = candidate;
                current_violations = candidate_violations;

                if current_violations < best_violations {
                    debug!(
                        "{}: new best {} -> {} with {} (temperature: {:.4})",
                        iteration,
                        best_violations,
                        current_violations,
                        mutation,
                        self.acceptance_criterion.get_current_temperature()
                    );
                    best = current.clone();
                    best_violations = current_violations;
                }
                tracker.update(Some(best_violations), Some(current_violations));
            } else {
                trace!(
                    "{}: rejected {} ({} -> {})",
                    iteration,
                    mutation,
                    current_violations,
                    candidate_violations
                );
            }

            #[cfg(feature = "search_assertions")]
            crate::schedule::validator::assert_valid_schedule(&current);

            self.acceptance_criterion.update(1);
            tracker.inc();
        };

        Ok(SearchOutput {
            best,
            best_violations,
            current_violations,
            outcome,
            iterations: iteration,
            mutation_stats: stats,
        })
    }
}
