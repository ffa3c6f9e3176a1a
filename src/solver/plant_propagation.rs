use log::{debug, trace};
use rand::Rng;

use crate::config::{PlantPropagationConfig, SearchConfig};
use crate::construction::construct_randomized;
use crate::error::ScheduleError;
use crate::schedule::mutation::{MutationSource, MutationStats, MutationType};
use crate::schedule::Schedule;
use crate::solver::{Budget, Metaheuristic, Phase, SearchOutput};
use crate::utils::{Countdown, Random, SearchProgressIterationTracker};
use crate::violation::evaluate;

#[derive(Clone, Debug)]
struct Plant {
    schedule: Schedule,
    violations: usize,
    /// Mutations that created this plant in the current generation; empty for parents.
    runner: Vec<MutationType>,
}

/// Population search: better-ranked plants send out many short runners, worse-ranked
/// ones few long runners. Offspring and parents compete for the next generation.
pub struct PlantPropagation<'a> {
    config: &'a SearchConfig,
}

impl<'a> PlantPropagation<'a> {
    pub fn new(config: &'a SearchConfig) -> Self {
        Self { config }
    }

    fn params(&self) -> &PlantPropagationConfig {
        &self.config.plant_propagation
    }

    fn plant(&self, schedule: Schedule, runner: Vec<MutationType>) -> Plant {
        Plant {
            violations: evaluate(&schedule, self.config.max_streak).total(),
            schedule,
            runner,
        }
    }

    /// The input schedule plus randomized circle-method schedules, sorted by violations.
    fn initial_population(&self, initial: Schedule, rng: &mut Random) -> Vec<Plant> {
        let tournament = initial.tournament().clone();
        let mut population = Vec::with_capacity(self.params().population_size);
        population.push(self.plant(initial, vec![]));
        while population.len() < self.params().population_size {
            population.push(self.plant(construct_randomized(&tournament, rng), vec![]));
        }
        population.sort_by_key(|plant| plant.violations);
        population
    }
}

/// Rank-based fitness in `[0, 1]`; the best plant gets 1.
pub fn normalized_fitness(rank: usize, population_size: usize) -> f64 {
    if population_size <= 1 {
        1.0
    } else {
        (population_size - 1 - rank) as f64 / (population_size - 1) as f64
    }
}

/// At least one runner; up to `max_offspring` for the fittest plants.
pub fn number_of_runners(fitness: f64, max_offspring: usize, rng: &mut Random) -> usize {
    let drawn = (max_offspring as f64 * fitness * rng.gen::<f64>()).ceil() as usize;
    drawn.clamp(1, max_offspring)
}

/// Mutations chained on one runner; up to `max_mutations` for the least fit plants.
pub fn runner_length(fitness: f64, max_mutations: usize, rng: &mut Random) -> usize {
    let extra = ((max_mutations - 1) as f64 * (1.0 - fitness) * rng.gen::<f64>()).ceil() as usize;
    (1 + extra).min(max_mutations)
}

impl<'a> Metaheuristic for PlantPropagation<'a> {
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
        let params = self.params().clone();
        let mut stats = MutationStats::default();
        let mut population = self.initial_population(initial, rng);
        let mut best_violations = population[0].violations;
        let mut iteration = 0;
        let mut generation = 0;

        tracker.update(
            Some(best_violations),
            population.last().map(|plant| plant.violations),
        );

        let mut phase = Phase::Init;
        let outcome = loop {
            phase = phase.advance(population[0].violations, iteration, budget, countdown);
            if let Some(outcome) = phase.outcome() {
                break outcome;
            }
            generation += 1;

            let population_size = population.len();
            let mut offspring: Vec<Plant> = Vec::new();
            'generation: for (rank, parent) in population.iter().enumerate() {
                let fitness = normalized_fitness(rank, population_size);
                let runners = number_of_runners(fitness, params.max_offspring_per_runner, rng);
                for _ in 0..runners {
                    if budget.is_spent(iteration, countdown) {
                        break 'generation;
                    }

                    let steps = runner_length(fitness, params.max_mutations_per_offspring, rng);
                    let mut schedule = parent.schedule.clone();
                    let mut runner = Vec::with_capacity(steps);
                    for _ in 0..steps {
                        let (mutation, neighbor) = mutations.sample_neighbor(&schedule, rng)?;
                        stats.record_proposed(mutation.mutation_type());
                        runner.push(mutation.mutation_type());
                        schedule = neighbor;
                    }

                    let child = self.plant(schedule, runner);
                    iteration += 1;
                    tracker.inc();
                    trace!(
                        "generation {}: rank {} runner of {} steps -> {} violations",
                        generation,
                        rank,
                        steps,
                        child.violations
                    );

                    let solved = child.violations == 0;
                    offspring.push(child);
                    if solved {
                        break 'generation;
                    }
                }
            }

            // offspring first, so a stable sort prefers them over equally good parents
            offspring.extend(population.into_iter().map(|mut parent| {
                parent.runner.clear();
                parent
            }));
            offspring.sort_by_key(|plant| plant.violations);
            offspring.truncate(params.selection_size);
            for survivor in offspring.iter() {
                survivor
                    .runner
                    .iter()
                    .for_each(|&mutation_type| stats.record_accepted(mutation_type));
            }
            population = offspring;

            #[cfg(feature = "search_assertions")]
            population
                .iter()
                .for_each(|plant| crate::schedule::validator::assert_valid_schedule(&plant.schedule));

            if population[0].violations < best_violations {
                debug!(
                    "generation {} ({} iterations): new best {} -> {}",
                    generation, iteration, best_violations, population[0].violations
                );
                best_violations = population[0].violations;
            }
            tracker.update(
                Some(best_violations),
                population.last().map(|plant| plant.violations),
            );
        };

        debug!("plant propagation stopped after {} generations", generation);

        let best = population.swap_remove(0);
        Ok(SearchOutput {
            best_violations: best.violations,
            current_violations: best.violations,
            best: best.schedule,
            outcome,
            iterations: iteration,
            mutation_stats: stats,
        })
    }
}
