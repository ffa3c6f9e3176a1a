use log::trace;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::index;
use rand::Rng;

use crate::config::MutationConfig;
use crate::error::ScheduleError;
use crate::schedule::mutation::{Mutation, MutationType};
use crate::schedule::Schedule;
use crate::utils::Random;

/// Source of candidate mutations for the search loops.
pub trait MutationSource {
    fn propose(&mut self, schedule: &Schedule, rng: &mut Random) -> Mutation;

    fn max_retries(&self) -> usize;

    /// Proposes and applies mutations until one is structurally valid.
    fn sample_neighbor(
        &mut self,
        schedule: &Schedule,
        rng: &mut Random,
    ) -> Result<(Mutation, Schedule), ScheduleError> {
        let attempts = self.max_retries();
        for _ in 0..attempts {
            let mutation = self.propose(schedule, rng);
            match schedule.apply(&mutation) {
                Ok(neighbor) => return Ok((mutation, neighbor)),
                Err(ScheduleError::InvalidMutation(reason)) => {
                    trace!("resampling: {}", reason);
                }
                Err(e) => return Err(e),
            }
        }
        Err(ScheduleError::MutationExhausted { attempts })
    }
}

/// Draws mutation types by weight and their parameters uniformly.
#[derive(Clone, Debug)]
pub struct MutationSampler {
    types: Vec<MutationType>,
    distribution: WeightedIndex<u32>,
    max_retries: usize,
}

impl MutationSampler {
    pub fn new(config: &MutationConfig) -> Result<Self, ScheduleError> {
        let (types, weights): (Vec<MutationType>, Vec<u32>) = MutationType::ALL
            .iter()
            .map(|&it| (it, config.weights.weight(it)))
            .filter(|(_, weight)| *weight > 0)
            .unzip();
        let distribution = WeightedIndex::new(&weights).map_err(|e| {
            ScheduleError::Configuration(format!("invalid mutation weights: {}", e))
        })?;
        Ok(Self {
            types,
            distribution,
            max_retries: config.max_retries,
        })
    }

    pub fn propose_type(
        &self,
        mutation_type: MutationType,
        schedule: &Schedule,
        rng: &mut Random,
    ) -> Mutation {
        let num_rounds = schedule.num_rounds();
        let num_slots = schedule.num_slots();
        let num_teams = schedule.tournament().num_teams;

        match mutation_type {
            MutationType::SwapRounds => {
                let rounds = index::sample(rng, num_rounds, 2);
                Mutation::swap_rounds(rounds.index(0), rounds.index(1))
            }
            MutationType::SwapHomes => {
                // venues of bye meetings are irrelevant
                let teams = index::sample(rng, num_teams, 2);
                Mutation::swap_homes(teams.index(0), teams.index(1))
            }
            MutationType::PartialSwapTeams => {
                let teams = index::sample(rng, num_slots, 2);
                Mutation::partial_swap_teams(
                    teams.index(0),
                    teams.index(1),
                    rng.gen_range(0..num_rounds),
                )
            }
            MutationType::SwapTeams => {
                let teams = index::sample(rng, num_slots, 2);
                Mutation::swap_teams(teams.index(0), teams.index(1))
            }
            MutationType::InvertRound => Mutation::invert_round(rng.gen_range(0..num_rounds)),
        }
    }
}

impl MutationSource for MutationSampler {
    fn propose(&mut self, schedule: &Schedule, rng: &mut Random) -> Mutation {
        let mutation_type = self.types[self.distribution.sample(rng)];
        self.propose_type(mutation_type, schedule, rng)
    }

    fn max_retries(&self) -> usize {
        self.max_retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MutationWeights;
    use crate::construction::construct;
    use crate::schedule::validator::validate_schedule;
    use crate::utils::create_seeded_rng;

    /// Always proposes the same mutation.
    struct Fixed(Mutation, usize);

    impl MutationSource for Fixed {
        fn propose(&mut self, _schedule: &Schedule, _rng: &mut Random) -> Mutation {
            self.0.clone()
        }
        fn max_retries(&self) -> usize {
            self.1
        }
    }

    #[test]
    fn only_weighted_types_are_proposed() -> anyhow::Result<()> {
        let config = MutationConfig {
            weights: MutationWeights::only(MutationType::InvertRound),
            max_retries: 10,
        };
        let mut sampler = MutationSampler::new(&config)?;
        let schedule = construct(6)?;
        let mut rng = create_seeded_rng(0);
        for _ in 0..50 {
            assert_eq!(
                sampler.propose(&schedule, &mut rng).mutation_type(),
                MutationType::InvertRound
            );
        }
        Ok(())
    }

    #[test]
    fn sampled_neighbors_are_valid() -> anyhow::Result<()> {
        let mut sampler = MutationSampler::new(&MutationConfig::default())?;
        let mut rng = create_seeded_rng(2);
        let mut schedule = construct(8)?;
        for _ in 0..200 {
            let (_, neighbor) = sampler.sample_neighbor(&schedule, &mut rng)?;
            assert_eq!(validate_schedule(&neighbor), Ok(()));
            schedule = neighbor;
        }
        Ok(())
    }

    #[test]
    fn invalid_proposals_exhaust_the_retry_budget() -> anyhow::Result<()> {
        let schedule = construct(4)?;
        let mut source = Fixed(Mutation::swap_rounds(1, 1), 7);
        let result = source.sample_neighbor(&schedule, &mut create_seeded_rng(0));
        assert_eq!(result, Err(ScheduleError::MutationExhausted { attempts: 7 }));
        Ok(())
    }

    #[test]
    fn sampling_is_reproducible() -> anyhow::Result<()> {
        let schedule = construct(10)?;
        let mut a = MutationSampler::new(&MutationConfig::default())?;
        let mut b = a.clone();
        let mut rng_a = create_seeded_rng(9);
        let mut rng_b = create_seeded_rng(9);
        for _ in 0..20 {
            assert_eq!(a.propose(&schedule, &mut rng_a), b.propose(&schedule, &mut rng_b));
        }
        Ok(())
    }
}
