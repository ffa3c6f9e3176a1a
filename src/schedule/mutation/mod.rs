use std::fmt::{Display, Formatter};

use enum_map::{Enum, EnumMap};
use serde::{Deserialize, Serialize};

use crate::problem::TeamId;

mod apply;
pub mod sampler;

pub use sampler::{MutationSampler, MutationSource};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Enum, Serialize, Deserialize)]
pub enum MutationType {
    SwapRounds,
    SwapHomes,
    PartialSwapTeams,
    SwapTeams,
    InvertRound,
}

impl MutationType {
    pub const ALL: [MutationType; 5] = [
        MutationType::SwapRounds,
        MutationType::SwapHomes,
        MutationType::PartialSwapTeams,
        MutationType::SwapTeams,
        MutationType::InvertRound,
    ];
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    SwapRounds(SwapRoundsMutation),
    SwapHomes(SwapHomesMutation),
    PartialSwapTeams(PartialSwapTeamsMutation),
    SwapTeams(SwapTeamsMutation),
    InvertRound(InvertRoundMutation),
}

impl From<&Mutation> for MutationType {
    fn from(mv: &Mutation) -> Self {
        match mv {
            Mutation::SwapRounds(_) => MutationType::SwapRounds,
            Mutation::SwapHomes(_) => MutationType::SwapHomes,
            Mutation::PartialSwapTeams(_) => MutationType::PartialSwapTeams,
            Mutation::SwapTeams(_) => MutationType::SwapTeams,
            Mutation::InvertRound(_) => MutationType::InvertRound,
        }
    }
}

/// Exchanges two complete rounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapRoundsMutation {
    pub round1: usize,
    pub round2: usize,
}

/// Flips the venues of both meetings of a pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapHomesMutation {
    pub team1: TeamId,
    pub team2: TeamId,
}

/// Exchanges the games of two teams in one round, then in every round the repair chain
/// reaches, until both teams again meet every opponent once at home and once away.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartialSwapTeamsMutation {
    pub team1: TeamId,
    pub team2: TeamId,
    pub round: usize,
}

/// Exchanges the complete schedules of two teams.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapTeamsMutation {
    pub team1: TeamId,
    pub team2: TeamId,
}

/// Flips both meetings of every pair that meets in the round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvertRoundMutation {
    pub round: usize,
}

impl Mutation {
    pub fn swap_rounds(round1: usize, round2: usize) -> Self {
        Self::SwapRounds(SwapRoundsMutation { round1, round2 })
    }
    pub fn swap_homes(team1: TeamId, team2: TeamId) -> Self {
        Self::SwapHomes(SwapHomesMutation { team1, team2 })
    }
    pub fn partial_swap_teams(team1: TeamId, team2: TeamId, round: usize) -> Self {
        Self::PartialSwapTeams(PartialSwapTeamsMutation {
            team1,
            team2,
            round,
        })
    }
    pub fn swap_teams(team1: TeamId, team2: TeamId) -> Self {
        Self::SwapTeams(SwapTeamsMutation { team1, team2 })
    }
    pub fn invert_round(round: usize) -> Self {
        Self::InvertRound(InvertRoundMutation { round })
    }

    pub fn mutation_type(&self) -> MutationType {
        MutationType::from(self)
    }
}

impl Display for Mutation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Mutation::SwapRounds(mv) => write!(f, "swap rounds {} and {}", mv.round1, mv.round2),
            Mutation::SwapHomes(mv) => {
                write!(f, "swap homes of teams {} and {}", mv.team1, mv.team2)
            }
            Mutation::PartialSwapTeams(mv) => write!(
                f,
                "partially swap teams {} and {} starting in round {}",
                mv.team1, mv.team2, mv.round
            ),
            Mutation::SwapTeams(mv) => write!(f, "swap teams {} and {}", mv.team1, mv.team2),
            Mutation::InvertRound(mv) => write!(f, "invert round {}", mv.round),
        }
    }
}

/// Proposed and accepted mutations per type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MutationStats {
    proposed: EnumMap<MutationType, usize>,
    accepted: EnumMap<MutationType, usize>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MutationTypeStats {
    pub mutation_type: MutationType,
    pub proposed: usize,
    pub accepted: usize,
}

impl MutationStats {
    pub fn record_proposed(&mut self, mutation_type: MutationType) {
        self.proposed[mutation_type] += 1;
    }

    pub fn record_accepted(&mut self, mutation_type: MutationType) {
        self.accepted[mutation_type] += 1;
    }

    pub fn proposed(&self, mutation_type: MutationType) -> usize {
        self.proposed[mutation_type]
    }

    pub fn accepted(&self, mutation_type: MutationType) -> usize {
        self.accepted[mutation_type]
    }

    pub fn total_proposed(&self) -> usize {
        self.proposed.values().sum()
    }

    pub fn total_accepted(&self) -> usize {
        self.accepted.values().sum()
    }

    pub fn summary(&self) -> Vec<MutationTypeStats> {
        MutationType::ALL
            .iter()
            .map(|&mutation_type| MutationTypeStats {
                mutation_type,
                proposed: self.proposed[mutation_type],
                accepted: self.accepted[mutation_type],
            })
            .collect()
    }
}
