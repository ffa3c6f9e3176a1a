use std::fmt::{Display, Formatter};

use itertools::Itertools;

use crate::error::ScheduleError;
use crate::problem::{Game, TeamId, Tournament, Venue};

pub mod mutation;
pub mod validator;

pub type Round = Vec<Game>;

/// A double round-robin assignment: `rounds[r][t]` is the game team `t` plays in round `r`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schedule {
    tournament: Tournament,
    rounds: Vec<Round>,
}

impl Schedule {
    /// Wraps rounds that are structurally valid by construction.
    pub(crate) fn from_rounds_unchecked(tournament: Tournament, rounds: Vec<Round>) -> Self {
        let schedule = Self { tournament, rounds };
        #[cfg(feature = "move-asserts")]
        validator::assert_valid_schedule(&schedule);
        schedule
    }

    pub fn from_rounds(tournament: Tournament, rounds: Vec<Round>) -> Result<Self, ScheduleError> {
        validator::validate(&tournament, &rounds)
            .map_err(|violation| ScheduleError::Configuration(violation.to_string()))?;
        Ok(Self { tournament, rounds })
    }

    /// Parses a round x team matrix of signed opponents (`+` home, `-` away, one-based).
    pub fn from_signed_matrix(
        tournament: Tournament,
        matrix: &[Vec<i64>],
    ) -> Result<Self, ScheduleError> {
        let num_slots = tournament.num_slots() as u64;
        let rounds = matrix
            .iter()
            .enumerate()
            .map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .map(|(t, &value)| {
                        Game::from_signed(value)
                            .filter(|_| value.unsigned_abs() <= num_slots)
                            .ok_or_else(|| {
                                ScheduleError::Configuration(format!(
                                    "invalid entry {} for team {} in round {}",
                                    value,
                                    t + 1,
                                    r + 1
                                ))
                            })
                    })
                    .collect::<Result<Round, ScheduleError>>()
            })
            .collect::<Result<Vec<Round>, ScheduleError>>()?;
        Self::from_rounds(tournament, rounds)
    }

    pub fn to_signed_matrix(&self) -> Vec<Vec<i64>> {
        self.rounds
            .iter()
            .map(|round| round.iter().map(Game::to_signed).collect())
            .collect()
    }

    pub fn tournament(&self) -> &Tournament {
        &self.tournament
    }

    #[inline(always)]
    pub fn num_rounds(&self) -> usize {
        self.rounds.len()
    }

    #[inline(always)]
    pub fn num_slots(&self) -> usize {
        self.tournament.num_slots()
    }

    #[inline(always)]
    pub fn game(&self, round: usize, team: TeamId) -> Game {
        self.rounds[round][team]
    }

    pub fn round(&self, round: usize) -> &[Game] {
        &self.rounds[round]
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub(crate) fn rounds_mut(&mut self) -> &mut Vec<Round> {
        &mut self.rounds
    }

    /// Games of `team` in round order.
    pub fn team_sequence(&self, team: TeamId) -> impl Iterator<Item = Game> + '_ {
        self.rounds.iter().map(move |round| round[team])
    }

    /// Rounds in which `a` and `b` meet, each with `a`'s venue.
    pub fn meetings(&self, a: TeamId, b: TeamId) -> impl Iterator<Item = (usize, Venue)> + '_ {
        self.rounds
            .iter()
            .enumerate()
            .filter_map(move |(r, round)| {
                let game = round[a];
                if game.opponent == b {
                    Some((r, game.venue))
                } else {
                    None
                }
            })
    }

    /// Home teams of a round, in ascending order.
    pub fn home_teams(&self, round: usize) -> impl Iterator<Item = TeamId> + '_ {
        self.rounds[round]
            .iter()
            .enumerate()
            .filter(|(_, game)| game.venue.is_home())
            .map(|(team, _)| team)
    }

    /// Writes a meeting into both teams' entries of `round`.
    #[inline(always)]
    pub(crate) fn set_meeting(&mut self, round: usize, home: TeamId, away: TeamId) {
        self.rounds[round][home] = Game::home(away);
        self.rounds[round][away] = Game::away(home);
    }
}

impl Display for Schedule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for round in self.rounds.iter() {
            writeln!(f, "{}", round.iter().map(|game| game.to_signed()).join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construction::construct;

    fn four_team_matrix() -> Vec<Vec<i64>> {
        // 0-1, 2-3 | 0-2, 1-3 | 0-3, 1-2 mirrored
        vec![
            vec![2, -1, 4, -3],
            vec![3, 4, -1, -2],
            vec![-4, 3, -2, 1],
            vec![-2, 1, -4, 3],
            vec![-3, -4, 1, 2],
            vec![4, -3, 2, -1],
        ]
    }

    #[test]
    fn signed_matrix_round_trip() -> anyhow::Result<()> {
        let tournament = Tournament::with_even_teams(4)?;
        let schedule = Schedule::from_signed_matrix(tournament, &four_team_matrix())?;
        assert_eq!(schedule.to_signed_matrix(), four_team_matrix());
        assert_eq!(schedule.num_rounds(), 6);
        assert_eq!(schedule.game(1, 2), Game::away(0));
        Ok(())
    }

    #[test]
    fn malformed_matrix_is_a_configuration_error() -> anyhow::Result<()> {
        let tournament = Tournament::with_even_teams(4)?;
        let mut matrix = four_team_matrix();
        matrix[0][0] = 9;
        assert!(matches!(
            Schedule::from_signed_matrix(tournament.clone(), &matrix),
            Err(ScheduleError::Configuration(_))
        ));

        let mut matrix = four_team_matrix();
        matrix.pop();
        assert!(matches!(
            Schedule::from_signed_matrix(tournament, &matrix),
            Err(ScheduleError::Configuration(_))
        ));
        Ok(())
    }

    #[test]
    fn meetings_are_reported_once_per_venue() -> anyhow::Result<()> {
        let schedule = construct(6)?;
        for a in 0..6 {
            for b in 0..6 {
                if a == b {
                    continue;
                }
                let meetings = schedule.meetings(a, b).collect::<Vec<_>>();
                assert_eq!(meetings.len(), 2);
                assert_ne!(meetings[0].1, meetings[1].1);
            }
        }
        Ok(())
    }

    #[test]
    fn home_teams_cover_half_of_each_round() -> anyhow::Result<()> {
        let schedule = construct(8)?;
        for r in 0..schedule.num_rounds() {
            assert_eq!(schedule.home_teams(r).count(), 4);
        }
        Ok(())
    }

    #[test]
    fn clone_is_independent() -> anyhow::Result<()> {
        let schedule = construct(4)?;
        let mut copy = schedule.clone();
        copy.rounds_mut().swap(0, 1);
        assert_ne!(schedule, copy);
        assert_eq!(schedule, construct(4)?);
        Ok(())
    }

    #[test]
    fn display_prints_one_round_per_line() -> anyhow::Result<()> {
        let tournament = Tournament::with_even_teams(4)?;
        let schedule = Schedule::from_signed_matrix(tournament, &four_team_matrix())?;
        let rendered = schedule.to_string();
        assert_eq!(rendered.lines().count(), 6);
        assert_eq!(rendered.lines().next(), Some("2 -1 4 -3"));
        Ok(())
    }
}
