use crate::error::ScheduleError;
use crate::problem::{Game, TeamId, Venue};
use crate::schedule::mutation::{
    InvertRoundMutation, Mutation, PartialSwapTeamsMutation, SwapHomesMutation,
    SwapRoundsMutation, SwapTeamsMutation,
};
use crate::schedule::validator::validate_schedule;
use crate::schedule::Schedule;

fn invalid<T>(reason: String) -> Result<T, ScheduleError> {
    Err(ScheduleError::InvalidMutation(reason))
}

impl Schedule {
    /// Applies `mutation` to a copy of this schedule. The receiver is never modified; a
    /// structurally invalid outcome is reported as `InvalidMutation`.
    pub fn apply(&self, mutation: &Mutation) -> Result<Schedule, ScheduleError> {
        let schedule = match mutation {
            Mutation::SwapRounds(mv) => self.apply_swap_rounds(mv),
            Mutation::SwapHomes(mv) => self.apply_swap_homes(mv),
            Mutation::PartialSwapTeams(mv) => self.apply_partial_swap_teams(mv),
            Mutation::SwapTeams(mv) => self.apply_swap_teams(mv),
            Mutation::InvertRound(mv) => self.apply_invert_round(mv),
        }?;

        #[cfg(feature = "move-asserts")]
        crate::schedule::validator::assert_valid_schedule(&schedule);

        Ok(schedule)
    }

    fn check_round(&self, round: usize) -> Result<(), ScheduleError> {
        if round >= self.num_rounds() {
            return invalid(format!(
                "round {} out of range ({} rounds)",
                round,
                self.num_rounds()
            ));
        }
        Ok(())
    }

    fn check_distinct_teams(&self, team1: TeamId, team2: TeamId) -> Result<(), ScheduleError> {
        let num_slots = self.num_slots();
        if team1 >= num_slots || team2 >= num_slots {
            return invalid(format!(
                "teams {} and {} out of range ({} teams)",
                team1, team2, num_slots
            ));
        }
        if team1 == team2 {
            return invalid(format!("team {} paired with itself", team1));
        }
        Ok(())
    }

    fn apply_swap_rounds(&self, mv: &SwapRoundsMutation) -> Result<Schedule, ScheduleError> {
        self.check_round(mv.round1)?;
        self.check_round(mv.round2)?;
        if mv.round1 == mv.round2 {
            return invalid(format!("round {} swapped with itself", mv.round1));
        }

        let mut schedule = self.clone();
        schedule.rounds_mut().swap(mv.round1, mv.round2);
        Ok(schedule)
    }

    fn apply_swap_homes(&self, mv: &SwapHomesMutation) -> Result<Schedule, ScheduleError> {
        self.check_distinct_teams(mv.team1, mv.team2)?;

        let mut schedule = self.clone();
        schedule.flip_pair(mv.team1, mv.team2);
        Ok(schedule)
    }

    fn apply_invert_round(&self, mv: &InvertRoundMutation) -> Result<Schedule, ScheduleError> {
        self.check_round(mv.round)?;

        let pairs = self
            .home_teams(mv.round)
            .map(|home| (home, self.game(mv.round, home).opponent))
            .collect::<Vec<_>>();

        let mut schedule = self.clone();
        for (home, away) in pairs {
            schedule.flip_pair(home, away);
        }
        Ok(schedule)
    }

    fn apply_swap_teams(&self, mv: &SwapTeamsMutation) -> Result<Schedule, ScheduleError> {
        self.check_distinct_teams(mv.team1, mv.team2)?;

        let mut schedule = self.clone();
        for round in 0..self.num_rounds() {
            schedule.exchange_games(round, mv.team1, mv.team2);
        }
        Ok(schedule)
    }

    fn apply_partial_swap_teams(
        &self,
        mv: &PartialSwapTeamsMutation,
    ) -> Result<Schedule, ScheduleError> {
        let PartialSwapTeamsMutation {
            team1,
            team2,
            round,
        } = *mv;
        self.check_distinct_teams(team1, team2)?;
        self.check_round(round)?;
        if self.game(round, team1).opponent == team2 {
            return invalid(format!(
                "teams {} and {} meet each other in round {}",
                team1, team2, round
            ));
        }

        // team1 takes over team2's game of the current round; that game already appears
        // in another round of team1, which therefore has to be exchanged as well
        let mut chain = vec![round];
        let mut current = round;
        loop {
            let received = self.game(current, team2);
            let next = match (0..self.num_rounds()).find(|&r| self.game(r, team1) == received) {
                Some(next) => next,
                None => {
                    return invalid(format!(
                        "team {} has no game {} to exchange",
                        team1, received
                    ))
                }
            };
            if next == round {
                break;
            }
            if chain.contains(&next) || self.game(next, team1).opponent == team2 {
                return invalid(format!(
                    "repair chain of teams {} and {} does not close",
                    team1, team2
                ));
            }
            chain.push(next);
            current = next;
        }

        let mut schedule = self.clone();
        for &r in chain.iter() {
            schedule.exchange_games(r, team1, team2);
        }

        if let Err(violation) = validate_schedule(&schedule) {
            return invalid(format!(
                "partial swap of teams {} and {} in round {}: {}",
                team1, team2, round, violation
            ));
        }
        Ok(schedule)
    }

    /// Flips the venues of both meetings of `a` and `b`.
    fn flip_pair(&mut self, a: TeamId, b: TeamId) {
        let meetings = self.meetings(a, b).collect::<Vec<_>>();
        for (round, venue) in meetings {
            match venue {
                Venue::Home => self.set_meeting(round, b, a),
                Venue::Away => self.set_meeting(round, a, b),
            }
        }
    }

    /// `team1` and `team2` trade their games in `round`; their opponents follow. If the two
    /// teams meet each other, only the venue changes hands.
    fn exchange_games(&mut self, round: usize, team1: TeamId, team2: TeamId) {
        let game1 = self.game(round, team1);
        let game2 = self.game(round, team2);

        if game1.opponent == team2 {
            let games = &mut self.rounds_mut()[round];
            games[team1] = Game {
                opponent: team2,
                venue: game1.venue.flipped(),
            };
            games[team2] = Game {
                opponent: team1,
                venue: game2.venue.flipped(),
            };
            return;
        }

        let games = &mut self.rounds_mut()[round];
        games[team1] = game2;
        games[team2] = game1;
        games[game2.opponent] = game2.mirrored(team1);
        games[game1.opponent] = game1.mirrored(team2);
    }
}
