use fixedbitset::FixedBitSet;

use crate::problem::{TeamId, Tournament};
use crate::schedule::{Round, Schedule};

/// Breach of a structural double round-robin invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuralViolation {
    #[error("expected {expected_rounds} rounds of {expected_slots} teams, found {found_rounds} rounds (round {round} has {found_slots} teams)")]
    Dimensions {
        expected_rounds: usize,
        expected_slots: usize,
        found_rounds: usize,
        round: usize,
        found_slots: usize,
    },
    #[error("team {team} plays itself in round {round}")]
    SelfPlay { round: usize, team: TeamId },
    #[error("team {team} has an opponent out of range in round {round}")]
    UnknownOpponent { round: usize, team: TeamId },
    #[error("pairing of team {team} in round {round} is not mirrored by its opponent")]
    InconsistentPairing { round: usize, team: TeamId },
    #[error("team {home} hosts team {away} more than once")]
    DuplicateMeeting { home: TeamId, away: TeamId },
    #[error("team {home} never hosts team {away}")]
    MissingMeeting { home: TeamId, away: TeamId },
}

pub fn validate(tournament: &Tournament, rounds: &[Round]) -> Result<(), StructuralViolation> {
    use StructuralViolation::*;

    let num_slots = tournament.num_slots();
    let num_rounds = tournament.num_rounds();

    if rounds.len() != num_rounds {
        return Err(Dimensions {
            expected_rounds: num_rounds,
            expected_slots: num_slots,
            found_rounds: rounds.len(),
            round: 0,
            found_slots: rounds.first().map_or(0, |round| round.len()),
        });
    }

    // bit `home * num_slots + away` is set once `home` hosted `away`
    let mut hosted = FixedBitSet::with_capacity(num_slots * num_slots);

    for (r, round) in rounds.iter().enumerate() {
        if round.len() != num_slots {
            return Err(Dimensions {
                expected_rounds: num_rounds,
                expected_slots: num_slots,
                found_rounds: rounds.len(),
                round: r,
                found_slots: round.len(),
            });
        }
        // every entry of the round has to be sane before pairings can be compared
        for (team, game) in round.iter().enumerate() {
            if game.opponent == team {
                return Err(SelfPlay { round: r, team });
            }
            if game.opponent >= num_slots {
                return Err(UnknownOpponent { round: r, team });
            }
        }
        for (team, game) in round.iter().enumerate() {
            if round[game.opponent] != game.mirrored(team) {
                return Err(InconsistentPairing { round: r, team });
            }
            if game.venue.is_home() {
                let bit = team * num_slots + game.opponent;
                if hosted.put(bit) {
                    return Err(DuplicateMeeting {
                        home: team,
                        away: game.opponent,
                    });
                }
            }
        }
    }

    for home in 0..num_slots {
        for away in (0..num_slots).filter(|&away| away != home) {
            if !hosted.contains(home * num_slots + away) {
                return Err(MissingMeeting { home, away });
            }
        }
    }

    Ok(())
}

pub fn validate_schedule(schedule: &Schedule) -> Result<(), StructuralViolation> {
    validate(schedule.tournament(), schedule.rounds())
}

pub fn assert_valid_schedule(schedule: &Schedule) {
    if let Err(violation) = validate_schedule(schedule) {
        panic!("structurally invalid schedule: {}\n{}", violation, schedule)
    }
}
