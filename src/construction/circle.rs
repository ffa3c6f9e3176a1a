use rand::seq::SliceRandom;

use crate::problem::{Game, TeamId, Tournament};
use crate::schedule::{Round, Schedule};
use crate::utils::Random;

/// Circle-method double round-robin: the last slot stays fixed while the others rotate,
/// the second half mirrors the first with venues flipped.
pub struct CircleMethod<'a> {
    pub tournament: &'a Tournament,
}

impl<'a> CircleMethod<'a> {
    pub fn new(tournament: &'a Tournament) -> Self {
        Self { tournament }
    }

    pub fn construct(&self) -> Schedule {
        let num_slots = self.tournament.num_slots();
        let half = self.tournament.rounds_per_half();

        let mut rounds: Vec<Round> = Vec::with_capacity(self.tournament.num_rounds());
        for r in 0..half {
            let mut round = vec![Game::home(0); num_slots];
            for (home, away) in self.pairings(r) {
                round[home] = Game::home(away);
                round[away] = Game::away(home);
            }
            rounds.push(round);
        }
        for r in 0..half {
            let mirrored = rounds[r]
                .iter()
                .map(|game| Game {
                    opponent: game.opponent,
                    venue: game.venue.flipped(),
                })
                .collect();
            rounds.push(mirrored);
        }

        Schedule::from_rounds_unchecked(self.tournament.clone(), rounds)
    }

    /// Circle method with shuffled team labels and round order.
    pub fn construct_randomized(&self, rng: &mut Random) -> Schedule {
        let canonical = self.construct();

        let mut labels: Vec<TeamId> = self.tournament.iter_slots().collect();
        labels.shuffle(rng);
        let mut order: Vec<usize> = (0..canonical.num_rounds()).collect();
        order.shuffle(rng);

        let rounds = order
            .iter()
            .map(|&r| {
                let source = canonical.round(r);
                let mut round = vec![Game::home(0); labels.len()];
                for (team, game) in source.iter().enumerate() {
                    round[labels[team]] = Game {
                        opponent: labels[game.opponent],
                        venue: game.venue,
                    };
                }
                round
            })
            .collect();

        Schedule::from_rounds_unchecked(self.tournament.clone(), rounds)
    }

    /// `(home, away)` pairs of first-half round `r`.
    fn pairings(&self, r: usize) -> impl Iterator<Item = (TeamId, TeamId)> {
        let num_slots = self.tournament.num_slots();
        let fixed = num_slots - 1;
        let modulus = num_slots - 1;

        // alternate the fixed team's venue to keep its home/away sequence balanced
        let first = if r % 2 == 0 { (r, fixed) } else { (fixed, r) };

        let rotating = (1..num_slots / 2).map(move |k| {
            let a = (r + k) % modulus;
            let b = (r + modulus - k) % modulus;
            if k % 2 == 1 {
                (a, b)
            } else {
                (b, a)
            }
        });

        std::iter::once(first).chain(rotating)
    }
}
