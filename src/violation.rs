use serde::Serialize;

use crate::problem::{Game, TeamId, Venue};
use crate::schedule::Schedule;

pub const DEFAULT_MAX_STREAK: usize = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TeamViolations {
    pub no_repeat: usize,
    pub streak: usize,
}

impl TeamViolations {
    pub fn total(&self) -> usize {
        self.no_repeat + self.streak
    }
}

/// Constraint breaches of a schedule, summed over all real teams.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ViolationReport {
    pub no_repeat: usize,
    pub streak: usize,
    /// Indexed by team; the virtual bye team is not listed.
    pub per_team: Vec<usize>,
}

impl ViolationReport {
    pub fn total(&self) -> usize {
        self.no_repeat + self.streak
    }

    pub fn is_valid(&self) -> bool {
        self.total() == 0
    }

    pub fn team(&self, team: TeamId) -> usize {
        self.per_team[team]
    }
}

/// Counts no-repeat and streak violations over every real team of `schedule`.
pub fn evaluate(schedule: &Schedule, max_streak: usize) -> ViolationReport {
    let tournament = schedule.tournament();
    let mut report = ViolationReport {
        no_repeat: 0,
        streak: 0,
        per_team: Vec::with_capacity(tournament.num_teams),
    };

    for team in tournament.iter_teams() {
        let violations = scan(schedule.team_sequence(team), max_streak, |opponent| {
            tournament.is_bye(opponent)
        });
        report.no_repeat += violations.no_repeat;
        report.streak += violations.streak;
        report.per_team.push(violations.total());
    }

    report
}

/// Scans a single team's games in round order.
pub fn evaluate_team_sequence(games: &[Game], max_streak: usize) -> TeamViolations {
    scan(games.iter().copied(), max_streak, |_| false)
}

fn scan<I, F>(games: I, max_streak: usize, is_bye: F) -> TeamViolations
where
    I: Iterator<Item = Game>,
    F: Fn(TeamId) -> bool,
{
    let mut violations = TeamViolations::default();
    let mut previous_opponent: Option<TeamId> = None;
    let mut home_streak = 0;
    let mut away_streak = 0;

    for game in games {
        if is_bye(game.opponent) {
            // a bye is not a game: it ends both streaks and the adjacency
            previous_opponent = None;
            home_streak = 0;
            away_streak = 0;
            continue;
        }

        if previous_opponent == Some(game.opponent) {
            violations.no_repeat += 1;
        }
        previous_opponent = Some(game.opponent);

        match game.venue {
            Venue::Home => {
                home_streak += 1;
                away_streak = 0;
            }
            Venue::Away => {
                away_streak += 1;
                home_streak = 0;
            }
        }

        if home_streak > max_streak || away_streak > max_streak {
            violations.streak += 1;
        }
    }

    violations
}
