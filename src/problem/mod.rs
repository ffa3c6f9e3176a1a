use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

pub type TeamId = usize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    Home,
    Away,
}

impl Venue {
    pub fn flipped(self) -> Self {
        match self {
            Self::Home => Self::Away,
            Self::Away => Self::Home,
        }
    }
    pub fn is_home(&self) -> bool {
        match self {
            Self::Home => true,
            _ => false,
        }
    }
    pub fn is_away(&self) -> bool {
        !self.is_home()
    }
}

/// A single meeting as seen from one team.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Game {
    pub opponent: TeamId,
    pub venue: Venue,
}

impl Game {
    pub fn home(opponent: TeamId) -> Self {
        Self {
            opponent,
            venue: Venue::Home,
        }
    }

    pub fn away(opponent: TeamId) -> Self {
        Self {
            opponent,
            venue: Venue::Away,
        }
    }

    /// The same meeting seen from the opponent's side.
    pub fn mirrored(&self, team: TeamId) -> Self {
        Self {
            opponent: team,
            venue: self.venue.flipped(),
        }
    }

    /// `+(opponent + 1)` when playing at home, `-(opponent + 1)` when away.
    pub fn to_signed(&self) -> i64 {
        let value = self.opponent as i64 + 1;
        match self.venue {
            Venue::Home => value,
            Venue::Away => -value,
        }
    }

    pub fn from_signed(value: i64) -> Option<Self> {
        if value == 0 {
            return None;
        }
        let opponent = (value.unsigned_abs() - 1) as TeamId;
        Some(if value > 0 {
            Game::home(opponent)
        } else {
            Game::away(opponent)
        })
    }
}

impl Display for Game {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_signed())
    }
}

/// Size of a double round-robin league, including the virtual bye team for odd team counts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tournament {
    pub num_teams: usize,
    bye: Option<TeamId>,
}

impl Tournament {
    pub fn new(num_teams: usize, allow_bye: bool) -> Result<Self, ScheduleError> {
        if num_teams < 2 {
            return Err(ScheduleError::Configuration(format!(
                "a tournament needs at least two teams (got {})",
                num_teams
            )));
        }
        let bye = if num_teams % 2 == 1 {
            if !allow_bye {
                return Err(ScheduleError::Configuration(format!(
                    "odd number of teams ({}) requires bye handling",
                    num_teams
                )));
            }
            Some(num_teams)
        } else {
            None
        };
        Ok(Self { num_teams, bye })
    }

    pub fn with_even_teams(num_teams: usize) -> Result<Self, ScheduleError> {
        Self::new(num_teams, false)
    }

    /// Number of scheduled slots per round; always even.
    #[inline(always)]
    pub fn num_slots(&self) -> usize {
        self.num_teams + self.bye.map_or(0, |_| 1)
    }

    #[inline(always)]
    pub fn num_rounds(&self) -> usize {
        2 * (self.num_slots() - 1)
    }

    #[inline(always)]
    pub fn rounds_per_half(&self) -> usize {
        self.num_slots() - 1
    }

    pub fn bye_team(&self) -> Option<TeamId> {
        self.bye
    }

    #[inline(always)]
    pub fn is_bye(&self, team: TeamId) -> bool {
        self.bye == Some(team)
    }

    pub fn iter_teams(&self) -> impl Iterator<Item = TeamId> {
        0..self.num_teams
    }

    pub fn iter_slots(&self) -> impl Iterator<Item = TeamId> {
        0..self.num_slots()
    }
}
