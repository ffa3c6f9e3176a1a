use clap::ValueEnum;
use log::info;
use serde::{Deserialize, Serialize};
use took::Timer;

use crate::error::ScheduleError;
use crate::problem::Tournament;
use crate::schedule::Schedule;
use crate::utils::Random;

pub mod circle;

pub use circle::CircleMethod;

#[allow(non_camel_case_types)]
#[derive(Clone, Copy, ValueEnum, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitialScheduleGeneration {
    #[serde(rename = "circle")]
    CIRCLE,
    #[serde(rename = "randomized-circle")]
    RANDOMIZED_CIRCLE,
}

/// Canonical circle-method schedule for an even number of teams.
pub fn construct(num_teams: usize) -> Result<Schedule, ScheduleError> {
    let tournament = Tournament::with_even_teams(num_teams)?;
    Ok(CircleMethod::new(&tournament).construct())
}

pub fn construct_randomized(tournament: &Tournament, rng: &mut Random) -> Schedule {
    CircleMethod::new(tournament).construct_randomized(rng)
}

pub fn construct_with(
    tournament: &Tournament,
    rng: &mut Random,
    mode: InitialScheduleGeneration,
) -> Schedule {
    use InitialScheduleGeneration::*;
    let timer = Timer::new();

    let (name, schedule) = match mode {
        CIRCLE => ("CircleMethod", CircleMethod::new(tournament).construct()),
        RANDOMIZED_CIRCLE => (
            "RandomizedCircleMethod",
            construct_randomized(tournament, rng),
        ),
    };

    info!(
        "{} - {} teams, {} rounds, took: {}",
        name,
        tournament.num_teams,
        schedule.num_rounds(),
        timer.took()
    );

    schedule
}
