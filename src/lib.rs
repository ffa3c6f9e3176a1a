pub mod cli;
pub mod config;
pub mod construction;
pub mod error;
pub mod io;
pub mod problem;
pub mod schedule;
pub mod solver;
pub mod utils;
pub mod violation;

pub use config::SearchConfig;
pub use construction::construct;
pub use error::ScheduleError;
pub use schedule::Schedule;
pub use solver::{run, Budget, Outcome, SolverResult, Strategy};
pub use violation::{evaluate, ViolationReport};
