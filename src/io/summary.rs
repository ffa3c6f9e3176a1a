use std::fs::File;
use std::io::{BufWriter, Write};

use serde::Serialize;

use crate::schedule::mutation::MutationTypeStats;
use crate::solver::{Outcome, SolverResult, Strategy};

/// One line of the run report.
#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    pub seed: i128,
    pub strategy: Strategy,
    pub num_teams: usize,
    pub initial_violations: usize,
    pub final_violations: usize,
    pub no_repeat: usize,
    pub streak: usize,
    pub outcome: Outcome,
    pub iterations: usize,
    pub seconds: f64,
    pub mutations: Vec<MutationTypeStats>,
}

impl RunSummary {
    pub fn new(seed: i128, initial_violations: usize, result: &SolverResult) -> Self {
        Self {
            seed,
            strategy: result.strategy,
            num_teams: result.final_schedule.tournament().num_teams,
            initial_violations,
            final_violations: result.final_violations,
            no_repeat: result.report.no_repeat,
            streak: result.report.streak,
            outcome: result.outcome,
            iterations: result.iterations,
            seconds: result.time.as_std().as_secs_f64(),
            mutations: result.mutation_stats.summary(),
        }
    }

    /// `final,no_repeat,streak,iterations,seconds`
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{},{},{},{:.3}",
            self.final_violations, self.no_repeat, self.streak, self.iterations, self.seconds
        )
    }
}

pub fn write_summary_json(path: impl Into<String>, runs: &[RunSummary]) -> anyhow::Result<()> {
    let f = File::create(path.into())?;
    let mut file = BufWriter::new(&f);
    serde_json::to_writer_pretty(&mut file, runs)?;
    writeln!(file)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use crate::construction::construct;
    use crate::solver::{run, Budget};

    #[test]
    fn summary_serializes_to_json() -> anyhow::Result<()> {
        let result = run(
            Strategy::SIMULATED_ANNEALING,
            construct(4)?,
            &SearchConfig::default(),
            0,
            Budget::iterations(10),
        )?;
        let summary = RunSummary::new(0, 0, &result);
        let json = serde_json::to_value(&summary)?;
        assert_eq!(json["strategy"], "simulated-annealing");
        assert_eq!(json["outcome"], "Converged");
        assert_eq!(json["num_teams"], 4);
        assert_eq!(json["mutations"].as_array().map(|it| it.len()), Some(5));
        assert!(summary.to_csv_line().starts_with("0,0,0,0,"));
        Ok(())
    }
}
