use clap::Parser;

use crate::config::{CoolingSchedule, MutationWeights, SearchConfig};
use crate::construction::InitialScheduleGeneration;
use crate::solver::{Budget, Strategy};

#[derive(Parser, Debug)]
#[command(version)]
pub struct ProgramArguments {
    #[arg(long, help = "rng seed (of the first run)")]
    pub seed: Option<i128>,

    #[arg(short, long, help = "number of teams")]
    pub teams: usize,

    #[arg(long, help = "schedule odd team counts with a bye", default_value = "false")]
    pub allow_bye: bool,

    #[arg(short, long, help = "schedule file (csv) to repair instead of a constructed one")]
    pub input: Option<String>,

    #[arg(short, long, help = "solution file path")]
    pub solution: Option<String>,

    #[arg(
        long,
        help = "directory to store the solutions",
        conflicts_with = "solution"
    )]
    pub solution_directory: Option<String>,

    #[arg(long, help = "write a json summary of all runs")]
    pub summary_json: Option<String>,

    #[arg(long, help = "number of runs with consecutive seeds", default_value = "1")]
    pub runs: usize,

    #[command(flatten)]
    pub solver: SolverArguments,

    #[arg(long, help = "print summary to stdout", default_value = "false")]
    pub print_summary_to_stdout: bool,
}

#[derive(Parser, Debug)]
pub struct SolverArguments {
    #[arg(long = "strategy", value_enum, default_value = "simulated-annealing")]
    pub variant: Strategy,
    #[arg(long, default_value = "100000")]
    pub max_iterations: usize,
    #[arg(long)]
    pub time_limit_in_seconds: Option<f64>,
    #[arg(long, default_value = "randomized-circle")]
    pub init: InitialScheduleGeneration,

    #[arg(long, help = "search configuration (toml); the options below override it")]
    pub config: Option<String>,

    #[arg(long)]
    pub max_streak: Option<usize>,

    #[arg(long)]
    pub initial_temperature: Option<f64>,
    #[arg(long)]
    pub cooling_rate: Option<f64>,
    #[arg(long)]
    pub cooling: Option<CoolingSchedule>,
    #[arg(long)]
    pub min_temperature: Option<f64>,

    #[arg(long)]
    pub population_size: Option<usize>,
    #[arg(long)]
    pub max_offspring_per_runner: Option<usize>,
    #[arg(long)]
    pub selection_size: Option<usize>,
    #[arg(long)]
    pub max_mutations_per_offspring: Option<usize>,

    #[arg(
        long,
        value_delimiter = ' ',
        num_args = 5..=5,
        help = "weights of swap-rounds, swap-homes, partial-swap-teams, swap-teams, invert-round"
    )]
    pub mutation_weights: Option<Vec<u32>>,
    #[arg(long)]
    pub max_retries: Option<usize>,
}

impl ProgramArguments {
    pub fn search_config(&self) -> anyhow::Result<SearchConfig> {
        let mut config = match &self.solver.config {
            Some(path) => SearchConfig::load(path)?,
            None => SearchConfig::default(),
        };
        config.allow_bye |= self.allow_bye;
        self.solver.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }
}

impl SolverArguments {
    pub fn budget(&self) -> Budget {
        Budget {
            max_iterations: self.max_iterations,
            max_seconds: self.time_limit_in_seconds,
        }
    }

    fn apply_overrides(&self, config: &mut SearchConfig) {
        if let Some(value) = self.max_streak {
            config.max_streak = value;
        }

        let annealing = &mut config.annealing;
        if let Some(value) = self.initial_temperature {
            annealing.initial_temperature = value;
        }
        if let Some(value) = self.cooling_rate {
            annealing.cooling_rate = value;
        }
        if let Some(value) = self.cooling {
            annealing.cooling = value;
        }
        if let Some(value) = self.min_temperature {
            annealing.min_temperature = value;
        }

        let ppa = &mut config.plant_propagation;
        if let Some(value) = self.population_size {
            ppa.population_size = value;
        }
        if let Some(value) = self.max_offspring_per_runner {
            ppa.max_offspring_per_runner = value;
        }
        if let Some(value) = self.selection_size {
            ppa.selection_size = value;
        }
        if let Some(value) = self.max_mutations_per_offspring {
            ppa.max_mutations_per_offspring = value;
        }

        if let Some(ref weights) = self.mutation_weights {
            config.mutation.weights = MutationWeights {
                swap_rounds: weights[0],
                swap_homes: weights[1],
                partial_swap_teams: weights[2],
                swap_teams: weights[3],
                invert_round: weights[4],
            };
        }
        if let Some(value) = self.max_retries {
            config.mutation.max_retries = value;
        }
    }
}
