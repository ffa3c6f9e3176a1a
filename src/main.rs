use anyhow::bail;
use clap::{CommandFactory, FromArgMatches};
use log::info;
use os_str_bytes::OsStrBytesExt;
use rand::random;
use took::Timer;

use ttp_repair::cli::ProgramArguments;
use ttp_repair::construction::construct_with;
use ttp_repair::io::{load_schedule, write_schedule, write_summary_json, RunSummary};
use ttp_repair::problem::Tournament;
use ttp_repair::schedule::mutation::MutationSampler;
use ttp_repair::solver::{run_with, SolverResult};
use ttp_repair::utils::logging::format_log_report;
use ttp_repair::utils::{create_seeded_rng, DefaultSearchTracker};
use ttp_repair::violation::evaluate;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = argfile::expand_args_from(
        std::env::args_os(),
        argfile::parse_fromfile,
        argfile::PREFIX,
    )?;
    let args = ProgramArguments::from_arg_matches(
        &ProgramArguments::command().get_matches_from(
            args.iter()
                .flat_map(|it| it.split(" ").into_iter().collect::<Vec<_>>()),
        ),
    )?;
    info!("{:?}", &args);

    if args.runs == 0 {
        bail!("--runs must be positive");
    }

    let config = args.search_config()?;
    let tournament = Tournament::new(args.teams, config.allow_bye)?;
    let budget = args.solver.budget();

    let input = match &args.input {
        Some(path) => {
            let load_timer = Timer::new();
            let schedule = load_schedule(path.as_str(), tournament.clone())?;
            info!("schedule loaded after {}", load_timer.took());
            Some(schedule)
        }
        None => None,
    };

    let base_seed = args
        .seed
        .unwrap_or_else(|| random::<i64>().unsigned_abs() as i128);
    info!("seed: {} ({} runs)", base_seed, args.runs);
    let seeds: Vec<i128> = (0..args.runs).map(|i| base_seed + i as i128).collect();

    let solve = |seed: i128| -> anyhow::Result<(RunSummary, SolverResult)> {
        let mut rng = create_seeded_rng(seed);
        let initial = match &input {
            Some(schedule) => schedule.clone(),
            None => construct_with(&tournament, &mut rng, args.solver.init),
        };
        let initial_report = evaluate(&initial, config.max_streak);
        info!(
            "seed {}: initial schedule {}",
            seed,
            format_log_report(&initial_report)
        );

        let mut sampler = MutationSampler::new(&config.mutation)?;
        let mut tracker = DefaultSearchTracker::new(budget.max_iterations as u64);
        let result = run_with(
            args.solver.variant,
            initial,
            &config,
            &mut rng,
            budget,
            &mut sampler,
            &mut tracker,
        )?;
        Ok((RunSummary::new(seed, initial_report.total(), &result), result))
    };

    #[cfg(feature = "parallel")]
    let results = {
        use rayon::prelude::*;
        seeds
            .par_iter()
            .map(|&seed| solve(seed))
            .collect::<anyhow::Result<Vec<_>>>()?
    };
    #[cfg(not(feature = "parallel"))]
    let results = seeds
        .iter()
        .map(|&seed| solve(seed))
        .collect::<anyhow::Result<Vec<_>>>()?;

    for (summary, result) in results.iter() {
        info!(
            "seed {}: {:?} after {} iterations, {}",
            summary.seed,
            result.outcome,
            result.iterations,
            format_log_report(&result.report)
        );

        if args.print_summary_to_stdout {
            println!("{},{}", summary.seed, summary.to_csv_line());
        }

        let solution_out = args
            .solution
            .as_ref()
            .map(|path| {
                if args.runs > 1 {
                    format!("{}.{}", path, summary.seed)
                } else {
                    path.to_string()
                }
            })
            .or(args.solution_directory.as_ref().map(|dir| {
                format!(
                    "{}/ttp{}.{}_{}.{}.csv",
                    dir,
                    summary.num_teams,
                    summary.final_violations,
                    summary.iterations,
                    summary.seed
                )
            }));

        if let Some(solution_path) = solution_out {
            write_schedule(solution_path, &result.final_schedule)?;
        }
    }

    if let Some(path) = &args.summary_json {
        let summaries: Vec<RunSummary> = results.iter().map(|(it, _)| it.clone()).collect();
        write_summary_json(path.as_str(), &summaries)?;
    }

    if let Some((best, _)) = results.iter().min_by_key(|(it, _)| it.final_violations) {
        info!(
            "best run: seed {} with {} violations",
            best.seed, best.final_violations
        );
    }

    Ok(())
}
