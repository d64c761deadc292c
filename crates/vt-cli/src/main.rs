//! VeriTune: find solver parameter configurations that minimize solve time.

mod objective;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vt_optimizer::{OptimizationConfig, Optimizer, SearchSpace};
use vt_solver::{build_args, build_catalog, JsonOptionSource, SolverRunner};
use vt_types::{Catalog, OptionSelection, ParamValue};

use crate::objective::SolverObjective;

/// Time budget used for non-trial (interactive) solver invocations.
const SOLVE_TIME_BUDGET: Duration = Duration::from_secs(300);

/// Tune SMT solver parameters against a fixed problem file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
struct Cli {
    /// Path to the solver's option metadata dump (JSON)
    #[arg(long, global = true, default_value = "solver-options.json")]
    options_file: PathBuf,

    /// Solver binary to invoke
    #[arg(long, global = true, default_value = "cvc5")]
    binary: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the classified parameter catalog
    Params {
        /// Dump the catalog as JSON instead of the grouped listing
        #[arg(long)]
        json: bool,
    },
    /// Solve one problem file with explicit solver options
    Solve {
        /// Path to the SMT2 problem file
        file: PathBuf,

        /// Option to set, as `name` (bare flag) or `name=value`; repeatable
        #[arg(short = 'o', long = "option")]
        options: Vec<String>,
    },
    /// Search for the parameter configuration minimizing solve time
    Tune {
        /// Path to the SMT2 problem file
        file: PathBuf,

        /// Timeout for each solver run (seconds)
        #[arg(long, default_value_t = 300)]
        timeout: u64,

        /// Number of configurations to try
        #[arg(long, default_value_t = 1000)]
        trials: usize,

        /// Number of parallel workers
        #[arg(long, default_value_t = 1)]
        workers: usize,

        /// Search strategy: "bayesian" or "random"
        #[arg(long, default_value = "bayesian")]
        strategy: String,

        /// Exploration weight for the Bayesian strategy
        #[arg(long, default_value_t = 0.3)]
        exploration: f64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let catalog = load_catalog(&cli.options_file)?;

    match &cli.command {
        Command::Params { json } => print_params(&catalog, *json)?,
        Command::Solve { file, options } => solve(&cli, &catalog, file, options).await?,
        Command::Tune {
            file,
            timeout,
            trials,
            workers,
            strategy,
            exploration,
        } => {
            tune(
                &cli,
                catalog,
                file,
                Duration::from_secs(*timeout),
                *trials,
                *workers,
                strategy,
                *exploration,
            )
            .await?
        }
    }

    Ok(())
}

fn load_catalog(options_file: &Path) -> anyhow::Result<Catalog> {
    let source = JsonOptionSource::from_path(options_file)
        .with_context(|| format!("reading options dump {}", options_file.display()))?;
    let build = build_catalog(&source)?;
    info!(
        classified = build.catalog.len(),
        skipped = build.skipped.len(),
        "built parameter catalog"
    );
    Ok(build.catalog)
}

fn print_params(catalog: &Catalog, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(catalog)?);
        return Ok(());
    }

    let rule = "-".repeat(50);

    println!("Boolean Parameters (with defaults):");
    println!("{rule}");
    for (name, default) in sorted(catalog.bool_params()) {
        println!("{name}: {default}");
    }

    println!("\nInteger Parameters (with defaults and bounds):");
    println!("{rule}");
    for (name, param) in sorted(catalog.int_params()) {
        println!(
            "{name}: default={}, min: {}, max: {}",
            param.default,
            fmt_bound(param.min),
            fmt_bound(param.max)
        );
    }

    println!("\nFloat Parameters (with defaults and bounds):");
    println!("{rule}");
    for (name, param) in sorted(catalog.float_params()) {
        println!(
            "{name}: default={}, min: {}, max: {}",
            param.default,
            fmt_bound(param.min),
            fmt_bound(param.max)
        );
    }

    println!("\nString Parameters (with defaults):");
    println!("{rule}");
    for (name, default) in sorted(catalog.string_params()) {
        println!("{name}: {default}");
    }

    println!("\nMode Parameters (with possible values):");
    println!("{rule}");
    for (name, param) in sorted(catalog.mode_params()) {
        println!("{name}: {:?}", param.modes);
    }

    Ok(())
}

fn sorted<'a, V>(map: &'a std::collections::HashMap<String, V>) -> Vec<(&'a String, &'a V)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));
    entries
}

fn fmt_bound<T: std::fmt::Display>(bound: Option<T>) -> String {
    match bound {
        Some(value) => value.to_string(),
        None => "None".to_string(),
    }
}

async fn solve(
    cli: &Cli,
    catalog: &Catalog,
    file: &Path,
    option_specs: &[String],
) -> anyhow::Result<()> {
    if !file.exists() {
        bail!("problem file not found: {}", file.display());
    }

    let mut selection = OptionSelection::new();
    for spec in option_specs {
        let (name, value) = parse_option_spec(spec);
        selection.push(name, value);
    }

    let built = build_args(catalog, &selection);
    for warning in &built.warnings {
        eprintln!("Warning: {warning}");
    }

    let runner = SolverRunner::new(&cli.binary, file, SOLVE_TIME_BUDGET);
    let output = runner.solve(&built.tokens).await?;
    print!("{output}");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn tune(
    cli: &Cli,
    catalog: Catalog,
    file: &Path,
    timeout: Duration,
    trials: usize,
    workers: usize,
    strategy: &str,
    exploration: f64,
) -> anyhow::Result<()> {
    if !file.exists() {
        bail!("problem file not found: {}", file.display());
    }

    let space = SearchSpace::from_catalog(&catalog);
    info!(dimensions = space.len(), "derived search space");

    let run_name = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tune".to_string());
    let config = OptimizationConfig::new(run_name, space, strategy)
        .with_max_trials(trials)
        .with_concurrency(workers)
        .with_exploration_weight(exploration);

    let runner = SolverRunner::new(&cli.binary, file, timeout);
    let objective = Arc::new(SolverObjective::new(catalog, runner));

    let mut optimizer = Optimizer::new(config)?;
    println!("Starting parameter optimization...");
    let status = optimizer.run(objective).await?;

    match &status.best_trial {
        Some(best) => {
            println!("\nBest configuration found:");
            let mut names: Vec<&String> = best.parameters.keys().collect();
            names.sort();
            for name in names {
                println!("{name}: {}", best.parameters[name]);
            }
            println!("\nBest solve time: {:.3}s", best.objective);
        }
        None => println!("\nNo trials completed."),
    }

    Ok(())
}

/// Parse a `-o` argument: `name` alone sets a bare flag, `name=value` carries
/// a value. Values parse as bool, then integer, then float, then fall back
/// to a plain string; the catalog decides admissibility either way.
fn parse_option_spec(spec: &str) -> (String, Option<ParamValue>) {
    match spec.split_once('=') {
        None => (spec.to_string(), None),
        Some((name, raw)) => (name.to_string(), Some(parse_value(raw))),
    }
}

fn parse_value(raw: &str) -> ParamValue {
    if raw == "true" {
        ParamValue::Bool(true)
    } else if raw == "false" {
        ParamValue::Bool(false)
    } else if let Ok(v) = raw.parse::<i64>() {
        ParamValue::Int(v)
    } else if let Ok(v) = raw.parse::<f64>() {
        ParamValue::Float(v)
    } else {
        ParamValue::Str(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_spec_without_value_is_a_bare_flag() {
        let (name, value) = parse_option_spec("produce-models");
        assert_eq!(name, "produce-models");
        assert!(value.is_none());
    }

    #[test]
    fn option_spec_values_parse_by_shape() {
        assert_eq!(
            parse_option_spec("strings-exp=true").1,
            Some(ParamValue::Bool(true))
        );
        assert_eq!(
            parse_option_spec("restart-int-base=42").1,
            Some(ParamValue::Int(42))
        );
        assert_eq!(
            parse_option_spec("restart-factor=2.5").1,
            Some(ParamValue::Float(2.5))
        );
        assert_eq!(
            parse_option_spec("bitblast=eager").1,
            Some(ParamValue::Str("eager".to_string()))
        );
    }
}
