//! Simulate one loan and narrate it.
//!
//! Writes each realized year as an NDJSON `YearEvent` to stdout and a
//! human-readable schedule with the resulting IRR to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::error;
use tracing_subscriber::EnvFilter;

use loanirr::config::{LoanParameters, SimulationConfig};
use loanirr::simulation::simulate_loan;
use loanirr::LoanResult;

#[derive(Parser, Debug)]
#[command(name = "single_loan", version)]
struct Args {
    /// TOML config file; only its `seed` and `[base]` loan terms are used
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed; defaults to the config seed
    #[arg(long)]
    seed: Option<u64>,

    /// Loan term in years
    #[arg(long = "term-years")]
    term_years: Option<u32>,

    /// Annual interest rate as a fraction
    #[arg(long)]
    rate: Option<f64>,

    /// Year-one default probability
    #[arg(long = "initial-pd")]
    initial_pd: Option<f64>,
}

fn load(args: &Args) -> LoanResult<(LoanParameters, u64)> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::canonical(),
    };
    if let Some(v) = args.term_years {
        config.base.term_years = v;
    }
    if let Some(v) = args.rate {
        config.base.annual_interest_rate = v;
    }
    if let Some(v) = args.initial_pd {
        config.base.initial_default_probability = v;
    }
    let seed = args.seed.unwrap_or(config.seed);
    Ok((config.base.build()?, seed))
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let (params, seed) = match load(&args) {
        Ok(v) => v,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let run = simulate_loan(&params, &mut rng);

    for ev in &run.events {
        match serde_json::to_string(ev) {
            Ok(line) => println!("{line}"),
            Err(e) => {
                error!("failed to serialise event: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    eprintln!(
        "single_loan: principal {:.2}, term {} years, rate {:.4}, seed {seed}",
        params.principal(),
        params.term_years(),
        params.annual_interest_rate()
    );
    for line in run.describe(params.outcome_labels()) {
        eprintln!("  {line}");
    }
    eprintln!("  cash flows: {:?}", run.cash_flows.as_slice());
    ExitCode::SUCCESS
}
