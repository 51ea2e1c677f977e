use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use loanirr::LoanResult;
use loanirr::analysis::{self, IrrStats};
use loanirr::config::SimulationConfig;
use loanirr::scenario::{self, ScenarioOutcome};

/// Distribution of realized IRR for a fixed-term loan under yearly default risk.
#[derive(Parser, Debug)]
#[command(name = "loanirr", version)]
struct Cli {
    /// TOML config file; the flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Loan face value
    #[arg(long)]
    principal: Option<f64>,

    /// Loan term in years (repeat for several scenarios)
    #[arg(long = "term-years")]
    term_years: Vec<u32>,

    /// Annual interest rate as a fraction (repeatable)
    #[arg(long = "rate")]
    rates: Vec<f64>,

    /// Year-one default probability (repeatable)
    #[arg(long = "initial-pd")]
    initial_pds: Vec<f64>,

    /// Default probability from the final contractual year on
    #[arg(long = "final-pd")]
    final_pd: Option<f64>,

    /// Yearly multiplicative decay of the default probability
    #[arg(long)]
    decay: Option<f64>,

    /// Fraction of principal recovered after a default
    #[arg(long)]
    recovery: Option<f64>,

    /// Simulated loans per scenario
    #[arg(long)]
    iterations: Option<usize>,

    /// Base random seed; scenario i uses seed + i
    #[arg(long)]
    seed: Option<u64>,

    /// Write every (scenario, iteration, IRR) row to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Print an IRR histogram with this many buckets per scenario
    #[arg(long)]
    histogram: Option<usize>,

    /// Suppress the summary table
    #[arg(long)]
    quiet: bool,
}

impl Cli {
    fn into_config(self) -> LoanResult<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::load(path)?,
            None => SimulationConfig::canonical(),
        };
        if let Some(v) = self.principal {
            config.base.principal = v;
        }
        if let Some(v) = self.final_pd {
            config.base.final_year_default_probability = v;
        }
        if let Some(v) = self.decay {
            config.base.default_decay = v;
        }
        if let Some(v) = self.recovery {
            config.base.recovery_rate = v;
        }
        if let Some(v) = self.iterations {
            config.iterations = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
        if !self.term_years.is_empty() {
            config.grid.term_years = self.term_years;
        }
        if !self.rates.is_empty() {
            config.grid.interest_rates = self.rates;
        }
        if !self.initial_pds.is_empty() {
            config.grid.initial_default_probabilities = self.initial_pds;
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let csv_path = cli.csv.clone();
    let bins = cli.histogram;
    let quiet = cli.quiet;

    let config = match cli.into_config() {
        Ok(c) => c,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let outcomes = match scenario::run_scenarios(&config) {
        Ok(o) => o,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(path) = csv_path {
        match write_csv(&outcomes, &path) {
            Ok(rows) => info!(rows, path = %path.display(), "wrote IRR rows"),
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            }
        }
    }

    if !quiet {
        print_summary(&outcomes, config.iterations);
        if let Some(bins) = bins {
            print_histograms(&outcomes, bins);
        }
    }

    let rejected = outcomes.iter().filter(|o| o.result.is_err()).count();
    if rejected > 0 {
        error!(rejected, "some scenarios had invalid parameters");
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    }
}

fn fmt_pct(v: f64) -> String {
    format!("{:.2}%", v * 100.0)
}

fn print_summary(outcomes: &[ScenarioOutcome], iterations: usize) {
    println!("\n=== IRR distribution (N={iterations} loans per scenario) ===");
    println!(
        concat!(
            "{:>3} | {:>7} | {:>4} | {:>7} | {:>8} | {:>5} | ",
            "{:>8} | {:>8} | {:>8} | {:>8} | {:>8} | {:>8}"
        ),
        "#",
        "Rate",
        "Term",
        "PD(1)",
        "Default",
        "Undef",
        "Mean",
        "Median",
        "StdDev",
        "p5",
        "Min",
        "Max"
    );
    println!("{}", "-".repeat(112));

    for o in outcomes {
        let s = &o.scenario;
        let head = format!(
            "{:>3} | {:>7} | {:>4} | {:>7}",
            o.index,
            fmt_pct(s.interest_rate),
            s.term_years,
            fmt_pct(s.initial_default_probability)
        );
        match &o.result {
            Ok(r) => {
                let defaults = fmt_pct(r.default_rate());
                match r.stats() {
                    Some(st) => println!(
                        "{head} | {defaults:>8} | {:>5} | {}",
                        st.undefined,
                        stats_columns(&st)
                    ),
                    None => println!(
                        "{head} | {defaults:>8} | {:>5} | no defined IRR",
                        r.undefined_count()
                    ),
                }
            }
            Err(e) => println!("{head} | rejected: {e}"),
        }
    }
}

fn stats_columns(s: &IrrStats) -> String {
    format!(
        "{:>8} | {:>8} | {:>8} | {:>8} | {:>8} | {:>8}",
        fmt_pct(s.mean),
        fmt_pct(s.median),
        fmt_pct(s.std_dev),
        fmt_pct(s.p5),
        fmt_pct(s.min),
        fmt_pct(s.max)
    )
}

fn print_histograms(outcomes: &[ScenarioOutcome], bins: usize) {
    for o in outcomes {
        let Ok(r) = &o.result else { continue };
        println!(
            "\n--- Scenario {} (rate {}, term {}, PD(1) {}) ---",
            o.index,
            fmt_pct(o.scenario.interest_rate),
            o.scenario.term_years,
            fmt_pct(o.scenario.initial_default_probability)
        );
        for b in analysis::histogram(&r.defined_irrs(), bins) {
            println!("  [{:>9}, {:>9}]  {:>7}", fmt_pct(b.lower), fmt_pct(b.upper), b.count);
        }
    }
}

#[derive(Serialize)]
struct IrrRow {
    scenario: usize,
    interest_rate: f64,
    term_years: u32,
    initial_pd: f64,
    iteration: usize,
    irr: Option<f64>,
}

fn write_csv(outcomes: &[ScenarioOutcome], path: &Path) -> LoanResult<usize> {
    let mut w = csv::Writer::from_path(path)?;
    let mut rows = 0;
    for o in outcomes {
        let Ok(r) = &o.result else { continue };
        for (iteration, (params, irr)) in r.pairs().enumerate() {
            w.serialize(IrrRow {
                scenario: o.index,
                interest_rate: params.annual_interest_rate(),
                term_years: params.term_years(),
                initial_pd: params.initial_default_probability(),
                iteration,
                irr,
            })?;
            rows += 1;
        }
    }
    w.flush()?;
    Ok(rows)
}
