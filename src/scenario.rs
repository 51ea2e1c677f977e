use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{LoanParameters, Scenario, SimulationConfig};
use crate::error::LoanResult;
use crate::simulation::simulate_loan;

/// IRRs from repeated simulation of one parameter set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioResult {
    pub params: LoanParameters,
    pub seed: u64,
    /// One entry per iteration, in iteration order. `None` = solver found no rate.
    pub irrs: Vec<Option<f64>>,
    /// Iterations that ended in default.
    pub defaults: usize,
}

impl ScenarioResult {
    pub fn iterations(&self) -> usize {
        self.irrs.len()
    }

    pub fn undefined_count(&self) -> usize {
        self.irrs.iter().filter(|r| r.is_none()).count()
    }

    /// Defined IRRs only.
    pub fn defined_irrs(&self) -> Vec<f64> {
        self.irrs.iter().flatten().copied().collect()
    }

    pub fn default_rate(&self) -> f64 {
        if self.irrs.is_empty() { 0.0 } else { self.defaults as f64 / self.irrs.len() as f64 }
    }

    /// `(parameters, IRR)` pairs for the reporting layer.
    pub fn pairs(&self) -> impl Iterator<Item = (&LoanParameters, Option<f64>)> + '_ {
        self.irrs.iter().map(move |&irr| (&self.params, irr))
    }
}

/// One grid point and what became of it.
#[derive(Debug)]
pub struct ScenarioOutcome {
    pub index: usize,
    pub scenario: Scenario,
    /// `Err` when the grid point failed validation; other points still run.
    pub result: LoanResult<ScenarioResult>,
}

/// Generator for one iteration: ChaCha20 keyed by `seed`, on its own stream.
///
/// Distinct iterations read disjoint streams, so parallel runs stay
/// independent and each draw sequence is fixed by `(seed, iteration)` alone.
pub fn iteration_rng(seed: u64, iteration: u64) -> ChaCha20Rng {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    rng.set_stream(iteration);
    rng
}

/// Simulate `params` `iterations` times.
///
/// Iterations run on the rayon pool; results come back in iteration order,
/// so the output does not depend on thread count.
pub fn run_scenario(params: &LoanParameters, iterations: usize, seed: u64) -> ScenarioResult {
    let runs: Vec<(Option<f64>, bool)> = (0..iterations)
        .into_par_iter()
        .map(|i| {
            let mut rng = iteration_rng(seed, i as u64);
            let run = simulate_loan(params, &mut rng);
            (run.irr, run.defaulted())
        })
        .collect();

    let defaults = runs.iter().filter(|(_, d)| *d).count();
    let irrs: Vec<Option<f64>> = runs.into_iter().map(|(irr, _)| irr).collect();
    ScenarioResult { params: params.clone(), seed, irrs, defaults }
}

/// Run every grid point of `config`.
///
/// Grid point `i` uses seed `config.seed + i`. Errors in the batch settings
/// (zero iterations, empty axis) are returned up front; a grid point with
/// invalid terms is reported in its own `ScenarioOutcome`.
pub fn run_scenarios(config: &SimulationConfig) -> LoanResult<Vec<ScenarioOutcome>> {
    config.validate()?;

    let scenarios = config.grid.combinations();
    info!(
        scenarios = scenarios.len(),
        iterations = config.iterations,
        seed = config.seed,
        "running scenario grid"
    );

    let outcomes = scenarios
        .into_iter()
        .enumerate()
        .map(|(index, scenario)| {
            let seed = config.seed.wrapping_add(index as u64);
            let result = config.base.for_scenario(&scenario).map(|params| {
                let result = run_scenario(&params, config.iterations, seed);
                debug!(
                    index,
                    rate = scenario.interest_rate,
                    term = scenario.term_years,
                    initial_pd = scenario.initial_default_probability,
                    defaults = result.defaults,
                    undefined = result.undefined_count(),
                    "scenario complete"
                );
                if result.undefined_count() > 0 {
                    warn!(
                        index,
                        undefined = result.undefined_count(),
                        "IRR undefined for some iterations"
                    );
                }
                result
            });
            if let Err(e) = &result {
                warn!(index, error = %e, "scenario rejected");
            }
            ScenarioOutcome { index, scenario, result }
        })
        .collect();

    Ok(outcomes)
}
