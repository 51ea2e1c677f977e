use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LoanError, LoanResult};
use crate::types::OutcomeLabels;

/// Longest accepted loan term.
pub const MAX_TERM_YEARS: u32 = 1_000_000;

/// Validated, immutable terms of one loan scenario.
///
/// Built only through [`LoanParameters::new`] (or [`LoanTemplate::build`]),
/// so every instance satisfies the invariants: probabilities and the recovery
/// rate lie in [0, 1], `1 <= term_years <= MAX_TERM_YEARS`, `principal > 0`,
/// interest rate >= 0. Scenario variation constructs new values; nothing mutates an instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanParameters {
    principal: f64,
    term_years: u32,
    initial_default_probability: f64,
    default_decay: f64,
    final_year_default_probability: f64,
    recovery_rate: f64,
    annual_interest_rate: f64,
    #[serde(skip)]
    outcome_labels: OutcomeLabels,
}

impl LoanParameters {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        principal: f64,
        term_years: u32,
        initial_default_probability: f64,
        default_decay: f64,
        final_year_default_probability: f64,
        recovery_rate: f64,
        annual_interest_rate: f64,
        outcome_labels: OutcomeLabels,
    ) -> LoanResult<Self> {
        if !principal.is_finite() || principal <= 0.0 {
            return Err(LoanError::invalid(
                "principal",
                format!("must be positive, got {principal}"),
            ));
        }
        if term_years < 1 {
            return Err(LoanError::invalid("term_years", "must be at least 1"));
        }
        if term_years > MAX_TERM_YEARS {
            return Err(LoanError::invalid(
                "term_years",
                format!("must be at most {MAX_TERM_YEARS}, got {term_years}"),
            ));
        }
        check_unit_interval("initial_default_probability", initial_default_probability)?;
        check_unit_interval("default_decay", default_decay)?;
        check_unit_interval("final_year_default_probability", final_year_default_probability)?;
        check_unit_interval("recovery_rate", recovery_rate)?;
        if !annual_interest_rate.is_finite() || annual_interest_rate < 0.0 {
            return Err(LoanError::invalid(
                "annual_interest_rate",
                format!("must be non-negative, got {annual_interest_rate}"),
            ));
        }

        Ok(Self {
            principal,
            term_years,
            initial_default_probability,
            default_decay,
            final_year_default_probability,
            recovery_rate,
            annual_interest_rate,
            outcome_labels,
        })
    }

    pub fn principal(&self) -> f64 {
        self.principal
    }

    pub fn term_years(&self) -> u32 {
        self.term_years
    }

    pub fn initial_default_probability(&self) -> f64 {
        self.initial_default_probability
    }

    pub fn default_decay(&self) -> f64 {
        self.default_decay
    }

    pub fn final_year_default_probability(&self) -> f64 {
        self.final_year_default_probability
    }

    pub fn recovery_rate(&self) -> f64 {
        self.recovery_rate
    }

    pub fn annual_interest_rate(&self) -> f64 {
        self.annual_interest_rate
    }

    pub fn outcome_labels(&self) -> &OutcomeLabels {
        &self.outcome_labels
    }
}

fn check_unit_interval(field: &str, value: f64) -> LoanResult<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(LoanError::invalid(field, format!("must lie in [0, 1], got {value}")))
    }
}

/// Unvalidated loan terms as read from config or CLI flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanTemplate {
    pub principal: f64,
    pub term_years: u32,
    pub initial_default_probability: f64,
    pub default_decay: f64,
    pub final_year_default_probability: f64,
    pub recovery_rate: f64,
    pub annual_interest_rate: f64,
    pub outcome_labels: OutcomeLabels,
}

impl Default for LoanTemplate {
    fn default() -> Self {
        Self {
            principal: 1_000_000.0,
            term_years: 5,
            initial_default_probability: 0.1,
            default_decay: 0.9,
            final_year_default_probability: 0.4,
            recovery_rate: 0.4,
            annual_interest_rate: 0.3,
            outcome_labels: OutcomeLabels::default(),
        }
    }
}

impl LoanTemplate {
    pub fn build(&self) -> LoanResult<LoanParameters> {
        LoanParameters::new(
            self.principal,
            self.term_years,
            self.initial_default_probability,
            self.default_decay,
            self.final_year_default_probability,
            self.recovery_rate,
            self.annual_interest_rate,
            self.outcome_labels.clone(),
        )
    }

    /// Terms for one grid point: the template with the three scenario axes replaced.
    pub fn for_scenario(&self, scenario: &Scenario) -> LoanResult<LoanParameters> {
        LoanTemplate {
            annual_interest_rate: scenario.interest_rate,
            term_years: scenario.term_years,
            initial_default_probability: scenario.initial_default_probability,
            ..self.clone()
        }
        .build()
    }
}

/// One point of the scenario grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scenario {
    pub interest_rate: f64,
    pub term_years: u32,
    pub initial_default_probability: f64,
}

/// Candidate values for each scenario axis; evaluated as a Cartesian product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioGrid {
    pub interest_rates: Vec<f64>,
    pub term_years: Vec<u32>,
    pub initial_default_probabilities: Vec<f64>,
}

impl Default for ScenarioGrid {
    fn default() -> Self {
        Self {
            interest_rates: vec![0.30, 0.35, 0.40],
            term_years: vec![5, 10],
            initial_default_probabilities: vec![0.1, 0.2],
        }
    }
}

impl ScenarioGrid {
    /// Grid points ordered interest rate, then term, then initial default probability.
    pub fn combinations(&self) -> Vec<Scenario> {
        let mut out = Vec::with_capacity(self.len());
        for &interest_rate in &self.interest_rates {
            for &term_years in &self.term_years {
                for &initial_default_probability in &self.initial_default_probabilities {
                    out.push(Scenario { interest_rate, term_years, initial_default_probability });
                }
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.interest_rates.len() * self.term_years.len() * self.initial_default_probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validated parameters per grid point. A rejected point does not affect its neighbours.
    pub fn expand(&self, base: &LoanTemplate) -> Vec<LoanResult<LoanParameters>> {
        self.combinations().iter().map(|s| base.for_scenario(s)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: u64,
    pub iterations: usize,
    pub base: LoanTemplate,
    pub grid: ScenarioGrid,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::canonical()
    }
}

impl SimulationConfig {
    /// Reference study: three rates, two terms, two starting default probabilities.
    pub fn canonical() -> Self {
        SimulationConfig {
            seed: 42,
            iterations: 1_000,
            base: LoanTemplate::default(),
            grid: ScenarioGrid::default(),
        }
    }

    pub fn from_toml_str(s: &str) -> LoanResult<Self> {
        let config: SimulationConfig = toml::from_str(s)?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> LoanResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Batch-level checks. Per-scenario terms are checked by [`ScenarioGrid::expand`].
    pub fn validate(&self) -> LoanResult<()> {
        if self.iterations == 0 {
            return Err(LoanError::invalid("iterations", "must be at least 1"));
        }
        if self.grid.is_empty() {
            return Err(LoanError::invalid("grid", "every scenario axis needs at least one value"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pd: f64, decay: f64, final_pd: f64, recovery: f64) -> LoanResult<LoanParameters> {
        let labels = OutcomeLabels::default();
        LoanParameters::new(1_000.0, 3, pd, decay, final_pd, recovery, 0.05, labels)
    }

    #[test]
    fn accepts_boundary_probabilities() {
        assert!(params(0.0, 0.0, 1.0, 1.0).is_ok());
        assert!(params(1.0, 1.0, 0.0, 0.0).is_ok());
    }

    #[test]
    fn rejects_probability_outside_unit_interval() {
        match params(1.2, 0.9, 0.4, 0.4) {
            Err(LoanError::InvalidParameter { field, .. }) => {
                assert_eq!(field, "initial_default_probability")
            }
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
        assert!(params(0.1, -0.1, 0.4, 0.4).is_err());
        assert!(params(0.1, 0.9, f64::NAN, 0.4).is_err());
        assert!(params(0.1, 0.9, 0.4, 1.01).is_err());
    }

    #[test]
    fn rejects_non_positive_principal_and_zero_term() {
        let labels = OutcomeLabels::default();
        assert!(LoanParameters::new(0.0, 3, 0.1, 0.9, 0.4, 0.4, 0.05, labels.clone()).is_err());
        assert!(LoanParameters::new(-5.0, 3, 0.1, 0.9, 0.4, 0.4, 0.05, labels.clone()).is_err());
        assert!(LoanParameters::new(1_000.0, 0, 0.1, 0.9, 0.4, 0.4, 0.05, labels.clone()).is_err());
        assert!(LoanParameters::new(1_000.0, 3, 0.1, 0.9, 0.4, 0.4, -0.01, labels).is_err());
    }

    #[test]
    fn term_is_capped() {
        let labels = OutcomeLabels::default();
        let at_cap = LoanParameters::new(1_000.0, MAX_TERM_YEARS, 0.1, 0.9, 0.4, 0.4, 0.05, labels);
        assert!(at_cap.is_ok());
        let labels = OutcomeLabels::default();
        match LoanParameters::new(1_000.0, u32::MAX, 0.1, 0.9, 0.4, 0.4, 0.05, labels) {
            Err(LoanError::InvalidParameter { field, .. }) => assert_eq!(field, "term_years"),
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn grid_combinations_are_cartesian_product_in_order() {
        let grid = ScenarioGrid {
            interest_rates: vec![0.1, 0.2],
            term_years: vec![3],
            initial_default_probabilities: vec![0.05, 0.15],
        };
        let combos = grid.combinations();
        assert_eq!(combos.len(), 4);
        assert_eq!(grid.len(), 4);
        assert_eq!(
            combos[1],
            Scenario { interest_rate: 0.1, term_years: 3, initial_default_probability: 0.15 }
        );
        assert_eq!(combos[2].interest_rate, 0.2);
    }

    #[test]
    fn expand_isolates_invalid_combination() {
        let grid = ScenarioGrid {
            interest_rates: vec![0.1],
            term_years: vec![0, 4],
            initial_default_probabilities: vec![0.1],
        };
        let expanded = grid.expand(&LoanTemplate::default());
        assert!(expanded[0].is_err(), "term 0 must be rejected");
        let ok = expanded[1].as_ref().expect("term 4 is valid");
        assert_eq!(ok.term_years(), 4);
        assert_eq!(ok.annual_interest_rate(), 0.1);
        assert_eq!(ok.principal(), 1_000_000.0);
    }

    #[test]
    fn toml_overrides_and_falls_back_to_canonical() {
        let text = r#"
            seed = 7
            iterations = 250

            [base]
            principal = 500000.0
            recovery_rate = 0.25

            [grid]
            term_years = [3]
        "#;
        let config = SimulationConfig::from_toml_str(text).expect("valid toml");
        assert_eq!(config.seed, 7);
        assert_eq!(config.iterations, 250);
        assert_eq!(config.base.principal, 500_000.0);
        assert_eq!(config.base.recovery_rate, 0.25);
        assert_eq!(config.base.default_decay, 0.9);
        assert_eq!(config.grid.term_years, vec![3]);
        assert_eq!(config.grid.interest_rates, vec![0.30, 0.35, 0.40]);
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = SimulationConfig::from_toml_str("iterations = \"many\"").unwrap_err();
        assert!(matches!(err, LoanError::Config(_)), "got {err:?}");
    }

    #[test]
    fn validate_rejects_zero_iterations_and_empty_axis() {
        let mut config = SimulationConfig::canonical();
        assert!(config.validate().is_ok());
        config.iterations = 0;
        assert!(config.validate().is_err());
        let mut config = SimulationConfig::canonical();
        config.grid.initial_default_probabilities.clear();
        assert!(config.validate().is_err());
    }
}
