use rand::Rng;
use serde::Serialize;
use tracing::trace;

use crate::cashflow::{CashFlows, RECOVERY_LAG_YEARS};
use crate::config::LoanParameters;
use crate::irr;
use crate::outcome::sample_outcome;
use crate::risk::yearly_probabilities;
use crate::types::{Outcome, OutcomeLabels, Year};

/// One realized loan year.
///
/// For a fulfilled year `amount` is the scheduled payment. For a default it
/// is the recovery, which is received `RECOVERY_LAG_YEARS` after `year`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearEvent {
    pub year: Year,
    pub probability_of_default: f64,
    pub outcome: Outcome,
    pub amount: f64,
}

/// Everything one simulated loan lifetime produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanRun {
    pub cash_flows: CashFlows,
    pub events: Vec<YearEvent>,
    pub default_year: Option<Year>,
    /// `None` when the solver found no rate.
    pub irr: Option<f64>,
}

impl LoanRun {
    pub fn defaulted(&self) -> bool {
        self.default_year.is_some()
    }

    /// Year the recovery lands, if the loan defaulted.
    pub fn recovery_year(&self) -> Option<Year> {
        self.default_year.map(|y| y.offset(RECOVERY_LAG_YEARS))
    }

    /// Human-readable schedule, one line per realized year plus the result.
    pub fn describe(&self, labels: &OutcomeLabels) -> Vec<String> {
        let mut lines: Vec<String> = self
            .events
            .iter()
            .map(|ev| match ev.outcome {
                Outcome::Fulfillment => format!(
                    "Year {}: {} (p_default={:.4}), paid {:.2}",
                    ev.year.0,
                    labels.label(ev.outcome),
                    ev.probability_of_default,
                    ev.amount
                ),
                Outcome::Default => format!(
                    "Year {}: {} (p_default={:.4}), recovered {:.2} in year {}",
                    ev.year.0,
                    labels.label(ev.outcome),
                    ev.probability_of_default,
                    ev.amount,
                    ev.year.offset(RECOVERY_LAG_YEARS).0
                ),
            })
            .collect();
        lines.push(match self.irr {
            Some(r) => format!("IRR: {r:.6}"),
            None => "IRR: undefined".to_string(),
        });
        lines
    }
}

/// Walk one loan year by year until maturity or the first default, then
/// reduce the resulting cash flows to an IRR.
///
/// A default in year `k` appends `[0, 0, recovery]` and stops, so the
/// schedule holds `k + 3` entries; for `k == term_years` that runs two years
/// past the contractual term.
pub fn simulate_loan(params: &LoanParameters, rng: &mut impl Rng) -> LoanRun {
    let mut cash_flows = CashFlows::disbursed(params);
    let mut events = Vec::new();
    let mut default_year = None;

    for (year, p) in yearly_probabilities(params) {
        let outcome = sample_outcome(p, rng);
        let amount = match outcome {
            Outcome::Fulfillment => cash_flows.push_payment(params, year),
            Outcome::Default => cash_flows.push_default_tail(params),
        };
        trace!(year = year.0, p, ?outcome, amount, "loan year");
        events.push(YearEvent { year, probability_of_default: p, outcome, amount });
        if outcome == Outcome::Default {
            default_year = Some(year);
            break;
        }
    }

    let irr = irr::irr(cash_flows.as_slice());
    LoanRun { cash_flows, events, default_year, irr }
}
