use serde::Serialize;

use crate::config::LoanParameters;
use crate::types::Year;

/// Years of zero cash flow between a default and its recovery.
pub const RECOVERY_LAG_YEARS: u32 = 2;

/// Scheduled payment for a fulfilled year: interest only before maturity,
/// interest plus principal in the final contractual year.
pub fn payment_at_year(params: &LoanParameters, year: Year) -> f64 {
    let principal = params.principal();
    let rate = params.annual_interest_rate();
    if year.0 < params.term_years() {
        principal * rate
    } else {
        principal * (1.0 + rate)
    }
}

/// Amount collected after a default.
pub fn recovery_amount(params: &LoanParameters) -> f64 {
    params.recovery_rate() * params.principal()
}

/// Signed lender cash flows indexed by year; entry 0 is the disbursement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CashFlows(Vec<f64>);

impl CashFlows {
    /// Start a schedule with `-principal` at year 0.
    ///
    /// Grows as years are realized; an early default never pays for the full
    /// term.
    pub fn disbursed(params: &LoanParameters) -> Self {
        CashFlows(vec![-params.principal()])
    }

    /// Append the scheduled payment for a fulfilled `year`.
    pub fn push_payment(&mut self, params: &LoanParameters, year: Year) -> f64 {
        let amount = payment_at_year(params, year);
        self.0.push(amount);
        amount
    }

    /// Append the default tail: the defaulted year and one lag year pay
    /// nothing, then the recovery lands. Always three entries, even when that
    /// runs past the contractual term.
    pub fn push_default_tail(&mut self, params: &LoanParameters) -> f64 {
        let amount = recovery_amount(params);
        self.0.extend([0.0, 0.0, amount]);
        amount
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Last year with a cash flow.
    pub fn horizon(&self) -> Year {
        Year(self.0.len().saturating_sub(1) as u32)
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OutcomeLabels;

    fn params() -> LoanParameters {
        LoanParameters::new(1_000_000.0, 5, 0.1, 0.9, 0.4, 0.4, 0.3, OutcomeLabels::default())
            .expect("valid params")
    }

    #[test]
    fn interest_only_before_maturity() {
        let p = params();
        for y in 1..5 {
            assert!((payment_at_year(&p, Year(y)) - 300_000.0).abs() < 1e-6);
        }
    }

    #[test]
    fn principal_returned_at_maturity() {
        let p = params();
        assert!((payment_at_year(&p, Year(5)) - 1_300_000.0).abs() < 1e-6);
    }

    #[test]
    fn full_schedule_shape() {
        let p = params();
        let mut flows = CashFlows::disbursed(&p);
        for y in 1..=5 {
            flows.push_payment(&p, Year(y));
        }
        assert_eq!(flows.len(), 6);
        assert_eq!(flows.as_slice()[0], -1_000_000.0);
        assert_eq!(flows.horizon(), Year(5));
    }

    #[test]
    fn default_tail_appends_two_zeros_then_recovery() {
        let p = params();
        let mut flows = CashFlows::disbursed(&p);
        flows.push_payment(&p, Year(1));
        let recovered = flows.push_default_tail(&p);
        assert!((recovered - 400_000.0).abs() < 1e-6);
        let v = flows.as_slice();
        assert_eq!(v.len(), 5);
        assert_eq!(&v[2..4], &[0.0, 0.0]);
        assert!((v[4] - 400_000.0).abs() < 1e-6);
    }

    #[test]
    fn serializes_as_plain_array() {
        let p = LoanParameters::new(100.0, 1, 0.0, 0.0, 0.0, 0.5, 0.1, OutcomeLabels::default())
            .expect("valid params");
        let flows = CashFlows::disbursed(&p);
        assert_eq!(serde_json::to_string(&flows).expect("serialize"), "[-100.0]");
    }
}
