use crate::config::LoanParameters;
use crate::types::Year;

/// Probability that the borrower defaults in `year` (`year >= 1`).
///
/// Before maturity the probability starts at `initial_default_probability`
/// in year 1 and is multiplied by `default_decay` each following year. From
/// `term_years` onward it is the flat `final_year_default_probability`.
///
/// Computed iteratively: the value for year `k < term_years` equals
/// `initial * decay^(k - 1)` applied one factor at a time.
pub fn probability_of_default(params: &LoanParameters, year: Year) -> f64 {
    debug_assert!(year.0 >= 1, "default probability is defined from year 1");
    if year.0 >= params.term_years() {
        return params.final_year_default_probability();
    }
    let mut p = params.initial_default_probability();
    for _ in 1..year.0 {
        p *= params.default_decay();
    }
    p
}

/// Year-by-year default probabilities for `1..=term_years`.
///
/// Carries the decayed value forward, so a full walk costs one
/// multiplication per year. Yields the same values as
/// [`probability_of_default`] bit for bit.
#[derive(Debug, Clone)]
pub struct DefaultCurve<'a> {
    params: &'a LoanParameters,
    year: Year,
    running: f64,
}

impl Iterator for DefaultCurve<'_> {
    type Item = (Year, f64);

    fn next(&mut self) -> Option<Self::Item> {
        let term = self.params.term_years();
        if self.year.0 >= term {
            return None;
        }
        self.year = self.year.next();
        if self.year.0 >= term {
            return Some((self.year, self.params.final_year_default_probability()));
        }
        let p = self.running;
        self.running *= self.params.default_decay();
        Some((self.year, p))
    }
}

pub fn yearly_probabilities(params: &LoanParameters) -> DefaultCurve<'_> {
    DefaultCurve {
        params,
        year: Year::DISBURSEMENT,
        running: params.initial_default_probability(),
    }
}

/// Default probabilities for years `1..=term_years`, indexed from year 1.
pub fn default_curve(params: &LoanParameters) -> Vec<f64> {
    yearly_probabilities(params).map(|(_, p)| p).collect()
}
