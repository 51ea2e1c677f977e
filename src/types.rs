use serde::{Deserialize, Serialize};

/// Loan year. Year 0 is the disbursement; contractual years run `1..=term_years`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Year(pub u32);

impl Year {
    pub const DISBURSEMENT: Year = Year(0);

    pub fn next(self) -> Self {
        Year(self.0 + 1)
    }

    /// Advance by a number of years, e.g. from a default to its recovery.
    pub fn offset(self, years: u32) -> Self {
        Year(self.0 + years)
    }

    /// Position of this year in a cash-flow vector.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Realized result of one loan year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Fulfillment,
    Default,
}

/// Display names for the two outcome categories. Reporting only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeLabels {
    pub fulfillment: String,
    pub default: String,
}

impl OutcomeLabels {
    pub fn label(&self, outcome: Outcome) -> &str {
        match outcome {
            Outcome::Fulfillment => &self.fulfillment,
            Outcome::Default => &self.default,
        }
    }
}

impl Default for OutcomeLabels {
    fn default() -> Self {
        Self { fulfillment: "Fulfillment".to_string(), default: "Default".to_string() }
    }
}
