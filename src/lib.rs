//! Monte Carlo distribution of realized IRR for a fixed-term loan with
//! year-by-year default risk.

pub mod analysis;
pub mod cashflow;
pub mod config;
pub mod error;
pub mod irr;
pub mod outcome;
pub mod risk;
pub mod scenario;
pub mod simulation;
pub mod types;

pub use error::{LoanError, LoanResult};
