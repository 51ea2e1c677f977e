use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanError {
    #[error("Invalid parameter: {field} — {reason}")]
    InvalidParameter { field: String, reason: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl LoanError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        LoanError::InvalidParameter { field: field.to_string(), reason: reason.into() }
    }
}

impl From<toml::de::Error> for LoanError {
    fn from(e: toml::de::Error) -> Self {
        LoanError::Config(e.to_string())
    }
}

pub type LoanResult<T> = Result<T, LoanError>;
