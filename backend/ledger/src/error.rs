use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Unknown {kind} value: {value}")]
    UnknownLabel { kind: &'static str, value: String },

    #[error("Line {line}: {reason}")]
    Row { line: usize, reason: String },

    #[error("Totals exceed the supported numeric range")]
    Overflow,
}
