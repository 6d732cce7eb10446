use thiserror::Error;

/// Error types for smoothing and differentiation operations
#[derive(Debug, Error)]
pub enum SmoothError {
    /// Window size must be odd and at least 1
    #[error("Invalid window size: {0}. Window size must be odd and at least 1")]
    InvalidWindowSize(usize),
    /// Polynomial order must be less than window size
    #[error("Invalid polynomial order: {0}. Must be less than window size ({1})")]
    InvalidPolynomialOrder(usize, usize),
    /// Gaussian spread must be finite and non-negative
    #[error("Invalid sigma: {sigma} (derivative order {order})")]
    InvalidSigma { sigma: f64, order: usize },
    /// Sample spacing must be finite and non-zero
    #[error("Invalid sample spacing: {0}")]
    InvalidDelta(f64),
    /// Requested index tier does not exist
    #[error("Index level {level} out of range for an index with {levels} level(s)")]
    LevelOutOfRange { level: isize, levels: usize },
    /// Index tier cannot serve as a numeric coordinate axis
    #[error("Index level {0} is not numeric")]
    NonNumericLevel(usize),
    /// CSV header does not contain the requested column
    #[error("Unknown column: {0}")]
    UnknownColumn(String),
    /// Input data is too short for the requested operation
    #[error("Insufficient data: {0} points. Need at least {1}")]
    InsufficientData(usize, usize),
    /// Values and labels (or two aligned sequences) disagree in length
    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    /// CSV value field is neither a number nor a missing-value marker
    #[error("Invalid value {field:?} in column {column} at line {line}")]
    InvalidValue {
        line: u64,
        column: String,
        field: String,
    },
    /// Mathematical computation error (e.g., singular matrix)
    #[error("Computation error: {0}")]
    Computation(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl SmoothError {
    /// Whether the error stems from an invalid parameter combination rather than the data.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SmoothError::InvalidWindowSize(_)
                | SmoothError::InvalidPolynomialOrder(..)
                | SmoothError::InvalidSigma { .. }
                | SmoothError::InvalidDelta(_)
                | SmoothError::LevelOutOfRange { .. }
                | SmoothError::NonNumericLevel(_)
                | SmoothError::UnknownColumn(_)
        )
    }
}

/// Result type for smoothing operations
pub type Result<T> = std::result::Result<T, SmoothError>;
