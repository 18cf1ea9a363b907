use crate::devices::{CaptureError, InjectionError};
use thiserror::Error;

/// A specialized `Result` type for controller operations.
pub type AutomationResult<T> = Result<T, AutomationError>;

/// Why an interval text field could not be turned into a duration.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum IntervalError {
    #[error("{field} must be a number (got '{value}')")]
    NotANumber { field: &'static str, value: String },

    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },

    #[error("interval of {total_secs:.3}s is below the minimum of {minimum_secs:.3}s")]
    BelowMinimum { total_secs: f64, minimum_secs: f64 },
}

/// The error type for all controller operations.
#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("Invalid interval: {source}")]
    InvalidInterval {
        #[from]
        source: IntervalError,
    },

    #[error("Input injection failed: {source}")]
    Injection {
        #[from]
        source: InjectionError,
    },

    #[error("Frame capture failed: {source}")]
    Capture {
        #[from]
        source: CaptureError,
    },

    #[error("Another action sequence is using the input device")]
    BusyConflict,

    #[error("No action data available for '{key}' (catalog has {catalog_len} entries)")]
    MissingActionData { key: String, catalog_len: usize },

    #[error("No hotkey rebind is in progress")]
    NotRebinding,
}

impl AutomationError {
    /// Errors that only cost the current tick; the loop keeps going.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AutomationError::Injection { .. }
                | AutomationError::Capture { .. }
                | AutomationError::BusyConflict
                | AutomationError::MissingActionData { .. }
        )
    }
}
