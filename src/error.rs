//! Error types and handling.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{EmployeeId, TimesheetAction, TimesheetId, TimesheetStatus};

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Operation precondition not met for the current state
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(#[from] InvalidTransition),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("{0}")]
    Validation(String),

    /// Seed data could not be loaded
    #[error("Seed error: {0}")]
    Seed(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Rejected transitions, one per guarded operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidTransition {
    #[error("employee {employee_id} is already clocked in")]
    AlreadyClockedIn { employee_id: EmployeeId },

    #[error("employee {employee_id} has no open attendance record on {date}")]
    NotClockedIn { employee_id: EmployeeId, date: NaiveDate },

    #[error("cannot {action} timesheet {timesheet_id} in {from} state")]
    Timesheet {
        timesheet_id: TimesheetId,
        action: TimesheetAction,
        from: TimesheetStatus,
    },

    #[error("employee {employee_id} is clocked in and cannot be removed")]
    EmployeeClockedIn { employee_id: EmployeeId },
}

/// Result type alias for AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Create a not found error with message
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a validation error with message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a seed error with message
    pub fn seed(msg: impl Into<String>) -> Self {
        Self::Seed(msg.into())
    }

    /// Whether this error is a rejected state transition.
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::InvalidStateTransition(_))
    }
}
