use std::fmt;

use thiserror::Error;

use crate::constraints::TimeRejection;
use crate::session::Step;

/// Errors produced by the booking workflow core.
///
/// Every variant that reaches a caller leaves the [`crate::BookingSession`]
/// in its last valid state; a rejected transition never partially merges
/// input.
#[derive(Debug, Error)]
pub enum BookingError {
    /// Input was rejected for the current step. Recoverable: the caller
    /// re-prompts the user and the session is unchanged.
    #[error("invalid input for step {step}: {reason}")]
    Validation { step: Step, reason: String },

    /// A customization count outside its supported range. Rejected at input
    /// time, before anything reaches the pricing engine.
    #[error("{kind} count {given} is outside the supported range {min}..={max}")]
    InvalidCount {
        kind: CountKind,
        given: u8,
        min: u8,
        max: u8,
    },

    /// A candidate time slot violated the scheduling rules. Surfaced to the
    /// user as a dialog; the step is not advanced.
    #[error(transparent)]
    TimeConstraint(#[from] TimeRejection),

    /// `retreat` was called at the first step of the flow.
    #[error("no previous step to return to")]
    NoHistory,

    /// `advance` or `retreat` was called on a completed booking. A new
    /// session must be created to book again.
    #[error("booking is already complete")]
    TerminalState,

    /// The selected service id does not exist in the catalog.
    #[error("unknown service: {0}")]
    UnknownService(String),

    /// No session with the given id exists in storage.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// A collaborator call failed. The session is retained in memory so the
    /// user can resubmit without re-entering anything.
    #[error("persistence failure: {0}")]
    Persistence(String),
}

/// Which customization count was out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountKind {
    Toilet,
    Fridge,
}

impl fmt::Display for CountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountKind::Toilet => write!(f, "toilet"),
            CountKind::Fridge => write!(f, "refrigerator"),
        }
    }
}

pub type Result<T> = std::result::Result<T, BookingError>;
