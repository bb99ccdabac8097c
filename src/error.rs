//! Error taxonomy for the analytics engine.
//!
//! Query components never fail on "no qualifying data": they return an empty
//! collection or `None`. Only input integrity and unsatisfiable constraints
//! surface as errors.

use thiserror::Error;

/// Top-level analytics error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// Input integrity violation. Fatal to the affected innings' model.
    #[error("Malformed event in innings {innings} at {over}.{ball}: {reason}")]
    MalformedEvent {
        innings: u8,
        over: u32,
        ball: u32,
        reason: String,
    },

    /// The bowling allocation constraints cannot be satisfied.
    #[error("Allocation infeasible: quota of {quota} overs exceeds combined cap of {capacity}")]
    AllocationInfeasible { quota: u32, capacity: u32 },

    #[error("Feed error: {0}")]
    Feed(String),

    #[error("Encoding error: {0}")]
    Encode(String),

    /// The query cache lock was poisoned by a panicking writer.
    #[error("Query cache unavailable: {0}")]
    Cache(String),
}

impl AnalyticsError {
    pub fn malformed(innings: u8, over: u32, ball: u32, reason: impl Into<String>) -> Self {
        AnalyticsError::MalformedEvent {
            innings,
            over,
            ball,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for AnalyticsError {
    fn from(err: serde_json::Error) -> Self {
        AnalyticsError::Encode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
