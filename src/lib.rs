//! Ball-by-ball cricket match analytics.
//!
//! A match feed is folded into an immutable [`model::MatchModel`]; the
//! [`engine`] components answer read-only queries over it, and [`report`]
//! assembles and memoises the named results.

pub mod config;
pub mod dashboard;
pub mod engine;
pub mod error;
pub mod model;
pub mod report;

pub use error::{AnalyticsError, Result};
pub use model::{MatchFeed, MatchModel, Team};
pub use report::{AnalysisSettings, AnalyticsEngine, MatchReport};
