// Model exports
pub mod domain;
pub mod report;

pub use domain::{Listing, Criteria, ScoredListing, ScoreBreakdown, LedgerEntry, DEFAULT_MATCH_THRESHOLD};
pub use report::{CycleReport, CycleOutcome};
