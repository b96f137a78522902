//! Job Scout - scheduled job listing matcher
//!
//! This library scores job listings against configured criteria, keeps the
//! ones that reach the match threshold, drops anything already notified
//! according to a durable ledger, and sends the rest as a digest over the
//! configured notification channels.

pub mod config;
pub mod core;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use crate::core::{score_listing, Matcher, Pipeline, PipelineError};
pub use crate::models::{Criteria, CycleOutcome, CycleReport, LedgerEntry, Listing, ScoredListing};
pub use crate::services::{Dispatcher, Ledger, ListingSource, Notifier};
