// Core algorithm exports
pub mod filters;
pub mod matcher;
pub mod pipeline;
pub mod scoring;

pub use filters::{contains_ignore_case, count_matching_terms, searchable_text};
pub use matcher::{Matcher, MatchResult};
pub use pipeline::{Pipeline, PipelineError};
pub use scoring::{score_breakdown, score_listing};
