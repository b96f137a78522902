use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Default score a listing must reach to count as a match
pub const DEFAULT_MATCH_THRESHOLD: f64 = 90.0;

/// Normalized job posting produced by a listing source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Stable identifier, used as the dedup key
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub experience_level: String,
    #[serde(default)]
    pub job_type: String,
    #[serde(default)]
    pub posted_date: String,
}

impl Listing {
    /// Create a listing with only the identity fields set
    pub fn new(id: impl Into<String>, title: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            company: company.into(),
            ..Default::default()
        }
    }
}

/// Matching preferences, validated once when settings are loaded
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "check_criteria", skip_on_field_errors = false))]
pub struct Criteria {
    #[validate(custom(function = "no_blank_entries"))]
    #[serde(default)]
    pub skills: Vec<String>,
    #[validate(custom(function = "no_blank_entries"))]
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Only used by the listing source to build search queries
    #[validate(custom(function = "no_blank_entries"))]
    #[serde(default)]
    pub companies: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub experience_level: Option<String>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[validate(range(min = 0.0, max = 100.0))]
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,
}

impl Default for Criteria {
    fn default() -> Self {
        Self {
            skills: vec![],
            keywords: vec![],
            companies: vec![],
            location: None,
            experience_level: None,
            job_type: None,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

impl Criteria {
    /// Target location, ignoring blank values
    pub fn target_location(&self) -> Option<&str> {
        non_blank(&self.location)
    }

    /// Target experience level, ignoring blank values
    pub fn target_experience_level(&self) -> Option<&str> {
        non_blank(&self.experience_level)
    }

    /// Target job type, ignoring blank values
    pub fn target_job_type(&self) -> Option<&str> {
        non_blank(&self.job_type)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn default_match_threshold() -> f64 { DEFAULT_MATCH_THRESHOLD }

fn no_blank_entries(values: &Vec<String>) -> Result<(), ValidationError> {
    if values.iter().any(|v| v.trim().is_empty()) {
        return Err(ValidationError::new("blank_entry"));
    }
    Ok(())
}

fn check_criteria(criteria: &Criteria) -> Result<(), ValidationError> {
    // NaN slips through the range check since every comparison with it is false
    if !criteria.match_threshold.is_finite() {
        let mut err = ValidationError::new("threshold_not_finite");
        err.message = Some("match threshold must be a number between 0 and 100".into());
        return Err(err);
    }

    if criteria.keywords.is_empty() && criteria.skills.is_empty() && criteria.companies.is_empty() {
        let mut err = ValidationError::new("no_search_terms");
        err.message = Some("configure at least one keyword, skill or company".into());
        return Err(err);
    }
    Ok(())
}

/// Listing that met the threshold, with its score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredListing {
    pub listing: Listing,
    pub score: f64,
}

/// Points awarded per scoring component
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScoreBreakdown {
    pub skills: f64,
    pub keywords: f64,
    pub location: f64,
    pub meta: f64,
}

impl ScoreBreakdown {
    /// Sum of all components, rounded to 2 decimal places
    pub fn total(&self) -> f64 {
        round_2dp(self.skills + self.keywords + self.location + self.meta)
    }
}

/// Round to 2 decimal places
#[inline]
pub fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Record of a listing that has been notified
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    pub title: String,
    pub company: String,
    pub url: String,
    pub score: f64,
    pub notified_at: chrono::DateTime<chrono::Utc>,
}
