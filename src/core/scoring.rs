use crate::models::{Criteria, Listing, ScoreBreakdown};
use crate::core::filters::{
    contains_ignore_case, count_matching_terms, matches_field_or_description, searchable_text,
};

/// Weight of the skills component
pub const WEIGHT_SKILLS: f64 = 80.0;
/// Weight of the keywords component
pub const WEIGHT_KEYWORDS: f64 = 10.0;
/// Weight of the location component
pub const WEIGHT_LOCATION: f64 = 5.0;
/// Weight of the experience level + job type component
pub const WEIGHT_META: f64 = 5.0;

/// Skill matches needed for full skill points, at minimum
const MIN_EXPECTED_SKILLS: usize = 3;

/// Calculate a match score (0-100) for a listing against criteria
///
/// Scoring formula:
/// score = (
///     skills_ratio * 80 +      # skills found in title or description
///     keyword_ratio * 10 +     # keywords found in title or description
///     location_match * 5 +     # target location inside listing location
///     meta_ratio * 5           # experience level / job type
/// )
///
/// A category with nothing configured awards its full weight. The result
/// is rounded to 2 decimal places.
pub fn score_listing(listing: &Listing, criteria: &Criteria) -> f64 {
    score_breakdown(listing, criteria).total()
}

/// Per-component points for a listing, before rounding
pub fn score_breakdown(listing: &Listing, criteria: &Criteria) -> ScoreBreakdown {
    let text = searchable_text(listing);

    ScoreBreakdown {
        skills: calculate_skills_score(&text, &criteria.skills),
        keywords: calculate_keywords_score(&text, &criteria.keywords),
        location: calculate_location_score(&listing.location, criteria.target_location()),
        meta: calculate_meta_score(
            listing,
            criteria.target_experience_level(),
            criteria.target_job_type(),
        ),
    }
}

/// Skill points
///
/// Full points once a third of the configured skills match (never fewer
/// than 3), since no single posting lists every skill.
#[inline]
fn calculate_skills_score(text: &str, skills: &[String]) -> f64 {
    if skills.is_empty() {
        return WEIGHT_SKILLS;
    }

    let matched = count_matching_terms(text, skills) as f64;
    let expected = MIN_EXPECTED_SKILLS.max(skills.len() / 3) as f64;
    let ratio = (matched / expected).min(1.0);

    ratio * WEIGHT_SKILLS
}

/// Keyword points, proportional to the share of keywords found
#[inline]
fn calculate_keywords_score(text: &str, keywords: &[String]) -> f64 {
    if keywords.is_empty() {
        return WEIGHT_KEYWORDS;
    }

    let matched = count_matching_terms(text, keywords) as f64;
    (matched / keywords.len() as f64) * WEIGHT_KEYWORDS
}

/// Location points, all or nothing
#[inline]
fn calculate_location_score(listing_location: &str, target: Option<&str>) -> f64 {
    match target {
        None => WEIGHT_LOCATION,
        Some(target) if contains_ignore_case(listing_location, target) => WEIGHT_LOCATION,
        Some(_) => 0.0,
    }
}

/// Experience level and job type points
///
/// Description text counts as a match for either check.
#[inline]
fn calculate_meta_score(
    listing: &Listing,
    target_experience: Option<&str>,
    target_job_type: Option<&str>,
) -> f64 {
    let checks = [
        target_experience.map(|t| (t, listing.experience_level.as_str())),
        target_job_type.map(|t| (t, listing.job_type.as_str())),
    ];

    let mut active = 0u32;
    let mut matched = 0u32;
    for (target, field) in checks.into_iter().flatten() {
        active += 1;
        if matches_field_or_description(target, field, &listing.description) {
            matched += 1;
        }
    }

    if active == 0 {
        return WEIGHT_META;
    }

    (matched as f64 / active as f64) * WEIGHT_META
}
