use crate::models::{Criteria, Listing, ScoredListing};
use crate::core::scoring::score_listing;

/// Result of the matching process
#[derive(Debug)]
pub struct MatchResult {
    pub matches: Vec<ScoredListing>,
    pub total_listings: usize,
}

/// Scores listings against criteria and keeps the ones at or above the
/// threshold
///
/// Matches come back in the order the listings were given. No sorting and
/// no deduplication happen here.
#[derive(Debug, Clone)]
pub struct Matcher {
    criteria: Criteria,
}

impl Matcher {
    pub fn new(criteria: Criteria) -> Self {
        Self { criteria }
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    pub fn threshold(&self) -> f64 {
        self.criteria.match_threshold
    }

    /// Score every listing and keep those meeting the threshold
    pub fn find_matches(&self, listings: Vec<Listing>) -> MatchResult {
        let total_listings = listings.len();
        let threshold = self.threshold();

        let matches: Vec<ScoredListing> = listings
            .into_iter()
            .filter_map(|listing| {
                let score = score_listing(&listing, &self.criteria);
                tracing::debug!(
                    "Job '{}' at '{}' scored {:.1}%",
                    listing.title,
                    listing.company,
                    score
                );

                if score >= threshold {
                    tracing::info!(
                        "MATCH: '{}' at '{}' - {:.1}%",
                        listing.title,
                        listing.company,
                        score
                    );
                    Some(ScoredListing { listing, score })
                } else {
                    None
                }
            })
            .collect();

        tracing::info!(
            "{} jobs matched out of {} (threshold: {}%)",
            matches.len(),
            total_listings,
            threshold
        );

        MatchResult {
            matches,
            total_listings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_listing(id: &str, title: &str, description: &str) -> Listing {
        Listing {
            id: id.to_string(),
            title: title.to_string(),
            company: format!("Company {}", id),
            description: description.to_string(),
            ..Default::default()
        }
    }

    fn create_criteria(threshold: f64) -> Criteria {
        Criteria {
            skills: vec!["Python".to_string(), "SQL".to_string(), "Docker".to_string()],
            match_threshold: threshold,
            ..Default::default()
        }
    }

    #[test]
    fn test_find_matches_basic() {
        let matcher = Matcher::new(create_criteria(90.0));

        let listings = vec![
            create_listing("1", "Python Engineer", "SQL and Docker"), // 100
            create_listing("2", "Python Engineer", "no database"),    // 46.67
            create_listing("3", "Designer", "Figma"),                 // 20
        ];

        let result = matcher.find_matches(listings);

        assert_eq!(result.total_listings, 3);
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].listing.id, "1");
        assert_eq!(result.matches[0].score, 100.0);
    }

    #[test]
    fn test_preserves_input_order() {
        let matcher = Matcher::new(create_criteria(40.0));

        let listings = vec![
            create_listing("low", "Python", ""),                 // 46.67
            create_listing("high", "Python SQL Docker", ""),     // 100
            create_listing("mid", "Python SQL", ""),             // 73.33
        ];

        let result = matcher.find_matches(listings);
        let ids: Vec<&str> = result.matches.iter().map(|m| m.listing.id.as_str()).collect();

        assert_eq!(ids, vec!["low", "high", "mid"]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let matcher = Matcher::new(create_criteria(46.67));
        let result = matcher.find_matches(vec![create_listing("1", "Python", "")]);

        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].score, 46.67);
    }

    #[test]
    fn test_does_not_deduplicate() {
        let matcher = Matcher::new(create_criteria(90.0));
        let listings = vec![
            create_listing("1", "Python SQL Docker", ""),
            create_listing("1", "Python SQL Docker", ""),
        ];

        assert_eq!(matcher.find_matches(listings).matches.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        let matcher = Matcher::new(create_criteria(90.0));
        let result = matcher.find_matches(vec![]);

        assert!(result.matches.is_empty());
        assert_eq!(result.total_listings, 0);
    }
}
