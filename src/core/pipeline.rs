use thiserror::Error;

use crate::config::LedgerSettings;
use crate::core::matcher::Matcher;
use crate::models::{CycleOutcome, CycleReport, ScoredListing};
use crate::services::{Dispatcher, Ledger, LedgerError, ListingSource};

/// Errors that abort a pipeline cycle
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Runs fetch -> score -> filter -> dedup -> notify -> record -> expire
///
/// Holds no state between cycles; everything that must survive lives in
/// the ledger.
pub struct Pipeline {
    source: Box<dyn ListingSource>,
    matcher: Matcher,
    dispatcher: Dispatcher,
    retention_days: u32,
}

impl Pipeline {
    pub fn new(
        source: Box<dyn ListingSource>,
        matcher: Matcher,
        dispatcher: Dispatcher,
        retention_days: u32,
    ) -> Self {
        Self {
            source,
            matcher,
            dispatcher,
            retention_days,
        }
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Run one cycle with a ledger opened for this cycle only
    ///
    /// The ledger is closed on every path, including errors.
    pub async fn run_scoped(&self, settings: &LedgerSettings) -> Result<CycleReport, PipelineError> {
        let ledger = Ledger::from_settings(settings).await?;
        let result = self.run_cycle(&ledger).await;
        ledger.close().await;
        result
    }

    /// Run one cycle against an open ledger
    pub async fn run_cycle(&self, ledger: &Ledger) -> Result<CycleReport, PipelineError> {
        tracing::info!("Starting job fetch cycle");

        // 1. Fetch
        let listings = self.source.fetch(self.matcher.criteria()).await;
        let fetched = listings.len();
        if listings.is_empty() {
            tracing::info!("No jobs fetched this cycle");
            return Ok(CycleReport::stopped(CycleOutcome::NoListings, 0, 0));
        }

        // 2. Score and filter
        let result = self.matcher.find_matches(listings);
        let matched = result.matches.len();
        if result.matches.is_empty() {
            tracing::info!("No jobs matched the threshold this cycle");
            return Ok(CycleReport::stopped(CycleOutcome::NoMatches, fetched, 0));
        }

        // 3. Drop anything already notified
        let mut new_matches: Vec<ScoredListing> = Vec::with_capacity(matched);
        for scored in result.matches {
            if ledger.exists(&scored.listing.id).await? {
                tracing::debug!("Job {} already notified, skipping", scored.listing.id);
            } else {
                new_matches.push(scored);
            }
        }

        if new_matches.is_empty() {
            tracing::info!("All matched jobs were already notified previously");
            return Ok(CycleReport::stopped(CycleOutcome::AlreadyNotified, fetched, matched));
        }

        tracing::info!("{} new matching job(s) to notify about", new_matches.len());

        // 4. Notify, best effort per channel
        let deliveries = self.dispatcher.notify_all(&new_matches).await;
        let delivered_channels = deliveries.iter().filter(|d| d.success).count();
        let failed_channels = deliveries.len() - delivered_channels;

        // 5. Record
        let mut recorded = 0;
        for scored in &new_matches {
            if ledger.record(&scored.listing, scored.score).await? {
                recorded += 1;
            }
        }

        // 6. Expire
        let expired = ledger.expire(self.retention_days).await?;

        tracing::info!(
            fetched,
            matched,
            new_matches = new_matches.len(),
            recorded,
            expired,
            "Cycle complete"
        );

        Ok(CycleReport {
            outcome: CycleOutcome::Notified,
            fetched,
            matched,
            new_matches: new_matches.len(),
            delivered_channels,
            failed_channels,
            recorded,
            expired,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Criteria, Listing};

    struct StaticSource(Vec<Listing>);

    #[async_trait::async_trait]
    impl ListingSource for StaticSource {
        async fn fetch(&self, _criteria: &Criteria) -> Vec<Listing> {
            self.0.clone()
        }
    }

    fn create_pipeline(listings: Vec<Listing>, threshold: f64) -> Pipeline {
        let criteria = Criteria {
            skills: vec!["Rust".to_string()],
            match_threshold: threshold,
            ..Default::default()
        };
        Pipeline::new(
            Box::new(StaticSource(listings)),
            Matcher::new(criteria),
            Dispatcher::empty(),
            30,
        )
    }

    #[tokio::test]
    async fn test_no_listings_stops_early() {
        let ledger = Ledger::in_memory().await.unwrap();
        let report = create_pipeline(vec![], 90.0).run_cycle(&ledger).await.unwrap();

        assert_eq!(report.outcome, CycleOutcome::NoListings);
        assert_eq!(ledger.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_no_matches_stops_early() {
        let ledger = Ledger::in_memory().await.unwrap();
        let listing = Listing::new("1", "Gardener", "Acme");
        let report = create_pipeline(vec![listing], 90.0).run_cycle(&ledger).await.unwrap();

        assert_eq!(report.outcome, CycleOutcome::NoMatches);
        assert_eq!(report.fetched, 1);
        assert_eq!(ledger.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_records_even_without_channels() {
        let ledger = Ledger::in_memory().await.unwrap();
        // One skill configured, expected stays 3: 1/3 * 80 + 20 = 46.67
        let listing = Listing::new("1", "Rust Engineer", "Acme");
        let report = create_pipeline(vec![listing], 40.0).run_cycle(&ledger).await.unwrap();

        assert_eq!(report.outcome, CycleOutcome::Notified);
        assert_eq!(report.delivered_channels, 0);
        assert_eq!(report.recorded, 1);
        assert_eq!(ledger.get("1").await.unwrap().unwrap().score, 46.67);
    }

    #[tokio::test]
    async fn test_already_notified_stops_before_dispatch() {
        let ledger = Ledger::in_memory().await.unwrap();
        let listing = Listing::new("1", "Rust Engineer", "Acme");
        ledger.record(&listing, 50.0).await.unwrap();

        let report = create_pipeline(vec![listing], 40.0).run_cycle(&ledger).await.unwrap();

        assert_eq!(report.outcome, CycleOutcome::AlreadyNotified);
        assert_eq!(report.matched, 1);
        assert_eq!(ledger.get("1").await.unwrap().unwrap().score, 50.0);
    }
}
