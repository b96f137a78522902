use serde::Serialize;

/// Where a pipeline cycle stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleOutcome {
    /// The source returned nothing
    NoListings,
    /// Nothing reached the match threshold
    NoMatches,
    /// Every match was already in the ledger
    AlreadyNotified,
    /// New matches were dispatched and recorded
    Notified,
}

/// Summary of one pipeline cycle
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub outcome: CycleOutcome,
    pub fetched: usize,
    pub matched: usize,
    pub new_matches: usize,
    /// Channels that accepted the digest
    pub delivered_channels: usize,
    /// Channels that failed to deliver
    pub failed_channels: usize,
    pub recorded: usize,
    pub expired: u64,
}

impl CycleReport {
    pub(crate) fn stopped(outcome: CycleOutcome, fetched: usize, matched: usize) -> Self {
        Self {
            outcome,
            fetched,
            matched,
            new_matches: 0,
            delivered_channels: 0,
            failed_channels: 0,
            recorded: 0,
            expired: 0,
        }
    }
}
