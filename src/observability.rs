//! Tracing setup and run counters

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber, filtered by `RUST_LOG` (default `info`)
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Events counted during an application run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    PagesFetched,
    PostingsSeen,
    SkippedMissingId,
    SkippedDuplicate,
    SkippedEmployer,
    SkippedCity,
    SkippedNoKeyword,
    SkippedExcludedWord,
    Eligible,
    Applied,
    AlreadyApplied,
    ActionRequired,
    Failed,
}

impl Counter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Counter::PagesFetched => "pages_fetched",
            Counter::PostingsSeen => "postings_seen",
            Counter::SkippedMissingId => "skipped_missing_id",
            Counter::SkippedDuplicate => "skipped_duplicate",
            Counter::SkippedEmployer => "skipped_employer",
            Counter::SkippedCity => "skipped_city",
            Counter::SkippedNoKeyword => "skipped_no_keyword",
            Counter::SkippedExcludedWord => "skipped_excluded_word",
            Counter::Eligible => "eligible",
            Counter::Applied => "applied",
            Counter::AlreadyApplied => "already_applied",
            Counter::ActionRequired => "action_required",
            Counter::Failed => "failed",
        }
    }
}

/// Metrics handle for recording run counters
#[derive(Debug, Default)]
pub struct Metrics {
    pages_fetched: AtomicU64,
    postings_seen: AtomicU64,
    skipped_missing_id: AtomicU64,
    skipped_duplicate: AtomicU64,
    skipped_employer: AtomicU64,
    skipped_city: AtomicU64,
    skipped_no_keyword: AtomicU64,
    skipped_excluded_word: AtomicU64,
    eligible: AtomicU64,
    applied: AtomicU64,
    already_applied: AtomicU64,
    action_required: AtomicU64,
    failed: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, counter: Counter) -> &AtomicU64 {
        match counter {
            Counter::PagesFetched => &self.pages_fetched,
            Counter::PostingsSeen => &self.postings_seen,
            Counter::SkippedMissingId => &self.skipped_missing_id,
            Counter::SkippedDuplicate => &self.skipped_duplicate,
            Counter::SkippedEmployer => &self.skipped_employer,
            Counter::SkippedCity => &self.skipped_city,
            Counter::SkippedNoKeyword => &self.skipped_no_keyword,
            Counter::SkippedExcludedWord => &self.skipped_excluded_word,
            Counter::Eligible => &self.eligible,
            Counter::Applied => &self.applied,
            Counter::AlreadyApplied => &self.already_applied,
            Counter::ActionRequired => &self.action_required,
            Counter::Failed => &self.failed,
        }
    }

    pub fn incr(&self, counter: Counter) {
        self.slot(counter).fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = counter.as_str(), "Metric incremented");
    }

    pub fn get(&self, counter: Counter) -> u64 {
        self.slot(counter).load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            pages_fetched: self.get(Counter::PagesFetched),
            postings_seen: self.get(Counter::PostingsSeen),
            skipped_missing_id: self.get(Counter::SkippedMissingId),
            skipped_duplicate: self.get(Counter::SkippedDuplicate),
            skipped_employer: self.get(Counter::SkippedEmployer),
            skipped_city: self.get(Counter::SkippedCity),
            skipped_no_keyword: self.get(Counter::SkippedNoKeyword),
            skipped_excluded_word: self.get(Counter::SkippedExcludedWord),
            eligible: self.get(Counter::Eligible),
            applied: self.get(Counter::Applied),
            already_applied: self.get(Counter::AlreadyApplied),
            action_required: self.get(Counter::ActionRequired),
            failed: self.get(Counter::Failed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub pages_fetched: u64,
    pub postings_seen: u64,
    pub skipped_missing_id: u64,
    pub skipped_duplicate: u64,
    pub skipped_employer: u64,
    pub skipped_city: u64,
    pub skipped_no_keyword: u64,
    pub skipped_excluded_word: u64,
    pub eligible: u64,
    pub applied: u64,
    pub already_applied: u64,
    pub action_required: u64,
    pub failed: u64,
}

impl MetricsSnapshot {
    pub fn skipped(&self) -> u64 {
        self.skipped_missing_id
            + self.skipped_duplicate
            + self.skipped_employer
            + self.skipped_city
            + self.skipped_no_keyword
            + self.skipped_excluded_word
    }
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pages fetched:        {}", self.pages_fetched)?;
        writeln!(f, "Postings seen:        {}", self.postings_seen)?;
        writeln!(f, "Eligible:             {}", self.eligible)?;
        writeln!(f, "Applied:              {}", self.applied)?;
        writeln!(f, "Already applied:      {}", self.already_applied)?;
        writeln!(f, "Action required:      {}", self.action_required)?;
        writeln!(f, "Failed:               {}", self.failed)?;
        writeln!(f, "Skipped:              {}", self.skipped())?;
        writeln!(f, "  duplicate:          {}", self.skipped_duplicate)?;
        writeln!(f, "  excluded employer:  {}", self.skipped_employer)?;
        writeln!(f, "  excluded city:      {}", self.skipped_city)?;
        writeln!(f, "  no keyword:         {}", self.skipped_no_keyword)?;
        writeln!(f, "  excluded word:      {}", self.skipped_excluded_word)?;
        write!(f, "  missing id:         {}", self.skipped_missing_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_snapshot() {
        let metrics = Metrics::new();
        metrics.incr(Counter::Applied);
        metrics.incr(Counter::Applied);
        metrics.incr(Counter::SkippedCity);
        metrics.incr(Counter::SkippedDuplicate);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.applied, 2);
        assert_eq!(snapshot.skipped_city, 1);
        assert_eq!(snapshot.skipped(), 2);
        assert_eq!(snapshot.failed, 0);
    }

    #[test]
    fn test_snapshot_display_lists_outcomes() {
        let snapshot = MetricsSnapshot {
            applied: 3,
            action_required: 1,
            ..Default::default()
        };
        let rendered = snapshot.to_string();
        assert!(rendered.contains("Applied:              3"));
        assert!(rendered.contains("Action required:      1"));
    }
}
