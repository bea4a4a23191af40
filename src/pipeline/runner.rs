//! Application run: search pages, classify postings, submit eligible ones

use thiserror::Error;
use tracing::{debug, error, info};

use super::classify::{Filters, Verdict, classify};
use super::submit::{Submitter, record_outcome};
use crate::api::{ApiError, JobBoard, Posting, SearchQuery};
use crate::config::Config;
use crate::ledger::{LedgerError, Ledgers};
use crate::observability::{Counter, Metrics, MetricsSnapshot};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Search failed on page {page}: {source}")]
    Search {
        page: u32,
        #[source]
        source: ApiError,
    },

    #[error("Failed to record outcome: {0}")]
    Ledger(#[from] LedgerError),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Classify and count only; nothing is submitted or recorded
    pub dry_run: bool,
    /// Stop after this many pages
    pub max_pages: Option<u32>,
}

/// Counters of a finished (or aborted) run
#[derive(Debug)]
pub struct RunReport {
    pub metrics: MetricsSnapshot,
    /// Set when the run stopped early
    pub error: Option<RunError>,
}

impl RunReport {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Walks the search result pages for one resume
pub struct Runner<'a, B: JobBoard + ?Sized> {
    board: &'a B,
    config: &'a Config,
    resume_id: &'a str,
    options: RunOptions,
    metrics: Metrics,
}

impl<'a, B: JobBoard + ?Sized> Runner<'a, B> {
    pub fn new(board: &'a B, config: &'a Config, resume_id: &'a str, options: RunOptions) -> Self {
        Self {
            board,
            config,
            resume_id,
            options,
            metrics: Metrics::new(),
        }
    }

    /// Run to completion. Counters gathered before a failure are kept in the
    /// report.
    pub async fn run(self, ledgers: &mut Ledgers) -> RunReport {
        let error = self.run_pages(ledgers).await.err();
        if let Some(e) = &error {
            error!(error = %e, "Run aborted");
        }

        RunReport {
            metrics: self.metrics.snapshot(),
            error,
        }
    }

    async fn run_pages(&self, ledgers: &mut Ledgers) -> Result<(), RunError> {
        let query = SearchQuery::from_config(self.config);
        let filters = Filters::from_config(self.config, ledgers.excluded_employers());
        let submitter = Submitter::new(
            self.board,
            self.resume_id,
            self.config.cover_letter.as_deref(),
            &self.config.response_rules,
        );

        info!(
            text = %query.text,
            area = query.area,
            per_page = query.per_page,
            excluded_employers = filters.excluded_employer_count(),
            apply_delay = %self.config.apply_delay,
            dry_run = self.options.dry_run,
            "Starting application run"
        );

        let mut page = 0;
        loop {
            if self.options.max_pages.is_some_and(|max| page >= max) {
                info!(page, "Page limit reached");
                break;
            }

            let results = self
                .board
                .search(&query, page)
                .await
                .map_err(|source| RunError::Search { page, source })?;
            self.metrics.incr(Counter::PagesFetched);

            if results.items.is_empty() {
                debug!(page, "Empty page, stopping");
                break;
            }

            let pages = results.pages;
            info!(page, pages, found = results.found, items = results.items.len(), "Processing page");

            for item in results.items {
                let posting = Posting::from(item);
                self.process(&posting, &filters, &submitter, ledgers).await?;
            }

            if page + 1 >= pages {
                break;
            }
            page += 1;
        }

        Ok(())
    }

    async fn process(
        &self,
        posting: &Posting,
        filters: &Filters,
        submitter: &Submitter<'_, B>,
        ledgers: &mut Ledgers,
    ) -> Result<(), RunError> {
        self.metrics.incr(Counter::PostingsSeen);

        if let Verdict::Skip(reason) = classify(posting, filters, |id| ledgers.is_processed(id)) {
            debug!(vacancy_id = ?posting.id, title = %posting.title, reason = ?reason, "Skipping vacancy");
            self.metrics.incr(reason.counter());
            return Ok(());
        }

        // Eligible postings always carry an id
        let Some(vacancy_id) = posting.id.as_deref() else {
            return Ok(());
        };
        self.metrics.incr(Counter::Eligible);

        if self.options.dry_run {
            info!(vacancy_id, title = %posting.title, city = %posting.city, "Would apply to vacancy");
            return Ok(());
        }

        let outcome = submitter.submit(vacancy_id).await;
        self.metrics.incr(outcome.counter());
        record_outcome(ledgers, posting, vacancy_id, &outcome)?;

        let delay = self.config.apply_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay.as_duration()).await;
        }

        Ok(())
    }
}
