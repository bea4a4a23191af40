//! Eligibility gate for search results

use std::collections::HashSet;

use crate::api::Posting;
use crate::config::Config;
use crate::observability::Counter;

/// Why a posting was not submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingId,
    Duplicate,
    ExcludedEmployer,
    ExcludedCity,
    NoKeyword,
    ExcludedWord,
}

impl SkipReason {
    pub fn counter(&self) -> Counter {
        match self {
            SkipReason::MissingId => Counter::SkippedMissingId,
            SkipReason::Duplicate => Counter::SkippedDuplicate,
            SkipReason::ExcludedEmployer => Counter::SkippedEmployer,
            SkipReason::ExcludedCity => Counter::SkippedCity,
            SkipReason::NoKeyword => Counter::SkippedNoKeyword,
            SkipReason::ExcludedWord => Counter::SkippedExcludedWord,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Eligible,
    Skip(SkipReason),
}

impl Verdict {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Verdict::Eligible)
    }
}

/// Exclusion sets and keywords, fixed for the duration of a run
#[derive(Debug, Clone, Default)]
pub struct Filters {
    keywords: Vec<String>,
    excluded_words: Vec<String>,
    excluded_cities: HashSet<String>,
    excluded_employers: HashSet<String>,
}

impl Filters {
    /// Keywords and excluded words are matched case-insensitively, cities exactly
    pub fn new<I, J, K, L>(keywords: I, excluded_words: J, excluded_cities: K, excluded_employers: L) -> Self
    where
        I: IntoIterator<Item = String>,
        J: IntoIterator<Item = String>,
        K: IntoIterator<Item = String>,
        L: IntoIterator<Item = String>,
    {
        Self {
            keywords: keywords.into_iter().map(|k| k.to_lowercase()).collect(),
            excluded_words: excluded_words.into_iter().map(|w| w.to_lowercase()).collect(),
            excluded_cities: excluded_cities.into_iter().collect(),
            excluded_employers: excluded_employers.into_iter().collect(),
        }
    }

    pub fn from_config(config: &Config, excluded_employers: HashSet<String>) -> Self {
        Self::new(
            config.keywords.iter().cloned(),
            config.excluded_words.iter().cloned(),
            config.excluded_cities.iter().cloned(),
            excluded_employers,
        )
    }

    pub fn excluded_employer_count(&self) -> usize {
        self.excluded_employers.len()
    }
}

/// Decide whether a posting should be submitted; the first failing rule wins.
///
/// `is_processed` reports whether a posting id already has a recorded outcome.
pub fn classify<F>(posting: &Posting, filters: &Filters, is_processed: F) -> Verdict
where
    F: Fn(&str) -> bool,
{
    let Some(id) = posting.id.as_deref() else {
        return Verdict::Skip(SkipReason::MissingId);
    };

    if is_processed(id) {
        return Verdict::Skip(SkipReason::Duplicate);
    }

    if posting
        .employer_id
        .as_deref()
        .is_some_and(|employer| filters.excluded_employers.contains(employer))
    {
        return Verdict::Skip(SkipReason::ExcludedEmployer);
    }

    if filters.excluded_cities.contains(&posting.city) {
        return Verdict::Skip(SkipReason::ExcludedCity);
    }

    let title = posting.title.to_lowercase();

    if !filters.keywords.iter().any(|keyword| title.contains(keyword.as_str())) {
        return Verdict::Skip(SkipReason::NoKeyword);
    }

    if filters.excluded_words.iter().any(|word| title.contains(word.as_str())) {
        return Verdict::Skip(SkipReason::ExcludedWord);
    }

    Verdict::Eligible
}
