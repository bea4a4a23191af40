//! The `exclude-employers` command: turn employer profile URLs into entries
//! of the excluded employers ledger.
//!
//! A URL is accepted when its host is the platform's site domain (or a
//! subdomain such as `spb.hh.ru`) and its path has an `employer` segment
//! followed by the id, e.g. `https://hh.ru/employer/3529`. The employer is
//! looked up before it is recorded, so typos never reach the ledger.

use async_trait::async_trait;
use reqwest::Url;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{self, ApiClient, Employer};
use crate::ledger::{LedgerError, LedgerKind, LedgerRecord, Ledgers};

pub const DEFAULT_URLS_FILE: &str = "employerURLs";

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Failed to read {path}: {source}")]
    ReadUrls {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("{url} is not a {site_host} address")]
    ForeignHost { url: String, site_host: String },

    #[error("No employer id in {0}")]
    MissingId(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Employer profile lookup
#[async_trait]
pub trait EmployerLookup: Send + Sync {
    async fn employer(&self, employer_id: &str) -> api::Result<Employer>;
}

#[async_trait]
impl EmployerLookup for ApiClient {
    async fn employer(&self, employer_id: &str) -> api::Result<Employer> {
        ApiClient::employer(self, employer_id).await
    }
}

/// Extract the employer id from a profile URL
pub fn parse_employer_id(url: &str, site_host: &str) -> Result<String, ResolveError> {
    let parsed = Url::parse(url.trim()).map_err(|e| ResolveError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let host = parsed.host_str().unwrap_or_default().to_lowercase();
    let site_host = site_host.to_lowercase();
    if host != site_host && !host.ends_with(&format!(".{}", site_host)) {
        return Err(ResolveError::ForeignHost {
            url: url.to_string(),
            site_host,
        });
    }

    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|segment| !segment.is_empty()).collect())
        .unwrap_or_default();

    segments
        .iter()
        .position(|segment| *segment == "employer")
        .and_then(|index| segments.get(index + 1))
        .map(|id| id.to_string())
        .ok_or_else(|| ResolveError::MissingId(url.to_string()))
}

/// Non-blank lines of the URL file
pub fn read_urls(path: &Path) -> Result<Vec<String>, ResolveError> {
    let content = std::fs::read_to_string(path).map_err(|source| ResolveError::ReadUrls {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveReport {
    pub added: usize,
    pub already_excluded: usize,
    pub invalid: usize,
    pub lookup_failed: usize,
}

impl fmt::Display for ResolveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Added:             {}", self.added)?;
        writeln!(f, "Already excluded:  {}", self.already_excluded)?;
        writeln!(f, "Invalid URLs:      {}", self.invalid)?;
        write!(f, "Lookup failed:     {}", self.lookup_failed)
    }
}

/// Resolve every URL and append new employers to the exclusion ledger.
///
/// Bad URLs and failed lookups are reported and skipped; only a ledger
/// write failure stops the command.
pub async fn exclude_employers<L>(
    lookup: &L,
    urls: &[String],
    site_host: &str,
    ledgers: &mut Ledgers,
) -> Result<ResolveReport, ResolveError>
where
    L: EmployerLookup + ?Sized,
{
    let mut report = ResolveReport::default();

    for url in urls {
        let employer_id = match parse_employer_id(url, site_host) {
            Ok(id) => id,
            Err(e) => {
                warn!(url = %url, error = %e, "Skipping URL");
                report.invalid += 1;
                continue;
            }
        };

        if ledgers.is_excluded_employer(&employer_id) {
            info!(employer_id = %employer_id, "Employer is already excluded");
            report.already_excluded += 1;
            continue;
        }

        match lookup.employer(&employer_id).await {
            Ok(employer) => {
                ledgers.record(
                    LedgerKind::ExcludedEmployers,
                    &LedgerRecord::new(employer_id.as_str(), employer.name.as_str(), ""),
                )?;
                info!(employer_id = %employer_id, name = %employer.name, "Employer excluded");
                report.added += 1;
            }
            Err(e) => {
                warn!(employer_id = %employer_id, url = %url, error = %e, "Failed to look up employer");
                report.lookup_failed += 1;
            }
        }
    }

    Ok(report)
}
