//! Application submission and response classification

use tracing::{info, warn};

use crate::api::{Application, ApplyResponse, JobBoard, Posting};
use crate::config::{ResponseRule, RuleOutcome};
use crate::ledger::{self, LedgerKind, LedgerRecord, Ledgers};
use crate::observability::Counter;

const STATUS_CREATED: u16 = 201;

/// Result of one application attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Success,
    AlreadyApplied,
    /// The platform wants more input first (cover letter, test)
    ActionRequired(String),
    /// Anything else; not recorded, so the posting is retried next run
    Error { status: Option<u16>, message: String },
}

impl ApplyOutcome {
    /// Ledger the outcome is recorded in
    pub fn ledger(&self) -> Option<LedgerKind> {
        match self {
            ApplyOutcome::Success => Some(LedgerKind::Applied),
            ApplyOutcome::AlreadyApplied => Some(LedgerKind::AlreadyApplied),
            ApplyOutcome::ActionRequired(_) => Some(LedgerKind::ActionRequired),
            ApplyOutcome::Error { .. } => None,
        }
    }

    pub fn counter(&self) -> Counter {
        match self {
            ApplyOutcome::Success => Counter::Applied,
            ApplyOutcome::AlreadyApplied => Counter::AlreadyApplied,
            ApplyOutcome::ActionRequired(_) => Counter::ActionRequired,
            ApplyOutcome::Error { .. } => Counter::Failed,
        }
    }
}

/// Map the platform's answer to an outcome.
///
/// 201 is success. Otherwise the first rule whose status matches (or that
/// names none) and whose pattern occurs in the body decides; the substring
/// match ignores case.
pub fn classify_response(response: &ApplyResponse, rules: &[ResponseRule]) -> ApplyOutcome {
    if response.status == STATUS_CREATED {
        return ApplyOutcome::Success;
    }

    let body = response.body.to_lowercase();
    let matched = rules.iter().find(|rule| {
        rule.status.is_none_or(|status| status == response.status)
            && body.contains(&rule.pattern.to_lowercase())
    });

    match matched {
        Some(rule) => match rule.outcome {
            RuleOutcome::AlreadyApplied => ApplyOutcome::AlreadyApplied,
            RuleOutcome::ActionRequired => ApplyOutcome::ActionRequired(rule.reason().to_string()),
        },
        None => ApplyOutcome::Error {
            status: Some(response.status),
            message: response.body.clone(),
        },
    }
}

/// Sends applications for one resume
pub struct Submitter<'a, B: JobBoard + ?Sized> {
    board: &'a B,
    resume_id: &'a str,
    cover_letter: Option<&'a str>,
    rules: &'a [ResponseRule],
}

impl<'a, B: JobBoard + ?Sized> Submitter<'a, B> {
    pub fn new(
        board: &'a B,
        resume_id: &'a str,
        cover_letter: Option<&'a str>,
        rules: &'a [ResponseRule],
    ) -> Self {
        Self {
            board,
            resume_id,
            cover_letter,
            rules,
        }
    }

    /// Apply to one vacancy; transport failures become `ApplyOutcome::Error`
    pub async fn submit(&self, vacancy_id: &str) -> ApplyOutcome {
        let application = Application {
            vacancy_id,
            resume_id: self.resume_id,
            message: self.cover_letter,
        };

        match self.board.apply(&application).await {
            Ok(response) => classify_response(&response, self.rules),
            Err(e) => ApplyOutcome::Error {
                status: e.status(),
                message: e.to_string(),
            },
        }
    }
}

/// Log an outcome and append it to its ledger.
///
/// Returns the ledger written to, if any.
pub fn record_outcome(
    ledgers: &mut Ledgers,
    posting: &Posting,
    vacancy_id: &str,
    outcome: &ApplyOutcome,
) -> ledger::Result<Option<LedgerKind>> {
    let title = posting.title.as_str();
    let city = posting.city.as_str();

    match outcome {
        ApplyOutcome::Success => {
            info!(vacancy_id, title, city, "Successfully applied to vacancy");
        }
        ApplyOutcome::AlreadyApplied => {
            info!(vacancy_id, title, city, "Already applied to vacancy");
        }
        ApplyOutcome::ActionRequired(reason) => {
            warn!(vacancy_id, title, city, reason = %reason, "Vacancy requires action before applying");
        }
        ApplyOutcome::Error { status, message } => {
            warn!(vacancy_id, title, city, status = ?status, error = %message, "Failed to apply to vacancy");
        }
    }

    let Some(kind) = outcome.ledger() else {
        return Ok(None);
    };

    let mut record = LedgerRecord::new(vacancy_id, title, city);
    if let ApplyOutcome::ActionRequired(reason) = outcome {
        record = record.with_reason(reason.as_str());
    }
    ledgers.record(kind, &record)?;
    Ok(Some(kind))
}
