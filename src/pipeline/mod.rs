//! The `apply` command: search, filter, deduplicate, submit.
//!
//! Postings are fetched page by page, checked by [`classify`], and eligible
//! ones are sent through [`Submitter`]. Every definite outcome is appended to
//! its ledger before the next posting is looked at, so an interrupted run
//! loses at most the posting in flight.

mod classify;
mod runner;
mod submit;

pub use classify::{Filters, SkipReason, Verdict, classify};
pub use runner::{RunError, RunOptions, RunReport, Runner};
pub use submit::{ApplyOutcome, Submitter, classify_response, record_outcome};
