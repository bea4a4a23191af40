/// Append-only text ledgers of processed postings and excluded employers
///
/// Ledgers are the only durable state. Each category lives in its own file
/// inside the configured ledger directory:
///
/// - `applied`: applications the platform accepted (ids in a legacy
///   `sended` file are read as applied too, but never written)
/// - `action_required`: postings that need a cover letter or a test
/// - `already_applied`: postings the platform reports as already applied to
/// - `excluded_employers`: employers whose postings are always skipped
///
/// Files are human-readable, one record per line, and only ever appended to.
/// The ids found in a file form the deduplication key for the next run.
///
/// ## Usage
///
/// ```rust,ignore
/// use autoapply::ledger::{LedgerKind, LedgerRecord, Ledgers};
///
/// let mut ledgers = Ledgers::open(".")?;
/// if !ledgers.is_processed("93354451") {
///     ledgers.record(LedgerKind::Applied, &LedgerRecord::new("93354451", "rust developer", "Москва"))?;
/// }
/// ```

pub mod error;
pub mod record;
pub mod store;

pub use error::{LedgerError, Result};
pub use record::LedgerRecord;
pub use store::{LEGACY_APPLIED_FILE, LedgerFile, LedgerKind, LedgerStats, Ledgers};
