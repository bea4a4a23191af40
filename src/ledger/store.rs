use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::error::{LedgerError, Result};
use super::record::{LedgerRecord, decode_id};

/// Append-only ledger backed by a plain text file
///
/// The set of ids is read once on open and kept in memory; every append
/// writes one line and adds the id to the set, so `contains` reflects
/// records written during the current run too.
#[derive(Debug)]
pub struct LedgerFile {
    path: PathBuf,
    ids: HashSet<String>,
}

impl LedgerFile {
    /// Open a ledger, reading existing ids. A missing file is an empty ledger.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let ids = read_ids(&path)?;

        debug!(path = %path.display(), ids = ids.len(), "Opened ledger");
        Ok(Self { path, ids })
    }

    /// Add the ids of another (read-only) ledger file. New records still go
    /// to this ledger's own file.
    pub fn merge_from<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let ids = read_ids(path)?;
        let count = ids.len();
        if count > 0 {
            info!(path = %path.display(), ids = count, "Merged legacy ledger");
        }
        self.ids.extend(ids);
        Ok(count)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Append one record. Existing lines are never touched.
    pub fn append(&mut self, record: &LedgerRecord) -> Result<()> {
        if record.id.trim().is_empty() {
            return Err(LedgerError::EmptyId);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| LedgerError::Write {
                path: self.path.clone(),
                source,
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| LedgerError::Write {
                path: self.path.clone(),
                source,
            })?;

        writeln!(file, "{}", record.encode()).map_err(|source| LedgerError::Write {
            path: self.path.clone(),
            source,
        })?;

        self.ids.insert(record.id.trim().to_string());
        debug!(path = %self.path.display(), id = %record.id, "Appended ledger record");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

fn read_ids(path: &Path) -> Result<HashSet<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content.lines().filter_map(decode_id).collect()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashSet::new()),
        Err(source) => Err(LedgerError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Older installations recorded successful applications here
pub const LEGACY_APPLIED_FILE: &str = "sended";

/// Ledger categories and their file names inside the ledger directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerKind {
    Applied,
    ActionRequired,
    AlreadyApplied,
    ExcludedEmployers,
}

impl LedgerKind {
    pub const ALL: [LedgerKind; 4] = [
        LedgerKind::Applied,
        LedgerKind::ActionRequired,
        LedgerKind::AlreadyApplied,
        LedgerKind::ExcludedEmployers,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            LedgerKind::Applied => "applied",
            LedgerKind::ActionRequired => "action_required",
            LedgerKind::AlreadyApplied => "already_applied",
            LedgerKind::ExcludedEmployers => "excluded_employers",
        }
    }
}

/// All ledgers of one ledger directory
#[derive(Debug)]
pub struct Ledgers {
    applied: LedgerFile,
    action_required: LedgerFile,
    already_applied: LedgerFile,
    excluded_employers: LedgerFile,
}

impl Ledgers {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        info!("Opening ledgers in: {}", dir.display());

        let mut ledgers = Self {
            applied: LedgerFile::open(dir.join(LedgerKind::Applied.file_name()))?,
            action_required: LedgerFile::open(dir.join(LedgerKind::ActionRequired.file_name()))?,
            already_applied: LedgerFile::open(dir.join(LedgerKind::AlreadyApplied.file_name()))?,
            excluded_employers: LedgerFile::open(
                dir.join(LedgerKind::ExcludedEmployers.file_name()),
            )?,
        };

        ledgers.applied.merge_from(dir.join(LEGACY_APPLIED_FILE))?;

        info!("Ledgers opened: {:?}", ledgers.stats());
        Ok(ledgers)
    }

    pub fn get(&self, kind: LedgerKind) -> &LedgerFile {
        match kind {
            LedgerKind::Applied => &self.applied,
            LedgerKind::ActionRequired => &self.action_required,
            LedgerKind::AlreadyApplied => &self.already_applied,
            LedgerKind::ExcludedEmployers => &self.excluded_employers,
        }
    }

    fn get_mut(&mut self, kind: LedgerKind) -> &mut LedgerFile {
        match kind {
            LedgerKind::Applied => &mut self.applied,
            LedgerKind::ActionRequired => &mut self.action_required,
            LedgerKind::AlreadyApplied => &mut self.already_applied,
            LedgerKind::ExcludedEmployers => &mut self.excluded_employers,
        }
    }

    /// Whether a posting already has a recorded outcome
    pub fn is_processed(&self, vacancy_id: &str) -> bool {
        self.applied.contains(vacancy_id)
            || self.action_required.contains(vacancy_id)
            || self.already_applied.contains(vacancy_id)
    }

    pub fn is_excluded_employer(&self, employer_id: &str) -> bool {
        self.excluded_employers.contains(employer_id)
    }

    /// Snapshot of the excluded employer ids
    pub fn excluded_employers(&self) -> HashSet<String> {
        self.excluded_employers.ids().map(str::to_string).collect()
    }

    pub fn record(&mut self, kind: LedgerKind, record: &LedgerRecord) -> Result<()> {
        self.get_mut(kind).append(record)
    }

    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            applied: self.applied.len(),
            action_required: self.action_required.len(),
            already_applied: self.already_applied.len(),
            excluded_employers: self.excluded_employers.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerStats {
    pub applied: usize,
    pub action_required: usize,
    pub already_applied: usize,
    pub excluded_employers: usize,
}
