/// Line layout of ledger files
///
/// `YYYY-MM-DD HH:MM | id: {id} | {title} | {city}[ | reason: {reason}]`
///
/// Only the id is ever read back. Readers also accept a line holding a bare
/// id, which is how employer exclusion lists are often written by hand.
use chrono::{Local, NaiveDateTime};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";
const ID_MARKER: &str = "id:";
const FIELD_SEPARATOR: &str = " | ";

/// One processed posting (or excluded employer)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRecord {
    pub timestamp: NaiveDateTime,
    pub id: String,
    pub title: String,
    pub city: String,
    pub reason: Option<String>,
}

impl LedgerRecord {
    /// Record stamped with the current local time
    pub fn new(id: impl Into<String>, title: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now().naive_local(),
            id: id.into(),
            title: title.into(),
            city: city.into(),
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Render as a single ledger line (without trailing newline)
    pub fn encode(&self) -> String {
        let mut fields = vec![
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            format!("{} {}", ID_MARKER, sanitize(&self.id)),
            sanitize(&self.title),
        ];
        if !self.city.is_empty() {
            fields.push(sanitize(&self.city));
        }
        if let Some(reason) = &self.reason {
            fields.push(format!("reason: {}", sanitize(reason)));
        }
        fields.join(FIELD_SEPARATOR)
    }
}

/// Extract the id from a ledger line
pub fn decode_id(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Some(pos) = line.find(ID_MARKER) {
        let rest = &line[pos + ID_MARKER.len()..];
        let id = rest.split('|').next().unwrap_or_default().trim();
        return (!id.is_empty()).then(|| id.to_string());
    }

    // Bare id line
    if line.split_whitespace().count() == 1 {
        return Some(line.to_string());
    }

    None
}

/// Keep every record on one line and keep the field separator unambiguous
fn sanitize(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            '|' => '/',
            other => other,
        })
        .collect::<String>()
        .trim()
        .to_string()
}
