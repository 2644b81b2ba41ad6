//! Roster CSV parsing.
//!
//! A roster is a header row `user,mode,<teamset ids...>` followed by one row
//! per learner. Cells are positional; rows may be ragged.

use std::io::Read;

use super::errors::{RosterError, RosterResult};

/// UTF-8 BOM bytes.
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Number of fixed leading columns (`user`, `mode`).
pub const FIXED_COLUMNS: usize = 2;

/// One learner line of the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    /// 1-based line number in the source file.
    pub line: usize,
    /// Username or email.
    pub user: String,
    /// Enrollment mode as written; informational only.
    pub mode: String,
    /// Team name cells, aligned with the header's teamset columns.
    pub teams: Vec<String>,
}

impl RosterRow {
    /// Team name in the given teamset column, `None` for an empty cell.
    pub fn team_at(&self, column: usize) -> Option<&str> {
        self.teams
            .get(column)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }
}

/// A parsed roster file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterTable {
    pub header: Vec<String>,
    pub rows: Vec<RosterRow>,
}

impl RosterTable {
    /// Parse a roster from raw bytes, stripping a UTF-8 BOM if present.
    pub fn parse(data: &[u8]) -> RosterResult<Self> {
        let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
        if data.iter().all(u8::is_ascii_whitespace) {
            return Err(RosterError::InvalidCsv("CSV file is empty".to_string()));
        }
        Self::from_reader(data)
    }

    /// Parse a roster from any reader.
    pub fn from_reader<R: Read>(reader: R) -> RosterResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut header: Option<Vec<String>> = None;
        let mut rows = Vec::new();

        for result in reader.records() {
            let record = result?;
            if record.iter().all(str::is_empty) {
                continue;
            }

            let Some(columns) = header.as_ref() else {
                header = Some(record.iter().map(str::to_string).collect());
                continue;
            };

            let line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(rows.len() + 2);

            if record.len() > columns.len() {
                tracing::warn!(
                    line,
                    cells = record.len(),
                    columns = columns.len(),
                    "Ignoring cells beyond the last header column"
                );
            }

            let teams = (FIXED_COLUMNS..columns.len())
                .map(|idx| record.get(idx).unwrap_or("").to_string())
                .collect();

            rows.push(RosterRow {
                line,
                user: record.get(0).unwrap_or("").to_string(),
                mode: record.get(1).unwrap_or("").to_string(),
                teams,
            });
        }

        let header = header
            .ok_or_else(|| RosterError::InvalidCsv("CSV file has no header row".to_string()))?;

        Ok(Self { header, rows })
    }

    /// Header cells naming teamsets (everything after `user,mode`).
    pub fn teamset_columns(&self) -> &[String] {
        self.header.get(FIXED_COLUMNS..).unwrap_or(&[])
    }
}
