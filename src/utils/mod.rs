//! Fixed-column helpers and the crate error type shared by the reader and writer.
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
/// Errors raised at the fallible edges of the crate.
///
/// Parsing PDB text itself never fails; these cover configuration, JSON export
/// and structure views that cannot enumerate chains.
pub enum PdbError {
	#[error("Structure does not expose any chains.")]
	NoChains,
	#[error("Could not read parser configuration: {0}")]
	Config(#[source] serde_json::Error),
	#[error("Could not serialize data dictionary: {0}")]
	Json(#[source] serde_json::Error),
}

/// Slices a record line by 0-based column range, clamped to the line length.
///
/// Columns past the end of a short line read as empty rather than panicking,
/// as PDB writers routinely drop trailing blanks.
pub fn col(line: &str, start: usize, end: usize) -> &str {
	let end = end.min(line.len());
	if start >= end {
		return "";
	}
	line.get(start..end).unwrap_or("")
}

/// Everything from `start` to the end of the line.
pub fn col_from(line: &str, start: usize) -> &str {
	col(line, start, line.len())
}

/// The character at a column, `None` when missing or blank.
pub fn char_at(line: &str, index: usize) -> Option<char> {
	col(line, index, index + 1).chars().next().filter(|c| !c.is_whitespace())
}

/// Lenient numeric parse of a fixed-width field.
pub fn atov<T: FromStr>(a: &str) -> Option<T> {
	a.trim().parse().ok()
}
