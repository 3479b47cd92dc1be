//! Parser configuration.
use serde::{Serialize, Deserialize};
use crate::utils::PdbError;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
/// Knobs for the text to data dictionary pipeline.
pub struct ParserConfig {
	/// Two-digit years at or above the pivot are read as 19xx, below it as 20xx.
	///
	/// PDB deposition dates are `DD-MON-YY`; the earliest entries date from the
	/// 1970s, so the default of 50 keeps every legacy entry in the last century.
	pub century_pivot: u32,
}

impl Default for ParserConfig {
	fn default() -> ParserConfig {
		ParserConfig {
			century_pivot: 50
		}
	}
}

impl ParserConfig {
	/// Reads a configuration from JSON. Missing keys take their defaults.
	pub fn from_json(json: &str) -> Result<ParserConfig, PdbError> {
		serde_json::from_str(json).map_err(PdbError::Config)
	}

	/// Expands a two-digit year using the century pivot.
	pub fn expand_year(&self, year: u32) -> i32 {
		if year >= self.century_pivot {
			1900 + year as i32
		} else {
			2000 + year as i32
		}
	}
}
