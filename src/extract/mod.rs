///! Field extractors: one pure function per logical data group.
///!
///! Each extractor reads from the aggregated `RecordMap` and returns its part of
///! the data dictionary. An absent record yields the default, and a malformed
///! field degrades only itself.
use chrono::{Month, NaiveDate};
use indexmap::IndexMap;
use log::warn;
use regex::Regex;
use crate::config::ParserConfig;
use crate::data::{Assembly, Crystallography, MissingResidue, Transformation};
use crate::records::{merge_lines, RecordMap};
use crate::utils::{atov, char_at, col, col_from};

#[derive(Debug, Clone, Default, PartialEq)]
/// Fields read from the HEADER record.
pub struct Header {
	pub code: Option<String>,
	pub deposition_date: Option<NaiveDate>,
	pub classification: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Fields read from SOURCE.
pub struct Source {
	pub organism: Option<String>,
	pub expression_system: Option<String>,
}

fn non_empty(value: &str) -> Option<String> {
	let value = value.trim();
	if value.is_empty() { None } else { Some(value.to_string()) }
}

/// Parses a `DD-MON-YY` date, expanding the year with the configured pivot.
pub fn parse_date(field: &str, config: &ParserConfig) -> Option<NaiveDate> {
	let mut parts = field.trim().split('-');
	let day: u32 = atov(parts.next()?)?;
	let month: Month = parts.next()?.parse().ok()?;
	let year_field = parts.next()?;
	if year_field.len() != 2 || parts.next().is_some() {
		return None;
	}
	let year: u32 = atov(year_field)?;
	NaiveDate::from_ymd_opt(config.expand_year(year), month.number_from_month(), day)
}

/// Reads classification (columns 11-50), deposition date (51-59) and code (63-66).
pub fn parse_header(line: &str, config: &ParserConfig) -> Header {
	let date_field = col(line, 50, 59);
	let deposition_date = if date_field.trim().is_empty() {
		None
	} else {
		let date = parse_date(date_field, config);
		if date.is_none() {
			warn!("Unreadable deposition date {:?}", date_field);
		}
		date
	};
	Header {
		code: non_empty(col(line, 62, 66)),
		deposition_date,
		classification: non_empty(col(line, 10, 50)),
	}
}

pub fn extract_header(map: &RecordMap, config: &ParserConfig) -> Header {
	map.single("HEADER").map(|line| parse_header(line, config)).unwrap_or_default()
}

pub fn extract_title(map: &RecordMap) -> Option<String> {
	let lines = map.lines("TITLE");
	if lines.is_empty() {
		return None;
	}
	non_empty(&merge_lines(lines, 10, " "))
}

fn comma_list(map: &RecordMap, name: &str) -> Vec<String> {
	merge_lines(map.lines(name), 10, " ")
		.split(',')
		.filter_map(non_empty)
		.collect()
}

pub fn extract_keywords(map: &RecordMap) -> Vec<String> {
	comma_list(map, "KEYWDS")
}

pub fn extract_authors(map: &RecordMap) -> Vec<String> {
	comma_list(map, "AUTHOR")
}

pub fn extract_technique(map: &RecordMap) -> Option<String> {
	map.single("EXPDTA").and_then(|line| non_empty(col_from(line, 6)))
}

/// Reads `KEY: value;` pairs from the merged SOURCE text.
pub fn parse_source(text: &str) -> Source {
	let mut source = Source::default();
	for segment in text.split(';') {
		let mut pair = segment.splitn(2, ':');
		let key = pair.next().unwrap_or("").trim();
		let value = match pair.next().and_then(non_empty) {
			Some(value) => value,
			None => continue,
		};
		match key {
			"ORGANISM_SCIENTIFIC" if source.organism.is_none() => source.organism = Some(value),
			"EXPRESSION_SYSTEM" if source.expression_system.is_none() => source.expression_system = Some(value),
			_ => {},
		}
	}
	source
}

pub fn extract_source(map: &RecordMap) -> Source {
	let lines = map.lines("SOURCE");
	if lines.is_empty() {
		return Source::default();
	}
	parse_source(&merge_lines(lines, 10, " "))
}

/// Reads one REMARK 465 data line: name (16-18), chain (20), number (22-26), insert (27).
fn missing_residue(line: &str) -> Option<MissingResidue> {
	let number: i64 = atov(col(line, 21, 26))?;
	let name = non_empty(col(line, 15, 18))?;
	let chain = char_at(line, 19).map(String::from).unwrap_or_default();
	let insert = col(line, 26, 27).trim();
	Some(MissingResidue { name, id: format!("{}.{}{}", chain, number, insert) })
}

/// Residues listed as missing in REMARK 465.
///
/// Everything up to the `RES C SSSEQI` column header is preamble. Without that
/// header, lines whose number column does not parse are skipped.
pub fn extract_missing_residues(map: &RecordMap) -> Vec<MissingResidue> {
	let lines = map.remark("465");
	let start = lines.iter()
		.position(|line| line.contains("RES C SSSEQI"))
		.map(|header| header + 1)
		.unwrap_or(0);
	lines[start..].iter().filter_map(|line| missing_residue(line)).collect()
}

pub fn extract_resolution(map: &RecordMap) -> Option<f64> {
	let pattern = Regex::new(r"RESOLUTION\.\s+(\S+)").ok()?;
	map.remark("2").iter().find_map(|line| {
		pattern.captures(line).and_then(|c| atov(&c[1]))
	})
}

/// Remark text after the record name and number.
fn remark_body(line: &str) -> &str {
	col_from(line, 10).trim()
}

/// Value of the first REMARK 3 line whose label matches. A matching label with
/// a missing or malformed value gives `None` rather than searching further.
fn refinement_value(lines: &[String], pattern: &Regex) -> Option<f64> {
	let captures = lines.iter().find_map(|line| pattern.captures(remark_body(line)))?;
	captures.get(1).and_then(|value| atov(value.as_str()))
}

/// R-value of the working set and free R-value, each independently optional.
pub fn extract_rvalue(map: &RecordMap) -> (Option<f64>, Option<f64>) {
	let lines = map.remark("3");
	if lines.is_empty() {
		return (None, None);
	}
	let rvalue = Regex::new(r"^R VALUE\s+\(WORKING SET\)\s*(?::\s*(\S+)\s*)?$").ok()
		.and_then(|pattern| refinement_value(lines, &pattern));
	let rfree = Regex::new(r"^FREE R VALUE\s*(?::\s*(\S+)\s*)?$").ok()
		.and_then(|pattern| refinement_value(lines, &pattern));
	(rvalue, rfree)
}

fn value_after<'a>(body: &'a str, label: &str) -> Option<&'a str> {
	body.find(label).map(|i| body[i + label.len()..].trim())
}

fn leading_number(value: &str) -> Option<f64> {
	value.split_whitespace().next().and_then(atov)
}

fn chain_list(value: &str) -> Vec<String> {
	value.split(',').filter_map(non_empty).collect()
}

/// BIOMT rows of one chain declaration, grouped by transform serial.
#[derive(Default)]
struct PendingTransforms {
	chains: Vec<String>,
	rows: IndexMap<String, [Option<[f64; 4]>; 3]>,
}

impl PendingTransforms {
	fn add_row(&mut self, body: &str) {
		let tokens: Vec<&str> = body.split_whitespace().collect();
		let row = match tokens.first().and_then(|t| t.strip_prefix("BIOMT")).and_then(|n| atov::<usize>(n)) {
			Some(row @ 1..=3) => row - 1,
			_ => {
				warn!("Unreadable BIOMT row {:?}", body);
				return;
			}
		};
		let values: Vec<f64> = tokens.iter().skip(2).filter_map(|t| atov(t)).collect();
		if tokens.len() != 6 || values.len() != 4 {
			warn!("Unreadable BIOMT row {:?}", body);
			return;
		}
		let serial = tokens[1].to_string();
		self.rows.entry(serial).or_default()[row] = Some([values[0], values[1], values[2], values[3]]);
	}

	fn flush(&mut self, assembly: &mut Assembly) {
		for (serial, rows) in self.rows.drain(..) {
			match rows {
				[Some(r1), Some(r2), Some(r3)] => assembly.transformations.push(Transformation {
					chains: self.chains.clone(),
					matrix: [[r1[0], r1[1], r1[2]], [r2[0], r2[1], r2[2]], [r3[0], r3[1], r3[2]]],
					vector: [r1[3], r2[3], r3[3]],
				}),
				_ => warn!("Incomplete BIOMT transform {} in assembly {}", serial, assembly.id),
			}
		}
	}
}

/// Builds one assembly from the REMARK 350 lines of a single BIOMOLECULE.
pub fn assembly_lines_to_assembly<S: AsRef<str>>(lines: &[S]) -> Assembly {
	let mut assembly = Assembly::default();
	let mut pending = PendingTransforms::default();
	for line in lines {
		let body = remark_body(line.as_ref());
		if let Some(value) = value_after(body, "BIOMOLECULE:") {
			assembly.id = atov(value).unwrap_or_else(|| {
				warn!("Unreadable biomolecule number {:?}", value);
				0
			});
		} else if let Some(value) = value_after(body, "SOFTWARE USED:") {
			assembly.software = non_empty(value);
		} else if let Some(value) = value_after(body, "CHANGE IN SOLVENT FREE ENERGY:") {
			assembly.delta_energy = leading_number(value);
		} else if let Some(value) = value_after(body, "BURIED SURFACE AREA:") {
			assembly.buried_surface_area = leading_number(value);
		} else if let Some(value) = value_after(body, "SURFACE AREA OF THE COMPLEX:") {
			assembly.surface_area = leading_number(value);
		} else if let Some(value) = value_after(body, "APPLY THE FOLLOWING TO CHAINS:") {
			pending.flush(&mut assembly);
			pending.chains = chain_list(value);
		} else if let Some(value) = value_after(body, "AND CHAINS:") {
			pending.chains.extend(chain_list(value));
		} else if body.starts_with("BIOMT") {
			pending.add_row(body);
		}
	}
	pending.flush(&mut assembly);
	assembly
}

/// Biological assemblies from REMARK 350, one per `BIOMOLECULE:` marker.
pub fn extract_assemblies(map: &RecordMap) -> Vec<Assembly> {
	let mut chunks: Vec<Vec<&str>> = Vec::new();
	for line in map.remark("350") {
		if line.contains("BIOMOLECULE:") {
			chunks.push(Vec::new());
		}
		if let Some(chunk) = chunks.last_mut() {
			chunk.push(line);
		}
	}
	chunks.iter().map(|chunk| assembly_lines_to_assembly(chunk)).collect()
}

/// Unit cell (columns 7-54) and space group (56-66) from CRYST1.
pub fn extract_crystallography(map: &RecordMap) -> Option<Crystallography> {
	let line = map.single("CRYST1")?;
	let bounds = [(6, 15), (15, 24), (24, 33), (33, 40), (40, 47), (47, 54)];
	let mut unit_cell = [0.0; 6];
	for (value, (start, end)) in unit_cell.iter_mut().zip(bounds.iter()) {
		*value = match atov(col(line, *start, *end)) {
			Some(v) => v,
			None => {
				warn!("Unreadable CRYST1 unit cell {:?}", line);
				return None;
			}
		};
	}
	Some(Crystallography { space_group: non_empty(col(line, 55, 66)), unit_cell })
}

/// CONECT bonds as atom serial to bonded serials.
pub fn extract_connections(map: &RecordMap) -> IndexMap<u32, Vec<u32>> {
	let mut connections: IndexMap<u32, Vec<u32>> = IndexMap::new();
	for line in map.connections().into_iter().flat_map(|c| c.values()) {
		let serial: u32 = match atov(col(line, 6, 11)) {
			Some(serial) => serial,
			None => continue,
		};
		let bonded = [11, 16, 21, 26].iter()
			.filter_map(|start| atov(col(line, *start, start + 5)))
			.collect();
		connections.insert(serial, bonded);
	}
	connections
}
