///! Aggregation of raw PDB lines into a map of records.
///!
///! Every record name resolves once to a `RecordKind`, and every kind carries an
///! explicit storage `Policy`. The policy decides whether a new line replaces,
///! extends or is grouped with what is already stored under that name.
use indexmap::IndexMap;
use log::debug;
use crate::utils::{col, col_from};

/// How lines of one record kind are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
	/// Latest line wins.
	Overwrite,
	/// Lines accumulate in file order.
	AppendToList,
	/// Lines accumulate per sub-key (REMARK number).
	GroupByKey,
	/// One line per sub-key, latest wins (CONECT atom serial).
	OverwriteByKey,
	/// Lines are split into per-model blocks.
	GroupIntoModelBlocks,
}

/// Record names the aggregator knows a policy for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
	Header,
	Expdta,
	Nummdl,
	Cryst1,
	End,
	Remark,
	Conect,
	Model,
	Endmdl,
	Atom,
	Hetatm,
	Anisou,
	Ter,
	Other,
}

impl RecordKind {
	pub fn from_name(name: &str) -> RecordKind {
		match name {
			"HEADER" => RecordKind::Header,
			"EXPDTA" => RecordKind::Expdta,
			"NUMMDL" => RecordKind::Nummdl,
			"CRYST1" => RecordKind::Cryst1,
			"END" => RecordKind::End,
			"REMARK" => RecordKind::Remark,
			"CONECT" => RecordKind::Conect,
			"MODEL" => RecordKind::Model,
			"ENDMDL" => RecordKind::Endmdl,
			"ATOM" => RecordKind::Atom,
			"HETATM" => RecordKind::Hetatm,
			"ANISOU" => RecordKind::Anisou,
			"TER" => RecordKind::Ter,
			_ => RecordKind::Other,
		}
	}

	pub fn policy(self) -> Policy {
		match self {
			RecordKind::Header | RecordKind::Expdta | RecordKind::Nummdl |
			RecordKind::Cryst1 | RecordKind::End => Policy::Overwrite,
			RecordKind::Remark => Policy::GroupByKey,
			RecordKind::Conect => Policy::OverwriteByKey,
			RecordKind::Model | RecordKind::Endmdl | RecordKind::Atom |
			RecordKind::Hetatm | RecordKind::Anisou | RecordKind::Ter => Policy::GroupIntoModelBlocks,
			RecordKind::Other => Policy::AppendToList,
		}
	}

	/// Sub-key of a grouped or keyed record line.
	fn sub_key(self, line: &str) -> String {
		match self {
			RecordKind::Conect => col(line, 6, 11).trim().to_string(),
			_ => col(line, 7, 10).trim().to_string(),
		}
	}
}

/// Stored lines for one record name. The variant follows the kind's `Policy`.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
	Single(String),
	Lines(Vec<String>),
	Grouped(IndexMap<String, Vec<String>>),
	Keyed(IndexMap<String, String>),
	Models(Vec<Vec<String>>),
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Record name to stored lines, in order of first appearance.
pub struct RecordMap {
	records: IndexMap<String, Record>,
}

impl RecordMap {
	pub fn get(&self, name: &str) -> Option<&Record> {
		self.records.get(name)
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.records.keys().map(|k| k.as_str())
	}

	/// Lines stored under a list or single-valued record; empty otherwise.
	pub fn lines(&self, name: &str) -> &[String] {
		match self.records.get(name) {
			Some(Record::Single(line)) => std::slice::from_ref(line),
			Some(Record::Lines(lines)) => lines,
			_ => &[],
		}
	}

	/// The first line of a record, for records that hold a single logical field.
	pub fn single(&self, name: &str) -> Option<&str> {
		self.lines(name).first().map(|l| l.as_str())
	}

	/// Lines of one numbered REMARK; empty when that remark is absent.
	pub fn remark(&self, number: &str) -> &[String] {
		match self.records.get("REMARK") {
			Some(Record::Grouped(groups)) => groups.get(number).map(|g| g.as_slice()).unwrap_or(&[]),
			_ => &[],
		}
	}

	/// Retained CONECT lines keyed by the atom serial they start with.
	pub fn connections(&self) -> Option<&IndexMap<String, String>> {
		match self.records.get("CONECT") {
			Some(Record::Keyed(lines)) => Some(lines),
			_ => None,
		}
	}

	/// Per-model line blocks.
	pub fn models(&self) -> &[Vec<String>] {
		match self.records.get("MODEL") {
			Some(Record::Models(models)) => models,
			_ => &[],
		}
	}

	fn store(&mut self, name: &str, kind: RecordKind, line: &str) {
		match kind.policy() {
			Policy::Overwrite => {
				self.records.insert(name.to_string(), Record::Single(line.to_string()));
			},
			Policy::AppendToList => {
				let entry = self.records.entry(name.to_string()).or_insert_with(|| Record::Lines(Vec::new()));
				if let Record::Lines(lines) = entry {
					lines.push(line.to_string());
				}
			},
			Policy::GroupByKey => {
				let entry = self.records.entry(name.to_string()).or_insert_with(|| Record::Grouped(IndexMap::new()));
				if let Record::Grouped(groups) = entry {
					groups.entry(kind.sub_key(line)).or_insert_with(Vec::new).push(line.to_string());
				}
			},
			Policy::OverwriteByKey => {
				let entry = self.records.entry(name.to_string()).or_insert_with(|| Record::Keyed(IndexMap::new()));
				if let Record::Keyed(keyed) = entry {
					keyed.insert(kind.sub_key(line), line.to_string());
				}
			},
			// Handled by the model block splitter.
			Policy::GroupIntoModelBlocks => {},
		}
	}
}

/// Splits atom-section lines into per-model blocks.
///
/// MODEL opens a block and ENDMDL closes it. Atom lines outside an open block
/// open an implicit one, so a file without MODEL records yields one block.
#[derive(Default)]
struct ModelBlocks {
	blocks: Vec<Vec<String>>,
	open: bool,
}

impl ModelBlocks {
	fn push(&mut self, kind: RecordKind, line: &str) {
		match kind {
			RecordKind::Model => {
				self.blocks.push(Vec::new());
				self.open = true;
			},
			RecordKind::Endmdl => self.open = false,
			_ => {
				if !self.open || self.blocks.is_empty() {
					self.blocks.push(Vec::new());
					self.open = true;
				}
				if let Some(block) = self.blocks.last_mut() {
					block.push(line.to_string());
				}
			}
		}
	}
}

/// Aggregates the lines of a PDB file into a `RecordMap`.
///
/// Blank lines are skipped and every line is right-trimmed. The record name is
/// the first six columns, trimmed.
pub fn pdb_string_to_pdb_dict(filestring: &str) -> RecordMap {
	let mut map = RecordMap::default();
	let mut models = ModelBlocks::default();
	for raw in filestring.lines() {
		let line = raw.trim_end();
		if line.is_empty() { continue }
		let name = col(line, 0, 6).trim_end();
		let kind = RecordKind::from_name(name);
		if kind.policy() == Policy::GroupIntoModelBlocks {
			models.push(kind, line);
		} else {
			map.store(name, kind, line);
		}
	}
	if !models.blocks.is_empty() {
		debug!("Aggregated {} model block(s)", models.blocks.len());
		map.records.insert("MODEL".to_string(), Record::Models(models.blocks));
	}
	map
}

/// Joins the wrapped lines of a free-text record into one string.
///
/// Each line is read from column `start`, stripped of its fixed-width padding,
/// and the pieces are joined with `join`.
pub fn merge_lines<S: AsRef<str>>(lines: &[S], start: usize, join: &str) -> String {
	lines.iter()
		.map(|line| col_from(line.as_ref(), start).trim())
		.collect::<Vec<&str>>()
		.join(join)
}
