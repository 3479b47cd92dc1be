//! Serialisation of a structure back into fixed-column PDB records.
//!
//! Only ATOM, HETATM, ANISOU, TER and SEQRES records are written. The structure
//! itself is an external object model, seen here through the view traits.
use log::debug;
use crate::seq::residue_names;
use crate::utils::PdbError;

/// SEQRES residues per line.
const SEQRES_WIDTH: usize = 13;

/// What an atom belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Owner<'a> {
	/// A residue of a polymer chain, id like `A.100B`.
	Residue { id: &'a str, name: &'a str },
	/// A ligand or other non-polymer molecule.
	Ligand { id: &'a str, name: &'a str },
}

impl<'a> Owner<'a> {
	fn id(&self) -> &'a str {
		match self {
			Owner::Residue { id, .. } | Owner::Ligand { id, .. } => *id,
		}
	}

	fn name(&self) -> &'a str {
		match self {
			Owner::Residue { name, .. } | Owner::Ligand { name, .. } => *name,
		}
	}
}

pub trait AtomView {
	fn id(&self) -> u32;
	fn name(&self) -> &str;
	fn alt_loc(&self) -> Option<char> { None }
	fn location(&self) -> [f64; 3];
	fn occupancy(&self) -> f64 { 1.0 }
	fn bvalue(&self) -> f64;
	fn charge(&self) -> i8;
	fn element(&self) -> &str;
	fn anisotropy(&self) -> [f64; 6] { [0.0; 6] }
	fn chain_id(&self) -> Option<&str>;
	/// `None` for bare atoms that belong to nothing.
	fn owner(&self) -> Option<Owner<'_>>;
}

pub trait ChainView {
	fn id(&self) -> &str;
	/// One letter residue sequence.
	fn sequence(&self) -> &str;
}

pub trait StructureView {
	fn atoms(&self) -> Vec<&dyn AtomView>;

	/// Structures without chains (a bare atom collection) keep the default.
	fn chains(&self) -> Result<Vec<&dyn ChainView>, PdbError> {
		Err(PdbError::NoChains)
	}
}

fn is_residue(atom: &dyn AtomView) -> bool {
	matches!(atom.owner(), Some(Owner::Residue { .. }))
}

/// Splits a residue id such as `A.100B` or `A100B` into number and insert code.
pub fn split_residue_id(id: &str) -> (Option<i32>, Option<char>) {
	let body = id.rsplit('.').next().unwrap_or(id);
	let insert = body.chars().last().filter(|c| c.is_alphabetic());
	let number = match insert {
		Some(c) => &body[..body.len() - c.len_utf8()],
		None => body,
	};
	let number = number.trim_start_matches(|c: char| c.is_alphabetic());
	(number.parse().ok(), insert)
}

/// Charge magnitude followed by its sign, blank when neutral.
fn charge_suffix(charge: i8) -> String {
	match charge {
		0 => String::new(),
		c if c < 0 => format!("{}-", c.unsigned_abs()),
		c => format!("{}+", c),
	}
}

/// B-value text for the 6 column field: the shortest form of the value at two
/// decimals, or one decimal when that is still too wide.
fn bvalue_field(bvalue: f64) -> String {
	let text = format!("{:?}", (bvalue * 100.0).round() / 100.0);
	if text.len() <= 6 {
		return text;
	}
	let text = format!("{:.1}", bvalue);
	if text.len() <= 6 { text } else { format!("{:.0}", bvalue) }
}

/// Identification columns shared by ATOM/HETATM and ANISOU lines.
struct AtomLabel<'a> {
	name: String,
	alt_loc: char,
	residue_name: &'a str,
	chain_id: &'a str,
	residue_number: String,
	insert: String,
}

impl<'a> AtomLabel<'a> {
	fn new(atom: &'a dyn AtomView) -> AtomLabel<'a> {
		let name = atom.name();
		let (residue_name, residue_number, insert) = match atom.owner() {
			Some(owner) => {
				let (number, insert) = split_residue_id(owner.id());
				(
					owner.name(),
					number.map(|n| n.to_string()).unwrap_or_default(),
					insert.map(String::from).unwrap_or_default(),
				)
			},
			None => ("", String::new(), String::new()),
		};
		AtomLabel {
			// Four letter names start in column 13, shorter ones in 14.
			name: if name.len() < 4 { format!(" {}", name) } else { name.to_string() },
			alt_loc: atom.alt_loc().unwrap_or(' '),
			residue_name,
			chain_id: atom.chain_id().unwrap_or(""),
			residue_number,
			insert,
		}
	}
}

/// ANISOU record for an atom, the six values scaled by 10^4.
pub fn atom_to_anisou_line(atom: &dyn AtomView) -> String {
	let label = AtomLabel::new(atom);
	let u: Vec<i64> = atom.anisotropy().iter().map(|v| (v * 10000.0).round() as i64).collect();
	format!(
		"ANISOU{:>5} {:<4}{}{:<3} {:<1}{:>4}{:<1} {:>7}{:>7}{:>7}{:>7}{:>7}{:>7}      {:>2}{:<2}",
		atom.id(), label.name, label.alt_loc, label.residue_name, label.chain_id,
		label.residue_number, label.insert, u[0], u[1], u[2], u[3], u[4], u[5],
		atom.element(), charge_suffix(atom.charge()),
	)
}

/// Writes an atom's ATOM or HETATM line, followed by its ANISOU line when it
/// is a residue atom with anisotropy.
pub fn atom_to_atom_line(atom: &dyn AtomView, lines: &mut Vec<String>) {
	let label = AtomLabel::new(atom);
	let record = match atom.owner() {
		Some(Owner::Ligand { .. }) => "HETATM",
		_ => "ATOM",
	};
	let [x, y, z] = atom.location();
	lines.push(format!(
		"{:<6}{:>5} {:<4}{}{:<3} {:<1}{:>4}{:<1}   {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6}          {:>2}{:<2}",
		record, atom.id(), label.name, label.alt_loc, label.residue_name, label.chain_id,
		label.residue_number, label.insert, x, y, z, atom.occupancy(),
		bvalue_field(atom.bvalue()),
		atom.element(), charge_suffix(atom.charge()),
	));
	if is_residue(atom) && atom.anisotropy() != [0.0; 6] {
		lines.push(atom_to_anisou_line(atom));
	}
}

/// Writes SEQRES records for every chain, sorted by chain id.
pub fn pack_sequences(structure: &dyn StructureView, lines: &mut Vec<String>) {
	let mut chains = match structure.chains() {
		Ok(chains) => chains,
		Err(e) => {
			debug!("No SEQRES records written: {}", e);
			return;
		}
	};
	chains.sort_by(|a, b| a.id().cmp(b.id()));
	for chain in chains {
		let residues = residue_names(chain.sequence());
		for (n, chunk) in residues.chunks(SEQRES_WIDTH).enumerate() {
			lines.push(format!(
				"SEQRES {:>3} {} {:>4}  {}",
				n + 1, chain.id(), residues.len(), chunk.join(" ")
			));
		}
	}
}

/// Serialises a structure: SEQRES first, then atoms in id order.
///
/// A TER closes a run of residue atoms when the next atom is on another chain,
/// is not a residue atom, or when there is no next atom.
pub fn structure_to_pdb_string(structure: &dyn StructureView) -> String {
	let mut lines = Vec::new();
	pack_sequences(structure, &mut lines);
	let mut atoms = structure.atoms();
	atoms.sort_by_key(|atom| atom.id());
	for (i, atom) in atoms.iter().enumerate() {
		atom_to_atom_line(*atom, &mut lines);
		if is_residue(*atom) {
			let chain_ends = match atoms.get(i + 1) {
				Some(next) => next.chain_id() != atom.chain_id() || !is_residue(*next),
				None => true,
			};
			if chain_ends {
				lines.push("TER".to_string());
			}
		}
	}
	lines.join("\n")
}
