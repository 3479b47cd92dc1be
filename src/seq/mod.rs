///! Residue code tables for translating between SEQRES names and sequence letters.
use phf::{phf_map, Map};

/// Maps SEQRES residue names (amino acids and nucleotides) to one letter.
pub const CODES: Map<&'static str, char> = phf_map! {
	"ALA" => 'A', "ARG" => 'R', "ASN" => 'N', "ASP" => 'D', "CYS" => 'C',
	"GLN" => 'Q', "GLU" => 'E', "GLY" => 'G', "HIS" => 'H', "ILE" => 'I',
	"LEU" => 'L', "LYS" => 'K', "MET" => 'M', "PHE" => 'F', "PRO" => 'P',
	"SER" => 'S', "THR" => 'T', "TRP" => 'W', "TYR" => 'Y', "VAL" => 'V',
	"SEC" => 'U', "PYL" => 'O',
	"DA" => 'A', "DC" => 'C', "DG" => 'G', "DT" => 'T', "DI" => 'I',
	"A" => 'A', "C" => 'C', "G" => 'G', "U" => 'U', "I" => 'I',
};

/// Maps 1 character amino acid abbreviations to their 3 character equivalents.
const RES_1_TO_3: Map<char, &'static str> = phf_map! {
	'A' => "ALA", 'C' => "CYS", 'D' => "ASP", 'E' => "GLU", 'F' => "PHE",
	'G' => "GLY", 'H' => "HIS", 'I' => "ILE", 'K' => "LYS", 'L' => "LEU",
	'M' => "MET", 'N' => "ASN", 'P' => "PRO", 'Q' => "GLN", 'R' => "ARG",
	'S' => "SER", 'T' => "THR", 'V' => "VAL", 'W' => "TRP", 'Y' => "TYR",
	'U' => "SEC", 'O' => "PYL",
};

/// Placeholder letter for residue names with no one letter code.
pub const UNKNOWN_LETTER: char = 'X';

/// Placeholder residue name for letters with no residue name.
pub const UNKNOWN_RESIDUE: &str = "XXX";

/// One letter code for a SEQRES residue name.
///
/// Nucleotide names of one or two characters not in the table (`N`, `DU`)
/// read as their last character.
pub fn residue_letter(name: &str) -> char {
	if let Some(letter) = CODES.get(name) {
		return *letter;
	}
	match name.chars().count() {
		1 | 2 => name.chars().last().unwrap_or(UNKNOWN_LETTER),
		_ => UNKNOWN_LETTER,
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Polymer type of a one letter sequence, used to pick residue names.
pub enum SequenceKind {
	Protein,
	Dna,
	Rna,
}

impl SequenceKind {
	/// Sequences made only of `ACGT` are DNA, only of `ACGU` RNA, anything else protein.
	pub fn detect(sequence: &str) -> SequenceKind {
		if sequence.is_empty() {
			SequenceKind::Protein
		} else if sequence.chars().all(|c| "ACGT".contains(c)) {
			SequenceKind::Dna
		} else if sequence.chars().all(|c| "ACGU".contains(c)) {
			SequenceKind::Rna
		} else {
			SequenceKind::Protein
		}
	}

	/// Residue name for one letter of a sequence of this kind.
	pub fn residue_name(self, letter: char) -> &'static str {
		match self {
			SequenceKind::Protein => RES_1_TO_3.get(&letter).copied().unwrap_or(UNKNOWN_RESIDUE),
			SequenceKind::Dna => match letter {
				'A' => "DA", 'C' => "DC", 'G' => "DG", _ => "DT"
			},
			SequenceKind::Rna => match letter {
				'A' => "A", 'C' => "C", 'G' => "G", _ => "U"
			},
		}
	}
}

/// Expands a one letter sequence into SEQRES residue names.
pub fn residue_names(sequence: &str) -> Vec<&'static str> {
	let kind = SequenceKind::detect(sequence);
	sequence.chars().map(|c| kind.residue_name(c)).collect()
}
