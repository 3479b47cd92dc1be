///! Decomposition of per-model atom lines into polymer, non-polymer and water trees.
use std::collections::HashMap;
use indexmap::IndexMap;
use log::{debug, warn};
use crate::data::{Atom, Model, Molecule, Polymer, Residue};
use crate::records::RecordMap;
use crate::seq::residue_letter;
use crate::utils::{atov, char_at, col, col_from};

/// Atom serial to anisotropic displacement, in true units.
pub type AnisoMap = HashMap<u32, [f64; 6]>;

/// Index of the last TER line in a model block, 0 if there is none.
pub fn get_last_ter_line<S: AsRef<str>>(lines: &[S]) -> usize {
	lines.iter()
		.rposition(|line| line.as_ref().starts_with("TER"))
		.unwrap_or(0)
}

/// Residue identifier `chain.number[insert]` from an atom line.
pub fn id_from_line(line: &str) -> String {
	format!("{}.{}{}", col(line, 21, 22).trim(), col(line, 22, 26).trim(), col(line, 26, 27).trim())
}

fn serial(line: &str) -> u32 {
	atov(col(line, 6, 11)).unwrap_or_else(|| {
		warn!("Unreadable atom serial in line {:?}", line);
		0
	})
}

/// Builds the ANISOU map of one model block.
///
/// Files store the six values as integers scaled by 10^4.
pub fn make_aniso<S: AsRef<str>>(lines: &[S]) -> AnisoMap {
	let mut aniso = AnisoMap::new();
	for line in lines.iter().map(|l| l.as_ref()).filter(|l| l.starts_with("ANISOU")) {
		let mut values = [0.0; 6];
		for (n, value) in values.iter_mut().enumerate() {
			let start = 28 + n * 7;
			*value = atov::<i64>(col(line, start, start + 7)).unwrap_or(0) as f64 / 10000.0;
		}
		aniso.insert(serial(line), values);
	}
	aniso
}

/// One letter sequences per chain from the file's SEQRES records.
pub fn make_sequences(map: &RecordMap) -> IndexMap<String, String> {
	let mut sequences: IndexMap<String, String> = IndexMap::new();
	for line in map.lines("SEQRES") {
		let chain = col(line, 11, 12).trim().to_string();
		let letters = col_from(line, 19).split_whitespace().map(residue_letter);
		sequences.entry(chain).or_insert_with(String::new).extend(letters);
	}
	sequences
}

/// Charges are written `2-`, though `-2` turns up in the wild too.
fn parse_charge(field: &str) -> i8 {
	let field = field.trim();
	if field.is_empty() {
		return 0;
	}
	atov(field)
		.or_else(|| atov(&field.chars().rev().collect::<String>()))
		.unwrap_or_else(|| {
			warn!("Unreadable charge {:?}", field);
			0
		})
}

fn coordinate(line: &str, start: usize) -> f64 {
	atov(col(line, start, start + 8)).unwrap_or_else(|| {
		warn!("Unreadable coordinate in line {:?}", line);
		0.0
	})
}

/// Decodes one ATOM or HETATM line.
pub fn atom_line_to_dict(line: &str, aniso: &AnisoMap) -> Atom {
	Atom {
		name: col(line, 12, 16).trim().to_string(),
		alt_loc: char_at(line, 16),
		x: coordinate(line, 30),
		y: coordinate(line, 38),
		z: coordinate(line, 46),
		occupancy: atov(col(line, 54, 60)).unwrap_or(1.0),
		bvalue: atov(col(line, 60, 66)).unwrap_or(0.0),
		anisotropy: aniso.get(&serial(line)).copied().unwrap_or([0.0; 6]),
		element: col(line, 76, 78).trim().to_string(),
		charge: parse_charge(col(line, 78, 80)),
	}
}

/// Files an atom under its chain and residue, creating either on first sight.
pub fn add_atom_to_polymer(line: &str, model: &mut Model, chain_id: &str, res_id: &str, aniso: &AnisoMap) {
	let chain = model.polymer.entry(chain_id.to_string()).or_insert_with(|| Polymer {
		internal_id: chain_id.to_string(),
		sequence: String::new(),
		residues: IndexMap::new(),
	});
	let number = chain.residues.len() + 1;
	let residue = chain.residues.entry(res_id.to_string()).or_insert_with(|| Residue {
		name: col(line, 17, 20).trim().to_string(),
		number,
		atoms: IndexMap::new(),
	});
	residue.atoms.insert(serial(line), atom_line_to_dict(line, aniso));
}

/// Files an atom under its ligand or water molecule, creating it on first sight.
pub fn add_atom_to_non_polymer(line: &str, model: &mut Model, res_id: &str, aniso: &AnisoMap) {
	let name = col(line, 17, 20).trim();
	let target = if name == "HOH" { &mut model.water } else { &mut model.non_polymer };
	let molecule = target.entry(res_id.to_string()).or_insert_with(|| {
		let chain = col(line, 21, 22).trim().to_string();
		Molecule {
			polymer: if chain.is_empty() { None } else { Some(chain.clone()) },
			internal_id: chain,
			name: name.to_string(),
			atoms: IndexMap::new(),
		}
	});
	molecule.atoms.insert(serial(line), atom_line_to_dict(line, aniso));
}

/// Decomposes one model block.
///
/// ATOM lines always belong to a polymer chain. HETATM lines before the last
/// TER are modified residues of a chain; after it they are ligands or water.
pub fn model_lines_to_model<S: AsRef<str>>(lines: &[S], sequences: &IndexMap<String, String>) -> Model {
	let aniso = make_aniso(lines);
	let last_ter = get_last_ter_line(lines);
	let mut model = Model::bare();
	for (index, line) in lines.iter().map(|l| l.as_ref()).enumerate() {
		let record = col(line, 0, 6).trim_end();
		if record != "ATOM" && record != "HETATM" { continue }
		let res_id = id_from_line(line);
		if record == "ATOM" || index < last_ter {
			let chain_id = col(line, 21, 22).trim();
			add_atom_to_polymer(line, &mut model, chain_id, &res_id, &aniso);
		} else {
			add_atom_to_non_polymer(line, &mut model, &res_id, &aniso);
		}
	}
	for (chain_id, chain) in model.polymer.iter_mut() {
		if let Some(sequence) = sequences.get(chain_id) {
			chain.sequence = sequence.clone();
		}
	}
	model
}

/// Model count declared by NUMMDL (columns 11-14).
pub fn declared_model_count(map: &RecordMap) -> Option<usize> {
	map.single("NUMMDL").and_then(|line| atov(col(line, 10, 14)))
}

/// Builds every model of the file. Sequences are shared by all models.
///
/// A file with no atom section still yields one, empty, model.
pub fn update_models_list(map: &RecordMap) -> Vec<Model> {
	let sequences = make_sequences(map);
	let blocks = map.models();
	if blocks.is_empty() {
		return vec![model_lines_to_model::<String>(&[], &sequences)];
	}
	let models: Vec<Model> = blocks.iter().map(|block| model_lines_to_model(block, &sequences)).collect();
	if let Some(declared) = declared_model_count(map) {
		if declared != models.len() {
			warn!("NUMMDL declares {} model(s) but {} were found", declared, models.len());
		}
	}
	debug!("Decomposed {} model(s), {} atom(s) in the first", models.len(), models[0].atom_count());
	models
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::records::pdb_string_to_pdb_dict;
	use assert_float_eq::*;

	const ATOM_LINE: &str = "ATOM    107  N1 AGLY B  13C     12.681  37.302 -25.211 0.70  15.56           N2-";

	#[test]
	fn test_last_ter_line() {
		assert_eq!(get_last_ter_line(&["ATOM", "HETATM"]), 0);
		assert_eq!(get_last_ter_line(&["AT", "TER", "HET", "TER", "4"]), 3);
	}

	#[test]
	fn test_id_from_line() {
		assert_eq!(id_from_line("ATOM    219  CZ  TYR A  37 "), "A.37");
		assert_eq!(id_from_line("ATOM    219  CZ  TYR A  37B"), "A.37B");
		assert_eq!(id_from_line("ATOM    219  CZ  TYR A  37"), "A.37");
	}

	#[test]
	fn test_make_aniso() {
		assert!(make_aniso::<&str>(&[]).is_empty());
		let aniso = make_aniso(&[
			"ANISOU  107  N   GLY A  13     2406   1892   1614    198    519   -328",
			"ANISOU  110  O   GLY A  13     3837   2505   1611    164   -121    189",
		]);
		assert_eq!(aniso[&107u32], [0.2406, 0.1892, 0.1614, 0.0198, 0.0519, -0.0328]);
		assert_eq!(aniso[&110u32], [0.3837, 0.2505, 0.1611, 0.0164, -0.0121, 0.0189]);
	}

	#[test]
	fn test_make_sequences() {
		assert!(make_sequences(&RecordMap::default()).is_empty());
		let map = pdb_string_to_pdb_dict(&[
			"SEQRES   1 C  271  VAL TRP XYZ",
			"SEQRES   2 C  271  HIS",
			"SEQRES   1 D    2  DT DA",
		].join("\n"));
		let sequences = make_sequences(&map);
		assert_eq!(sequences["C"], "VWXH");
		assert_eq!(sequences["D"], "TA");
	}

	#[test]
	fn test_full_atom_line() {
		let mut aniso = AnisoMap::new();
		aniso.insert(107, [0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
		let atom = atom_line_to_dict(ATOM_LINE, &aniso);
		assert_eq!(atom.name, "N1");
		assert_eq!(atom.alt_loc, Some('A'));
		assert_f64_near!(atom.x, 12.681);
		assert_f64_near!(atom.y, 37.302);
		assert_f64_near!(atom.z, -25.211);
		assert_f64_near!(atom.occupancy, 0.7);
		assert_f64_near!(atom.bvalue, 15.56);
		assert_eq!(atom.anisotropy, [0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
		assert_eq!(atom.element, "N");
		assert_eq!(atom.charge, -2);
	}

	#[test]
	fn test_sparse_atom_line() {
		let atom = atom_line_to_dict("HETATM    9  O   HOH A 301       1.000   2.000   3.000", &AnisoMap::new());
		assert_eq!(atom.alt_loc, None);
		assert_f64_near!(atom.occupancy, 1.0);
		assert_f64_near!(atom.bvalue, 0.0);
		assert_eq!(atom.anisotropy, [0.0; 6]);
		assert_eq!(atom.element, "");
		assert_eq!(atom.charge, 0);
	}

	#[test]
	fn test_weird_charge() {
		assert_eq!(parse_charge("-2"), -2);
		assert_eq!(parse_charge("1+"), 1);
		assert_eq!(parse_charge("  "), 0);
		assert_eq!(parse_charge("??"), 0);
	}

	#[test]
	fn test_residues_created_on_first_sight() {
		let mut model = Model::bare();
		let aniso = AnisoMap::new();
		add_atom_to_polymer("ATOM     10  N   RES A  10", &mut model, "A", "A.10", &aniso);
		add_atom_to_polymer("ATOM     11  CA  RES A  10", &mut model, "A", "A.10", &aniso);
		add_atom_to_polymer("ATOM     12  N   SER A  11", &mut model, "A", "A.11", &aniso);
		let chain = &model.polymer["A"];
		assert_eq!(chain.internal_id, "A");
		assert_eq!(chain.residues["A.10"].name, "RES");
		assert_eq!(chain.residues["A.10"].number, 1);
		assert_eq!(chain.residues["A.10"].atoms.keys().collect::<Vec<_>>(), [&10, &11]);
		assert_eq!(chain.residues["A.11"].number, 2);
	}

	#[test]
	fn test_non_polymer_and_water() {
		let mut model = Model::bare();
		let aniso = AnisoMap::new();
		add_atom_to_non_polymer("HETATM   10  C1  MOL A 500", &mut model, "A.500", &aniso);
		add_atom_to_non_polymer("HETATM   11  O   HOH A 600", &mut model, "A.600", &aniso);
		let molecule = &model.non_polymer["A.500"];
		assert_eq!(molecule.name, "MOL");
		assert_eq!(molecule.internal_id, "A");
		assert_eq!(molecule.polymer.as_deref(), Some("A"));
		assert!(molecule.atoms.contains_key(&10u32));
		assert!(model.water["A.600"].atoms.contains_key(&11u32));
	}

	#[test]
	fn test_model_decomposition() {
		let lines = [
			"ATOM      1  N   ALA A   1       0.000   0.000   0.000  1.00 10.00           N",
			"ATOM      2  CA  ALA A   1       1.000   0.000   0.000  1.00 10.00           C",
			"ANISOU    2  CA  ALA A   1     2406   1892   1614    198    519   -328       C",
			"HETATM    3  N   MSE A   2       2.000   0.000   0.000  1.00 10.00           N",
			"TER       4      MSE A   2",
			"ATOM      5  N   GLY B   1       3.000   0.000   0.000  1.00 10.00           N",
			"TER       6      GLY B   1",
			"HETATM    7  C1  LIG A 101       4.000   0.000   0.000  1.00 10.00           C",
			"HETATM    8  O   HOH A 201       5.000   0.000   0.000  1.00 10.00           O",
		];
		let mut sequences = IndexMap::new();
		sequences.insert("A".to_string(), "AM".to_string());
		let model = model_lines_to_model(&lines, &sequences);
		assert_eq!(model.polymer.keys().collect::<Vec<_>>(), ["A", "B"]);
		assert_eq!(model.polymer["A"].residues.keys().collect::<Vec<_>>(), ["A.1", "A.2"]);
		assert_eq!(model.polymer["A"].residues["A.2"].name, "MSE");
		assert_eq!(model.polymer["A"].sequence, "AM");
		assert_eq!(model.polymer["B"].sequence, "");
		assert_eq!(model.polymer["A"].residues["A.1"].atoms[&2u32].anisotropy[0], 0.2406);
		assert_eq!(model.non_polymer.keys().collect::<Vec<_>>(), ["A.101"]);
		assert_eq!(model.water.keys().collect::<Vec<_>>(), ["A.201"]);
		assert_eq!(model.atom_count(), 6);
	}

	#[test]
	fn test_declared_model_count() {
		assert_eq!(declared_model_count(&RecordMap::default()), None);
		assert_eq!(declared_model_count(&pdb_string_to_pdb_dict("NUMMDL    20")), Some(20));
		assert_eq!(declared_model_count(&pdb_string_to_pdb_dict("NUMMDL    XX")), None);
	}

	#[test]
	fn test_miscounted_models_are_kept() {
		let map = pdb_string_to_pdb_dict(&[
			"NUMMDL    3",
			"MODEL        1", "ATOM      1  N   ALA A   1       0.000   0.000   0.000", "ENDMDL",
			"MODEL        2", "ATOM      1  N   ALA A   1       1.000   0.000   0.000", "ENDMDL",
		].join("\n"));
		assert_eq!(update_models_list(&map).len(), 2);
	}

	#[test]
	fn test_nucleotide_tokens_in_sequences() {
		let map = pdb_string_to_pdb_dict("SEQRES   1 B    4  DA DN T N");
		assert_eq!(make_sequences(&map)["B"], "ANTN");
	}

	#[test]
	fn test_file_without_atoms_has_one_model() {
		let models = update_models_list(&pdb_string_to_pdb_dict("HEADER    NOTHING"));
		assert_eq!(models, vec![Model::bare()]);
	}
}
