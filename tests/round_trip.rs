use pdb_records::data::{Atom, DataDict, Model};
use pdb_records::models::make_sequences;
use pdb_records::records::pdb_string_to_pdb_dict;
use pdb_records::write::{pack_sequences, AtomView, ChainView, Owner, StructureView};
use pdb_records::{pdb_string_to_data_dict, structure_to_pdb_string, PdbError};
use test_log::test;

const SMALL: &str = include_str!("data/1abc.pdb");

struct FlatAtom {
	id: u32,
	atom: Atom,
	chain: String,
	owner_id: String,
	owner_name: String,
	in_residue: bool,
}

impl AtomView for FlatAtom {
	fn id(&self) -> u32 { self.id }
	fn name(&self) -> &str { &self.atom.name }
	fn alt_loc(&self) -> Option<char> { self.atom.alt_loc }
	fn location(&self) -> [f64; 3] { [self.atom.x, self.atom.y, self.atom.z] }
	fn occupancy(&self) -> f64 { self.atom.occupancy }
	fn bvalue(&self) -> f64 { self.atom.bvalue }
	fn charge(&self) -> i8 { self.atom.charge }
	fn element(&self) -> &str { &self.atom.element }
	fn anisotropy(&self) -> [f64; 6] { self.atom.anisotropy }
	fn chain_id(&self) -> Option<&str> { Some(&self.chain) }
	fn owner(&self) -> Option<Owner<'_>> {
		let (id, name) = (self.owner_id.as_str(), self.owner_name.as_str());
		Some(if self.in_residue { Owner::Residue { id, name } } else { Owner::Ligand { id, name } })
	}
}

struct FlatChain {
	id: String,
	sequence: String,
}

impl ChainView for FlatChain {
	fn id(&self) -> &str { &self.id }
	fn sequence(&self) -> &str { &self.sequence }
}

/// A structure flattened out of one parsed model.
struct FlatStructure {
	atoms: Vec<FlatAtom>,
	chains: Vec<FlatChain>,
}

impl FlatStructure {
	fn from_model(model: &Model) -> FlatStructure {
		let mut atoms = Vec::new();
		let mut chains = Vec::new();
		for (chain_id, chain) in &model.polymer {
			chains.push(FlatChain { id: chain_id.clone(), sequence: chain.sequence.clone() });
			for (residue_id, residue) in &chain.residues {
				for (id, atom) in &residue.atoms {
					atoms.push(FlatAtom {
						id: *id,
						atom: atom.clone(),
						chain: chain_id.clone(),
						owner_id: residue_id.clone(),
						owner_name: residue.name.clone(),
						in_residue: true,
					});
				}
			}
		}
		for (molecule_id, molecule) in model.non_polymer.iter().chain(model.water.iter()) {
			for (id, atom) in &molecule.atoms {
				atoms.push(FlatAtom {
					id: *id,
					atom: atom.clone(),
					chain: molecule.internal_id.clone(),
					owner_id: molecule_id.clone(),
					owner_name: molecule.name.clone(),
					in_residue: false,
				});
			}
		}
		FlatStructure { atoms, chains }
	}
}

impl StructureView for FlatStructure {
	fn atoms(&self) -> Vec<&dyn AtomView> {
		self.atoms.iter().map(|a| a as &dyn AtomView).collect()
	}

	fn chains(&self) -> Result<Vec<&dyn ChainView>, PdbError> {
		Ok(self.chains.iter().map(|c| c as &dyn ChainView).collect())
	}
}

fn parse(text: &str) -> DataDict {
	pdb_string_to_data_dict(text)
}

#[test]
fn written_structure_parses_back_to_the_same_model() {
	let data = parse(SMALL);
	let written = structure_to_pdb_string(&FlatStructure::from_model(&data.models[0]));
	let reparsed = parse(&written);
	assert_eq!(reparsed.models.len(), 1);
	assert_eq!(reparsed.models[0], data.models[0]);
}

#[test]
fn written_structure_layout() {
	let data = parse(SMALL);
	let written = structure_to_pdb_string(&FlatStructure::from_model(&data.models[0]));
	let records: Vec<&str> = written.lines().map(|line| line.get(..6).unwrap_or(line).trim_end()).collect();
	assert_eq!(records, ["SEQRES", "ATOM", "ANISOU", "ATOM", "ATOM", "TER", "HETATM", "HETATM"]);
	assert!(written.starts_with("SEQRES   1 A    2  MET GLY\n"));
	assert!(written.contains("\nATOM      1  N   MET A   1       1.000   2.000   3.000  1.00  10.0           N  \n"));
}

#[test]
fn wrapped_sequences_read_back_unchanged() {
	let protein = "MKTAYIAKQRQISFVKSHFSRQ";
	let dna = "ACGTTGCAACGTTGCAAC";
	let structure = FlatStructure {
		atoms: Vec::new(),
		chains: vec![
			FlatChain { id: "B".to_string(), sequence: dna.to_string() },
			FlatChain { id: "A".to_string(), sequence: protein.to_string() },
		],
	};
	let mut lines = Vec::new();
	pack_sequences(&structure, &mut lines);
	assert_eq!(lines.len(), 4);
	assert!(lines[1].starts_with("SEQRES   2 A   22  "));
	assert!(lines[2].starts_with("SEQRES   1 B   18  DA DC DG DT"));
	let sequences = make_sequences(&pdb_string_to_pdb_dict(&lines.join("\n")));
	assert_eq!(sequences["A"], protein);
	assert_eq!(sequences["B"], dna);
}

#[test]
fn one_model_per_model_record() {
	let text = "\
MODEL        1
ATOM      1  N   MET A   1       1.000   2.000   3.000  1.00 10.00           N
ENDMDL
MODEL        2
ATOM      1  N   MET A   1       1.500   2.000   3.000  1.00 10.00           N
ENDMDL
MODEL        3
ATOM      1  N   MET A   1       2.000   2.000   3.000  1.00 10.00           N
ENDMDL
END";
	let data = parse(text);
	assert_eq!(data.models.len(), 3);
	let xs: Vec<f64> = data.models.iter()
		.map(|model| model.polymer["A"].residues["A.1"].atoms[&1u32].x)
		.collect();
	assert_eq!(xs, [1.0, 1.5, 2.0]);
}

#[test]
fn json_export_of_a_parsed_file() {
	let json = parse(SMALL).to_json().unwrap();
	assert!(json.contains("\"code\":\"1ABC\""));
	assert!(json.contains("\"non-polymer\":{\"A.101\""));
}
