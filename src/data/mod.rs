//! Typed data dictionary produced by parsing a PDB file.
//!
//! Every field is always present: absent values are `None` or empty
//! collections. Maps keep the order in which entries were first seen.
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Serialize, Deserialize};
use crate::utils::PdbError;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Description {
	pub code: Option<String>,
	pub title: Option<String>,
	pub deposition_date: Option<NaiveDate>,
	pub classification: Option<String>,
	pub keywords: Vec<String>,
	pub authors: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// A residue listed in REMARK 465 as absent from the coordinates.
pub struct MissingResidue {
	pub name: String,
	pub id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Experiment {
	pub technique: Option<String>,
	pub source_organism: Option<String>,
	pub expression_system: Option<String>,
	pub missing_residues: Vec<MissingResidue>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Quality {
	pub resolution: Option<f64>,
	pub rvalue: Option<f64>,
	pub rfree: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// One rotation and translation applied to a set of chains.
pub struct Transformation {
	pub chains: Vec<String>,
	pub matrix: [[f64; 3]; 3],
	pub vector: [f64; 3],
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
/// A biological assembly declared in REMARK 350.
pub struct Assembly {
	pub id: u32,
	pub software: Option<String>,
	pub delta_energy: Option<f64>,
	pub buried_surface_area: Option<f64>,
	pub surface_area: Option<f64>,
	pub transformations: Vec<Transformation>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// Unit cell and space group from CRYST1.
pub struct Crystallography {
	pub space_group: Option<String>,
	pub unit_cell: [f64; 6],
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Geometry {
	pub assemblies: Vec<Assembly>,
	pub crystallography: Option<Crystallography>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Atom {
	pub name: String,
	pub alt_loc: Option<char>,
	pub x: f64,
	pub y: f64,
	pub z: f64,
	pub occupancy: f64,
	pub bvalue: f64,
	/// Anisotropic displacement in true units; all zero without an ANISOU record.
	pub anisotropy: [f64; 6],
	pub element: String,
	pub charge: i8,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Residue {
	pub name: String,
	/// 1-based position of the residue within its chain.
	pub number: usize,
	pub atoms: IndexMap<u32, Atom>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Polymer {
	pub internal_id: String,
	/// One letter sequence from SEQRES, empty when the file has none for this chain.
	pub sequence: String,
	pub residues: IndexMap<String, Residue>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// A ligand or water molecule.
pub struct Molecule {
	pub internal_id: String,
	pub polymer: Option<String>,
	pub name: String,
	pub atoms: IndexMap<u32, Atom>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Model {
	pub polymer: IndexMap<String, Polymer>,
	#[serde(rename = "non-polymer")]
	pub non_polymer: IndexMap<String, Molecule>,
	pub water: IndexMap<String, Molecule>,
}

impl Model {
	pub fn bare() -> Model {
		Model::default()
	}

	/// Total atoms across polymer, non-polymer and water.
	pub fn atom_count(&self) -> usize {
		let residues: usize = self.polymer.values()
			.flat_map(|chain| chain.residues.values())
			.map(|residue| residue.atoms.len())
			.sum();
		let molecules: usize = self.non_polymer.values().chain(self.water.values())
			.map(|molecule| molecule.atoms.len())
			.sum();
		residues + molecules
	}
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
/// Everything extracted from one PDB file.
pub struct DataDict {
	pub description: Description,
	pub experiment: Experiment,
	pub quality: Quality,
	pub geometry: Geometry,
	/// CONECT bonds: atom serial to bonded serials.
	pub connections: IndexMap<u32, Vec<u32>>,
	pub models: Vec<Model>,
}

impl DataDict {
	/// Creates a new, empty data dictionary with every field at its default.
	pub fn bare() -> DataDict {
		DataDict::default()
	}

	pub fn to_json(&self) -> Result<String, PdbError> {
		serde_json::to_string(self).map_err(PdbError::Json)
	}
}
