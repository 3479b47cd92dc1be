///! # PDB Records
///!
///! `pdb_records` reads Protein Data Bank text into a typed data dictionary and
///! writes structures back out as fixed-column atom records.
pub mod utils;
pub mod config;
pub mod records;
pub mod seq;
pub mod data;
pub mod extract;
pub mod models;
pub mod write;
pub mod pdb;

pub use crate::config::ParserConfig;
pub use crate::data::DataDict;
pub use crate::pdb::{pdb_string_to_data_dict, pdb_string_to_data_dict_with, structure_to_pdb_string};
pub use crate::utils::PdbError;
