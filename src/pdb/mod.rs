///! Tools for parsing PDB text into a data dictionary, and writing structures back.
use log::debug;
use crate::config::ParserConfig;
use crate::data::{DataDict, Geometry};
use crate::extract;
use crate::models::update_models_list;
use crate::records::{pdb_string_to_pdb_dict, RecordMap};

pub use crate::write::structure_to_pdb_string;

/// Parses PDB text with the default configuration.
pub fn pdb_string_to_data_dict(filestring: &str) -> DataDict {
	pdb_string_to_data_dict_with(filestring, &ParserConfig::default())
}

pub fn pdb_string_to_data_dict_with(filestring: &str, config: &ParserConfig) -> DataDict {
	let map = pdb_string_to_pdb_dict(filestring);
	pdb_dict_to_data_dict(&map, config)
}

/// Runs every extractor over an aggregated record map.
///
/// Each group degrades to its defaults on its own; nothing here fails.
pub fn pdb_dict_to_data_dict(map: &RecordMap, config: &ParserConfig) -> DataDict {
	let mut data = DataDict::bare();
	update_description(map, &mut data, config);
	update_experiment(map, &mut data);
	update_quality(map, &mut data);
	update_geometry(map, &mut data);
	data.connections = extract::extract_connections(map);
	data.models = update_models_list(map);
	debug!(
		"Parsed {} with {} model(s)",
		data.description.code.as_deref().unwrap_or("unnamed entry"),
		data.models.len()
	);
	data
}

pub fn update_description(map: &RecordMap, data: &mut DataDict, config: &ParserConfig) {
	let header = extract::extract_header(map, config);
	let description = &mut data.description;
	description.code = header.code;
	description.deposition_date = header.deposition_date;
	description.classification = header.classification;
	description.title = extract::extract_title(map);
	description.keywords = extract::extract_keywords(map);
	description.authors = extract::extract_authors(map);
}

pub fn update_experiment(map: &RecordMap, data: &mut DataDict) {
	let source = extract::extract_source(map);
	let experiment = &mut data.experiment;
	experiment.technique = extract::extract_technique(map);
	experiment.source_organism = source.organism;
	experiment.expression_system = source.expression_system;
	experiment.missing_residues = extract::extract_missing_residues(map);
}

pub fn update_quality(map: &RecordMap, data: &mut DataDict) {
	let (rvalue, rfree) = extract::extract_rvalue(map);
	data.quality.resolution = extract::extract_resolution(map);
	data.quality.rvalue = rvalue;
	data.quality.rfree = rfree;
}

pub fn update_geometry(map: &RecordMap, data: &mut DataDict) {
	data.geometry = Geometry {
		assemblies: extract::extract_assemblies(map),
		crystallography: extract::extract_crystallography(map),
	};
}
