use std::{fs, path::Path};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{ActionTask, StrategicObjective};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read input file at {path:?}.")]
	ReadInput { path: std::path::PathBuf, source: std::io::Error },
	#[error("Failed to parse {path:?}: {source}")]
	ParseInput { path: std::path::PathBuf, source: serde_json::Error },
	#[error("Expected a JSON array at {path:?}.")]
	NotAnArray { path: std::path::PathBuf },
	#[error("Record at index {index} in {path:?} has an empty id.")]
	EmptyId { path: std::path::PathBuf, index: usize },
}

/// Loads strategic objectives from a JSON array file.
pub fn load_strategies(path: &Path) -> Result<Vec<StrategicObjective>> {
	let strategies: Vec<StrategicObjective> = load_array(path)?;

	check_ids(path, strategies.iter().map(|strategy| strategy.id.as_str()))?;

	Ok(strategies)
}

/// Loads action tasks from a JSON array file.
pub fn load_actions(path: &Path) -> Result<Vec<ActionTask>> {
	let actions: Vec<ActionTask> = load_array(path)?;

	check_ids(path, actions.iter().map(|action| action.id.as_str()))?;

	Ok(actions)
}

fn load_array<T>(path: &Path) -> Result<Vec<T>>
where
	T: DeserializeOwned,
{
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadInput { path: path.to_path_buf(), source: err })?;
	let value: Value = serde_json::from_str(&raw)
		.map_err(|err| Error::ParseInput { path: path.to_path_buf(), source: err })?;

	if !value.is_array() {
		return Err(Error::NotAnArray { path: path.to_path_buf() });
	}

	serde_json::from_value(value)
		.map_err(|err| Error::ParseInput { path: path.to_path_buf(), source: err })
}

fn check_ids<'a>(path: &Path, ids: impl Iterator<Item = &'a str>) -> Result<()> {
	for (index, id) in ids.enumerate() {
		if id.trim().is_empty() {
			return Err(Error::EmptyId { path: path.to_path_buf(), index });
		}
	}

	Ok(())
}
