use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::Date;

/// One strategic objective, immutable once loaded.
///
/// Unknown JSON fields land in `extra` and survive round-trip serialization;
/// scoring never reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategicObjective {
	pub id: String,
	pub title: String,
	pub description: String,
	#[serde(default)]
	pub kpis: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub priority: Option<Priority>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// One proposed action/task entry, immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionTask {
	pub id: String,
	pub title: String,
	pub description: String,
	#[serde(default)]
	pub owner: String,
	#[serde(default, with = "crate::date_serde", skip_serializing_if = "Option::is_none")]
	pub start_date: Option<Date>,
	#[serde(default, with = "crate::date_serde", skip_serializing_if = "Option::is_none")]
	pub end_date: Option<Date>,
	#[serde(default)]
	pub outputs: Vec<String>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// Source datasets carry priorities either as labels ("high") or ranks (1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Priority {
	Number(i64),
	Text(String),
}
