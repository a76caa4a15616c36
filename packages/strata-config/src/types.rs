use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub providers: Providers,
	pub storage: Storage,
	pub alignment: Alignment,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub qdrant: Qdrant,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub collection: String,
	pub vector_dim: u32,
}

#[derive(Debug, Deserialize)]
pub struct Alignment {
	#[serde(default = "default_top_k")]
	pub top_k: u32,
	#[serde(default)]
	pub thresholds: Thresholds,
}

/// Similarity cutoffs separating Strong, Medium, and Weak alignment labels.
///
/// `medium` must not exceed `strong`; `validate` enforces the ordering so the
/// scoring engine never has to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
	pub strong: f64,
	pub medium: f64,
}
impl Default for Thresholds {
	fn default() -> Self {
		Self { strong: 0.75, medium: 0.55 }
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_top_k() -> u32 {
	5
}
