//! Deterministic doubles and fixtures for alignment tests.
//!
//! The embedding provider is a fixed text-to-vector lookup table; paired
//! with the in-process index, two identical runs produce bit-identical
//! scores.

use std::collections::BTreeMap;

use color_eyre::eyre;
use serde_json::Map;

use strata_config::{
	Alignment, Config, EmbeddingProviderConfig, Providers, Qdrant, Service, Storage, Thresholds,
};
use strata_domain::{ActionTask, StrategicObjective};
use strata_service::{BoxFuture, EmbeddingProvider};

/// Embeds by exact lookup on the normalized text; unknown text is an error,
/// matching the fail-fast provider contract.
#[derive(Debug, Default, Clone)]
pub struct FixtureEmbedder {
	vectors: BTreeMap<String, Vec<f32>>,
}
impl FixtureEmbedder {
	pub fn new<I, S>(entries: I) -> Self
	where
		I: IntoIterator<Item = (S, Vec<f32>)>,
		S: Into<String>,
	{
		Self {
			vectors: entries.into_iter().map(|(text, vec)| (text.into(), vec)).collect(),
		}
	}

	pub fn insert(&mut self, text: impl Into<String>, vector: Vec<f32>) {
		self.vectors.insert(text.into(), vector);
	}
}
impl EmbeddingProvider for FixtureEmbedder {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(async move {
			texts
				.iter()
				.map(|text| {
					self.vectors
						.get(text)
						.cloned()
						.ok_or_else(|| eyre::eyre!("No fixture embedding for {text:?}."))
				})
				.collect()
		})
	}
}

/// Config wired for in-process tests; dimensions drive both the provider and
/// the index side of the validation.
pub fn test_config(dimensions: u32) -> Config {
	Config {
		service: Service { log_level: "info".to_string() },
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "fixture".to_string(),
				api_base: "http://localhost".to_string(),
				api_key: "test".to_string(),
				path: "/v1/embeddings".to_string(),
				model: "fixture-embedder".to_string(),
				dimensions,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		storage: Storage {
			qdrant: Qdrant {
				url: "http://localhost:6334".to_string(),
				collection: "actions".to_string(),
				vector_dim: dimensions,
			},
		},
		alignment: Alignment { top_k: 5, thresholds: Thresholds::default() },
	}
}

pub fn strategy(id: &str, title: &str, description: &str, kpis: &[&str]) -> StrategicObjective {
	StrategicObjective {
		id: id.to_string(),
		title: title.to_string(),
		description: description.to_string(),
		kpis: kpis.iter().map(|kpi| kpi.to_string()).collect(),
		priority: None,
		extra: Map::new(),
	}
}

pub fn action(id: &str, title: &str, description: &str, owner: &str) -> ActionTask {
	ActionTask {
		id: id.to_string(),
		title: title.to_string(),
		description: description.to_string(),
		owner: owner.to_string(),
		start_date: None,
		end_date: None,
		outputs: Vec::new(),
		extra: Map::new(),
	}
}
