use serde_json::{Map, Value};

use strata_config::{Config, Thresholds};
use strata_domain::{ActionTask, AlignmentLabel, StrategicObjective, date_serde, text};
use strata_storage::{models::ScoredAction, qdrant::QdrantStore};

use crate::{Backends, Error, ServiceResult};

/// One retrieved action for a strategy query.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MatchResult {
	pub action_id: String,
	pub title: String,
	pub owner: String,
	pub start_date: String,
	pub end_date: String,
	pub similarity: f32,
	pub alignment_label: AlignmentLabel,
}

/// One strategy's aggregated outcome, matches ranked by similarity descending.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StrategyResult {
	pub strategy_id: String,
	pub strategy_title: String,
	pub avg_top3_similarity: f64,
	pub alignment_label: AlignmentLabel,
	pub top_matches: Vec<MatchResult>,
}

/// The full outcome of one alignment run. Never mutated after construction;
/// the model identifier and thresholds ride along for reproducibility.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AlignmentRunResult {
	pub model: String,
	pub thresholds: Thresholds,
	pub overall_score: f64,
	pub coverage_percent: f64,
	pub strategy_results: Vec<StrategyResult>,
}

/// Computes alignment between strategies and actions using embeddings plus a
/// vector index.
pub struct AlignmentEngine {
	pub cfg: Config,
	pub backends: Backends,
}
impl AlignmentEngine {
	pub fn new(cfg: Config, store: QdrantStore) -> Self {
		Self { cfg, backends: Backends::with_qdrant(store) }
	}

	pub fn with_backends(cfg: Config, backends: Backends) -> Self {
		Self { cfg, backends }
	}

	/// Normalizes, embeds, and upserts every action keyed by its id.
	///
	/// Idempotent: repeating the call with the same actions replaces entries
	/// in place and leaves query results unchanged.
	pub async fn index_actions(&self, actions: &[ActionTask]) -> ServiceResult<()> {
		if actions.is_empty() {
			return Ok(());
		}

		let ids: Vec<String> = actions.iter().map(|action| action.id.clone()).collect();
		let documents: Vec<String> = actions.iter().map(text::action_text).collect();
		let embeddings = self.embed_texts(&documents).await?;
		let metadatas: Vec<Map<String, Value>> =
			actions.iter().map(action_metadata).collect();

		self.backends
			.index
			.upsert(&ids, &documents, &embeddings, &metadatas)
			.await
			.map_err(|err| Error::Index { message: err.to_string() })?;

		tracing::debug!(actions = ids.len(), "Indexed actions.");

		Ok(())
	}

	/// Scores every strategy against the indexed actions.
	///
	/// Always re-indexes `actions` first; the engine assumes nothing about
	/// prior index state. Empty inputs produce a valid zero-valued result.
	pub async fn align(
		&self,
		strategies: &[StrategicObjective],
		actions: &[ActionTask],
		top_k: u32,
	) -> ServiceResult<AlignmentRunResult> {
		self.index_actions(actions).await?;

		let thresholds = self.cfg.alignment.thresholds;
		let mut strategy_results = Vec::with_capacity(strategies.len());
		let mut avg_sum = 0.0_f64;
		let mut covered = 0_usize;

		for strategy in strategies {
			let query_text = text::strategy_text(strategy);
			let embedding = self
				.embed_texts(std::slice::from_ref(&query_text))
				.await?
				.into_iter()
				.next()
				.ok_or_else(|| Error::Provider {
					message: "Embedding provider returned no vectors.".to_string(),
				})?;
			let matches = self
				.backends
				.index
				.query(&embedding, top_k)
				.await
				.map_err(|err| Error::Index { message: err.to_string() })?;

			let top_matches: Vec<MatchResult> = matches
				.iter()
				.map(|scored| MatchResult {
					action_id: scored.action_id.clone(),
					title: metadata_str(scored, "title"),
					owner: metadata_str(scored, "owner"),
					start_date: metadata_str(scored, "start_date"),
					end_date: metadata_str(scored, "end_date"),
					similarity: scored.similarity,
					alignment_label: AlignmentLabel::for_score(
						f64::from(scored.similarity),
						&thresholds,
					),
				})
				.collect();

			let avg = avg_top3_similarity(&matches);
			let strong_count = top_matches
				.iter()
				.filter(|found| found.alignment_label == AlignmentLabel::Strong)
				.count();

			if strong_count >= 2 {
				covered += 1;
			}

			avg_sum += avg;

			tracing::debug!(
				strategy_id = %strategy.id,
				matches = top_matches.len(),
				avg_top3 = avg,
				strong = strong_count,
				"Scored strategy."
			);

			strategy_results.push(StrategyResult {
				strategy_id: strategy.id.clone(),
				strategy_title: strategy.title.clone(),
				avg_top3_similarity: avg,
				alignment_label: AlignmentLabel::for_score(avg, &thresholds),
				top_matches,
			});
		}

		let overall_score = round2(avg_sum / strategies.len().max(1) as f64 * 100.0);
		let coverage_percent = round2(covered as f64 / strategies.len().max(1) as f64 * 100.0);

		Ok(AlignmentRunResult {
			model: self.cfg.providers.embedding.model.clone(),
			thresholds,
			overall_score,
			coverage_percent,
			strategy_results,
		})
	}

	async fn embed_texts(&self, texts: &[String]) -> ServiceResult<Vec<Vec<f32>>> {
		let vectors =
			self.backends.embedding.embed(&self.cfg.providers.embedding, texts).await?;

		if vectors.len() != texts.len() {
			return Err(Error::Provider {
				message: "Embedding provider returned mismatched vector count.".to_string(),
			});
		}

		let expected_dim = self.cfg.storage.qdrant.vector_dim as usize;

		if let Some(vector) = vectors.iter().find(|vector| vector.len() != expected_dim) {
			return Err(Error::Provider {
				message: format!(
					"Embedding vector dimension {} does not match configured {expected_dim}.",
					vector.len()
				),
			});
		}

		Ok(vectors)
	}
}

/// Mean of the up-to-three highest similarities among the matches; 0 when
/// there are none. Never exceeds the best single similarity.
fn avg_top3_similarity(matches: &[ScoredAction]) -> f64 {
	let mut similarities: Vec<f32> =
		matches.iter().map(|scored| scored.similarity).collect();

	similarities.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
	similarities.truncate(3);

	if similarities.is_empty() {
		return 0.0;
	}

	similarities.iter().map(|sim| f64::from(*sim)).sum::<f64>() / similarities.len() as f64
}

fn action_metadata(action: &ActionTask) -> Map<String, Value> {
	let mut metadata = Map::new();

	metadata.insert("title".to_string(), sanitize_value(Value::String(action.title.clone())));
	metadata.insert("owner".to_string(), sanitize_value(Value::String(action.owner.clone())));
	metadata.insert(
		"start_date".to_string(),
		Value::String(date_serde::to_iso(action.start_date)),
	);
	metadata
		.insert("end_date".to_string(), Value::String(date_serde::to_iso(action.end_date)));

	metadata
}

/// Metadata values are restricted to primitive scalars. Absent values become
/// empty strings; downstream consumers treat absent and empty identically.
fn sanitize_value(value: Value) -> Value {
	match value {
		Value::Null => Value::String(String::new()),
		Value::String(_) | Value::Number(_) | Value::Bool(_) => value,
		other => Value::String(other.to_string()),
	}
}

fn metadata_str(scored: &ScoredAction, key: &str) -> String {
	scored.metadata.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}

fn round2(value: f64) -> f64 {
	(value * 100.0).round() / 100.0
}
