//! In-process flat-scan index over unit vectors.
//!
//! Brute-force dot product is exact and fast enough for the dataset sizes
//! this backend targets (tests and small offline runs). Results are fully
//! deterministic: ties break by action id ascending.

use std::{collections::BTreeMap, sync::Mutex};

use serde_json::{Map, Value};

use crate::{
	Error, Result,
	models::{ScoredAction, check_upsert_lengths, clamp_similarity, cmp_similarity_desc},
};

#[derive(Debug, Clone)]
struct StoredAction {
	document: String,
	embedding: Vec<f32>,
	metadata: Map<String, Value>,
}

#[derive(Debug, Default)]
pub struct MemoryIndex {
	// BTreeMap keeps ids unique and iteration order stable across runs.
	actions: Mutex<BTreeMap<String, StoredAction>>,
}
impl MemoryIndex {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.actions.lock().unwrap_or_else(|err| err.into_inner()).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Replaces any existing entries sharing an id.
	pub fn upsert_actions(
		&self,
		ids: &[String],
		documents: &[String],
		embeddings: &[Vec<f32>],
		metadatas: &[Map<String, Value>],
	) -> Result<()> {
		check_upsert_lengths(ids.len(), documents.len(), embeddings.len(), metadatas.len())?;

		let mut actions = self.actions.lock().unwrap_or_else(|err| err.into_inner());

		if let Some(stored_dim) = actions.values().next().map(|action| action.embedding.len())
			&& let Some(incoming) = embeddings.iter().find(|vec| vec.len() != stored_dim)
		{
			return Err(Error::InvalidArgument(format!(
				"Embedding dimension {} does not match index dimension {stored_dim}.",
				incoming.len()
			)));
		}

		for (((id, document), embedding), metadata) in
			ids.iter().zip(documents).zip(embeddings).zip(metadatas)
		{
			actions.insert(id.clone(), StoredAction {
				document: document.clone(),
				embedding: embedding.clone(),
				metadata: metadata.clone(),
			});
		}

		Ok(())
	}

	/// Returns at most `top_k` actions ordered by similarity descending.
	pub fn query_by_embedding(&self, embedding: &[f32], top_k: u32) -> Result<Vec<ScoredAction>> {
		let actions = self.actions.lock().unwrap_or_else(|err| err.into_inner());

		if let Some(stored_dim) = actions.values().next().map(|action| action.embedding.len())
			&& embedding.len() != stored_dim
		{
			return Err(Error::InvalidArgument(format!(
				"Query dimension {} does not match index dimension {stored_dim}.",
				embedding.len()
			)));
		}

		let mut scored: Vec<ScoredAction> = actions
			.iter()
			.map(|(id, action)| ScoredAction {
				action_id: id.clone(),
				similarity: clamp_similarity(dot(embedding, &action.embedding)),
				metadata: action.metadata.clone(),
				document: action.document.clone(),
			})
			.collect();

		scored.sort_by(|left, right| {
			cmp_similarity_desc(left.similarity, right.similarity)
				.then_with(|| left.action_id.cmp(&right.action_id))
		});
		scored.truncate(top_k as usize);

		Ok(scored)
	}
}

fn dot(left: &[f32], right: &[f32]) -> f32 {
	left.iter().zip(right).map(|(a, b)| a * b).sum()
}
