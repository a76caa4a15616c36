use std::cmp::Ordering;

use serde_json::{Map, Value};

/// One retrieved action for a query vector: the stored id, the cosine
/// similarity clamped to [0, 1], the sanitized metadata snapshot, and the
/// normalized document text that was embedded.
#[derive(Debug, Clone)]
pub struct ScoredAction {
	pub action_id: String,
	pub similarity: f32,
	pub metadata: Map<String, Value>,
	pub document: String,
}

pub(crate) fn check_upsert_lengths(
	ids: usize,
	documents: usize,
	embeddings: usize,
	metadatas: usize,
) -> crate::Result<()> {
	if ids != documents || ids != embeddings || ids != metadatas {
		return Err(crate::Error::InvalidArgument(format!(
			"Upsert slices must have equal lengths, got ids={ids}, documents={documents}, \
			 embeddings={embeddings}, metadatas={metadatas}."
		)));
	}

	Ok(())
}

/// Floating-point overshoot from the index is clamped rather than propagated.
pub(crate) fn clamp_similarity(score: f32) -> f32 {
	if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) }
}

pub(crate) fn cmp_similarity_desc(a: f32, b: f32) -> Ordering {
	b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
