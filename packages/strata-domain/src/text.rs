//! Deterministic canonicalization of entity text for embedding.
//!
//! Downstream embeddings and test fixtures depend on byte-identical output
//! for byte-identical input, so nothing here may consult locale, time, or
//! randomness.

use crate::{ActionTask, StrategicObjective};

/// Collapses internal whitespace runs to single spaces and trims the ends.
/// Casing is preserved.
pub fn clean_text(text: &str) -> String {
	text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Combines title, description, and KPIs into a single embeddable string.
pub fn strategy_text(strategy: &StrategicObjective) -> String {
	join_fields(&[
		clean_text(&strategy.title),
		clean_text(&strategy.description),
		clean_text(&strategy.kpis.join("; ")),
	])
}

/// Combines title, description, and outputs into a single embeddable string.
pub fn action_text(action: &ActionTask) -> String {
	join_fields(&[
		clean_text(&action.title),
		clean_text(&action.description),
		clean_text(&action.outputs.join("; ")),
	])
}

// Empty fields are skipped entirely rather than kept as empty segments.
fn join_fields(parts: &[String]) -> String {
	parts.iter().filter(|part| !part.is_empty()).cloned().collect::<Vec<_>>().join(" | ")
}
