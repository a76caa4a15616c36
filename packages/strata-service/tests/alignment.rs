use std::sync::Arc;

use strata_config::EmbeddingProviderConfig;
use strata_domain::{ActionTask, AlignmentLabel, StrategicObjective, text};
use strata_service::{
	AlignmentEngine, Backends, BoxFuture, EmbeddingProvider, Error,
};
use strata_storage::memory::MemoryIndex;
use strata_testkit::{FixtureEmbedder, action, strategy, test_config};

// 2D unit-ish vectors chosen so similarities land on the label boundaries.
fn fixtures() -> (Vec<StrategicObjective>, Vec<ActionTask>, FixtureEmbedder) {
	let strategies = vec![
		strategy("S1", "Grow research output", "Increase publications", &["papers"]),
		strategy("S2", "Improve teaching", "Better courses", &[]),
	];
	let actions = vec![
		action("A1", "Hire researchers", "Recruit faculty", "HR"),
		action("A2", "Fund laboratories", "Equip labs", "Finance"),
		action("A3", "Curriculum review", "Redesign courses", "Teaching"),
	];

	let mut embedder = FixtureEmbedder::default();

	embedder.insert(text::strategy_text(&strategies[0]), vec![1.0, 0.0]);
	embedder.insert(text::strategy_text(&strategies[1]), vec![0.0, 1.0]);
	embedder.insert(text::action_text(&actions[0]), vec![1.0, 0.0]);
	embedder.insert(text::action_text(&actions[1]), vec![0.8, 0.6]);
	embedder.insert(text::action_text(&actions[2]), vec![0.55, 0.835_164_6]);

	(strategies, actions, embedder)
}

fn engine_with(embedder: FixtureEmbedder, index: Arc<MemoryIndex>) -> AlignmentEngine {
	AlignmentEngine::with_backends(test_config(2), Backends::new(Arc::new(embedder), index))
}

#[tokio::test]
async fn align_is_deterministic() {
	let (strategies, actions, embedder) = fixtures();
	let engine = engine_with(embedder, Arc::new(MemoryIndex::new()));

	let first = engine.align(&strategies, &actions, 5).await.expect("First run must succeed.");
	let second =
		engine.align(&strategies, &actions, 5).await.expect("Second run must succeed.");

	assert_eq!(first.overall_score.to_bits(), second.overall_score.to_bits());
	assert_eq!(first.coverage_percent.to_bits(), second.coverage_percent.to_bits());
	assert_eq!(
		serde_json::to_value(&first).expect("First result must serialize."),
		serde_json::to_value(&second).expect("Second result must serialize."),
	);
}

#[tokio::test]
async fn aggregates_stay_within_bounds() {
	let (strategies, actions, embedder) = fixtures();
	let engine = engine_with(embedder, Arc::new(MemoryIndex::new()));
	let result = engine.align(&strategies, &actions, 5).await.expect("Align must succeed.");

	assert!((0.0..=100.0).contains(&result.overall_score));
	assert!((0.0..=100.0).contains(&result.coverage_percent));

	for strategy_result in &result.strategy_results {
		assert!((0.0..=1.0).contains(&strategy_result.avg_top3_similarity));

		let best = strategy_result
			.top_matches
			.iter()
			.map(|found| f64::from(found.similarity))
			.fold(0.0_f64, f64::max);

		assert!(strategy_result.avg_top3_similarity <= best + 1e-9);

		for found in &strategy_result.top_matches {
			assert!((0.0..=1.0).contains(&found.similarity));
		}
	}
}

#[tokio::test]
async fn matches_are_ranked_by_similarity_descending() {
	let (strategies, actions, embedder) = fixtures();
	let engine = engine_with(embedder, Arc::new(MemoryIndex::new()));
	let result = engine.align(&strategies, &actions, 5).await.expect("Align must succeed.");

	for strategy_result in &result.strategy_results {
		assert!(
			strategy_result
				.top_matches
				.windows(2)
				.all(|pair| pair[0].similarity >= pair[1].similarity),
			"Matches out of order for {}",
			strategy_result.strategy_id
		);
	}
}

#[tokio::test]
async fn indexing_is_idempotent() {
	let (strategies, actions, embedder) = fixtures();
	let index = Arc::new(MemoryIndex::new());
	let engine = engine_with(embedder, index.clone());
	let _ = strategies;

	engine.index_actions(&actions).await.expect("First indexing must succeed.");

	let before =
		index.query_by_embedding(&[1.0, 0.0], 5).expect("Query must succeed.");

	engine.index_actions(&actions).await.expect("Second indexing must succeed.");

	let after = index.query_by_embedding(&[1.0, 0.0], 5).expect("Query must succeed.");

	assert_eq!(index.len(), actions.len());
	assert_eq!(before.len(), after.len());

	for (left, right) in before.iter().zip(&after) {
		assert_eq!(left.action_id, right.action_id);
		assert_eq!(left.similarity.to_bits(), right.similarity.to_bits());
	}
}

#[tokio::test]
async fn empty_inputs_produce_a_zero_result() {
	let engine = engine_with(FixtureEmbedder::default(), Arc::new(MemoryIndex::new()));
	let result = engine.align(&[], &[], 5).await.expect("Empty align must succeed.");

	assert_eq!(result.overall_score, 0.0);
	assert_eq!(result.coverage_percent, 0.0);
	assert!(result.strategy_results.is_empty());
}

#[tokio::test]
async fn strategies_without_actions_score_zero() {
	let (strategies, _, embedder) = fixtures();
	let engine = engine_with(embedder, Arc::new(MemoryIndex::new()));
	let result = engine.align(&strategies, &[], 5).await.expect("Align must succeed.");

	assert_eq!(result.overall_score, 0.0);
	assert_eq!(result.coverage_percent, 0.0);
	assert_eq!(result.strategy_results.len(), 2);

	for strategy_result in &result.strategy_results {
		assert!(strategy_result.top_matches.is_empty());
		assert_eq!(strategy_result.alignment_label, AlignmentLabel::Weak);
	}
}

#[tokio::test]
async fn coverage_requires_two_strong_matches() {
	let (strategies, actions, embedder) = fixtures();
	let engine = engine_with(embedder, Arc::new(MemoryIndex::new()));
	let result = engine.align(&strategies, &actions, 5).await.expect("Align must succeed.");

	// S1 sees similarities 1.0 and 0.8 (two Strong); S2 only one Strong.
	let s1 = &result.strategy_results[0];
	let strong = |strategy: &strata_service::StrategyResult| {
		strategy
			.top_matches
			.iter()
			.filter(|found| found.alignment_label == AlignmentLabel::Strong)
			.count()
	};

	assert_eq!(strong(s1), 2);
	assert_eq!(strong(&result.strategy_results[1]), 1);
	assert_eq!(result.coverage_percent, 50.0);
}

#[tokio::test]
async fn match_labels_follow_thresholds() {
	let (strategies, actions, embedder) = fixtures();
	let engine = engine_with(embedder, Arc::new(MemoryIndex::new()));
	let result = engine.align(&strategies, &actions, 5).await.expect("Align must succeed.");
	let s1 = &result.strategy_results[0];

	assert_eq!(s1.top_matches[0].alignment_label, AlignmentLabel::Strong);
	assert_eq!(s1.top_matches[1].alignment_label, AlignmentLabel::Strong);
	assert_eq!(s1.top_matches[2].alignment_label, AlignmentLabel::Medium);
	// avg of (1.0, 0.8, 0.55) is above the strong threshold.
	assert_eq!(s1.alignment_label, AlignmentLabel::Strong);
}

#[tokio::test]
async fn match_metadata_snapshot_is_carried_through() {
	let (strategies, actions, embedder) = fixtures();
	let engine = engine_with(embedder, Arc::new(MemoryIndex::new()));
	let result = engine.align(&strategies, &actions, 5).await.expect("Align must succeed.");
	let best = &result.strategy_results[0].top_matches[0];

	assert_eq!(best.action_id, "A1");
	assert_eq!(best.title, "Hire researchers");
	assert_eq!(best.owner, "HR");
	assert_eq!(best.start_date, "");
	assert_eq!(best.end_date, "");
}

struct TruncatingEmbedder;

impl EmbeddingProvider for TruncatingEmbedder {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Ok(texts.iter().skip(1).map(|_| vec![1.0, 0.0]).collect()) })
	}
}

#[tokio::test]
async fn mismatched_vector_count_is_a_provider_error() {
	let (strategies, actions, _) = fixtures();
	let engine = AlignmentEngine::with_backends(
		test_config(2),
		Backends::new(Arc::new(TruncatingEmbedder), Arc::new(MemoryIndex::new())),
	);
	let result = engine.align(&strategies, &actions, 5).await;

	assert!(matches!(result, Err(Error::Provider { .. })));
}

#[tokio::test]
async fn unknown_text_is_a_provider_error() {
	let (strategies, actions, _) = fixtures();
	let engine = engine_with(FixtureEmbedder::default(), Arc::new(MemoryIndex::new()));
	let result = engine.align(&strategies, &actions, 5).await;

	assert!(matches!(result, Err(Error::Provider { .. })));
}
