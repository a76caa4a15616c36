use std::{
	collections::{BTreeMap, HashSet},
	fs,
	path::{Path, PathBuf},
	time::Instant,
};

use clap::Parser;
use color_eyre::eyre;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use strata_service::{AlignmentEngine, AlignmentRunResult};
use strata_storage::qdrant::QdrantStore;

#[derive(Debug, Parser)]
#[command(
	version = strata_cli::VERSION,
	rename_all = "kebab",
	styles = strata_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[arg(long, short = 's', value_name = "FILE")]
	pub strategies: PathBuf,
	#[arg(long, short = 'a', value_name = "FILE")]
	pub actions: PathBuf,
	/// JSON object mapping strategy id to its relevant action ids.
	#[arg(long, short = 'g', value_name = "FILE")]
	pub ground_truth: PathBuf,
	/// Overrides `alignment.top_k` from the config.
	#[arg(long, value_name = "N")]
	pub top_k: Option<u32>,
	/// Writes the report here instead of stdout.
	#[arg(long, short = 'o', value_name = "FILE")]
	pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct EvalOutput {
	model: String,
	top_k: u32,
	strategy_count: usize,
	action_count: usize,
	align_latency_ms: f64,
	summary: EvalSummary,
	per_strategy: Vec<StrategyEval>,
}

#[derive(Debug, Serialize)]
struct EvalSummary {
	macro_precision: f64,
	macro_recall: f64,
	map: f64,
	mean_ndcg: f64,
}

#[derive(Debug, Serialize)]
struct StrategyEval {
	strategy_id: String,
	precision_at_k: f64,
	recall_at_k: f64,
	average_precision: f64,
	ndcg: f64,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let cfg = strata_config::load(&args.config)?;
	let filter = EnvFilter::new(cfg.service.log_level.clone());

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let strategies = strata_domain::load_strategies(&args.strategies)?;
	let actions = strata_domain::load_actions(&args.actions)?;
	let ground_truth = load_ground_truth(&args.ground_truth)?;
	let top_k = args.top_k.unwrap_or(cfg.alignment.top_k);
	let model = cfg.providers.embedding.model.clone();

	tracing::info!(
		strategies = strategies.len(),
		actions = actions.len(),
		top_k,
		model = %model,
		"Starting evaluation run."
	);

	let store = QdrantStore::new(&cfg.storage.qdrant)?;

	store.ensure_collection().await?;

	let engine = AlignmentEngine::new(cfg, store);
	let started = Instant::now();
	let result = engine.align(&strategies, &actions, top_k).await?;
	let align_latency_ms = started.elapsed().as_secs_f64() * 1_000.0;
	let output = evaluate(
		&result,
		&ground_truth,
		top_k,
		model,
		strategies.len(),
		actions.len(),
		align_latency_ms,
	);

	tracing::info!(
		macro_precision = output.summary.macro_precision,
		macro_recall = output.summary.macro_recall,
		map = output.summary.map,
		mean_ndcg = output.summary.mean_ndcg,
		align_latency_ms,
		"Evaluation finished."
	);

	let json = serde_json::to_string_pretty(&output)?;

	match &args.output {
		Some(path) => fs::write(path, json)?,
		None => println!("{json}"),
	}

	Ok(())
}

/// An entirely absent or empty ground-truth file is a configuration error; a
/// strategy missing from the map is valid data and scores as zero-relevance.
fn load_ground_truth(path: &Path) -> color_eyre::Result<BTreeMap<String, Vec<String>>> {
	let raw = fs::read_to_string(path)?;
	let ground_truth: BTreeMap<String, Vec<String>> = serde_json::from_str(&raw)?;

	if ground_truth.is_empty() {
		return Err(eyre::eyre!(
			"Ground truth at {} maps no strategies; evaluation needs at least one labeled strategy.",
			path.display()
		));
	}

	Ok(ground_truth)
}

fn evaluate(
	result: &AlignmentRunResult,
	ground_truth: &BTreeMap<String, Vec<String>>,
	top_k: u32,
	model: String,
	strategy_count: usize,
	action_count: usize,
	align_latency_ms: f64,
) -> EvalOutput {
	let k = top_k as usize;
	let mut per_strategy = Vec::with_capacity(result.strategy_results.len());

	for strategy_result in &result.strategy_results {
		let predicted: Vec<String> = strategy_result
			.top_matches
			.iter()
			.map(|found| found.action_id.clone())
			.collect();
		let truth: HashSet<String> = ground_truth
			.get(&strategy_result.strategy_id)
			.map(|ids| ids.iter().cloned().collect())
			.unwrap_or_default();
		let (precision_at_k, recall_at_k) = precision_recall_at_k(&predicted, &truth, k);

		per_strategy.push(StrategyEval {
			strategy_id: strategy_result.strategy_id.clone(),
			precision_at_k,
			recall_at_k,
			average_precision: average_precision(&predicted, &truth),
			ndcg: ndcg_at_k(&predicted, &truth, k),
		});
	}

	let count = per_strategy.len().max(1) as f64;
	let summary = EvalSummary {
		macro_precision: per_strategy.iter().map(|s| s.precision_at_k).sum::<f64>() / count,
		macro_recall: per_strategy.iter().map(|s| s.recall_at_k).sum::<f64>() / count,
		map: per_strategy.iter().map(|s| s.average_precision).sum::<f64>() / count,
		mean_ndcg: per_strategy.iter().map(|s| s.ndcg).sum::<f64>() / count,
	};

	EvalOutput {
		model,
		top_k,
		strategy_count,
		action_count,
		align_latency_ms,
		summary,
		per_strategy,
	}
}

fn precision_recall_at_k(
	predicted: &[String],
	truth: &HashSet<String>,
	k: usize,
) -> (f64, f64) {
	let retained = &predicted[..predicted.len().min(k)];
	let hits = retained.iter().filter(|id| truth.contains(*id)).count();
	let precision = hits as f64 / retained.len().max(1) as f64;
	let recall = hits as f64 / truth.len().max(1) as f64;

	(precision, recall)
}

/// Walks the full ranking; divides by the hit count, not by `|truth|`, so a
/// ranking with zero relevant items yields 0 rather than dividing by zero.
fn average_precision(predicted: &[String], truth: &HashSet<String>) -> f64 {
	let mut hits = 0_usize;
	let mut ap_sum = 0.0_f64;

	for (idx, id) in predicted.iter().enumerate() {
		if truth.contains(id) {
			hits += 1;
			ap_sum += hits as f64 / (idx + 1) as f64;
		}
	}

	ap_sum / hits.max(1) as f64
}

/// Binary relevance; the ideal ranking places `min(|truth|, k)` relevant
/// items at the top. 0 when no relevant items exist.
fn ndcg_at_k(predicted: &[String], truth: &HashSet<String>, k: usize) -> f64 {
	let mut dcg = 0.0_f64;

	for (idx, id) in predicted.iter().take(k).enumerate() {
		if truth.contains(id) {
			dcg += 1.0 / ((idx + 2) as f64).log2();
		}
	}

	let ideal_count = truth.len().min(k);
	let idcg: f64 = (1..=ideal_count).map(|rank| 1.0 / ((rank + 1) as f64).log2()).sum();

	if idcg > 0.0 { dcg / idcg } else { 0.0 }
}
