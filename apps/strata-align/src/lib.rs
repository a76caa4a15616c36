use std::{fs, path::PathBuf, time::Instant};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use strata_service::AlignmentEngine;
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
	/// Overrides `alignment.top_k` from the config.
	#[arg(long, value_name = "N")]
	pub top_k: Option<u32>,
	/// Writes the report here instead of stdout.
	#[arg(long, short = 'o', value_name = "FILE")]
	pub output: Option<PathBuf>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let cfg = strata_config::load(&args.config)?;
	let filter = EnvFilter::new(cfg.service.log_level.clone());

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let strategies = strata_domain::load_strategies(&args.strategies)?;
	let actions = strata_domain::load_actions(&args.actions)?;
	let top_k = args.top_k.unwrap_or(cfg.alignment.top_k);

	tracing::info!(
		strategies = strategies.len(),
		actions = actions.len(),
		top_k,
		model = %cfg.providers.embedding.model,
		"Starting alignment run."
	);

	let store = QdrantStore::new(&cfg.storage.qdrant)?;

	store.ensure_collection().await?;

	let engine = AlignmentEngine::new(cfg, store);
	let started = Instant::now();
	let result = engine.align(&strategies, &actions, top_k).await?;
	let elapsed_ms = started.elapsed().as_secs_f64() * 1_000.0;

	tracing::info!(
		overall_score = result.overall_score,
		coverage_percent = result.coverage_percent,
		elapsed_ms,
		"Alignment run finished."
	);

	let json = serde_json::to_string_pretty(&result)?;

	match &args.output {
		Some(path) => fs::write(path, json)?,
		None => println!("{json}"),
	}

	Ok(())
}
