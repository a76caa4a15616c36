// crates.io
use clap::Parser;
// self
use strata_eval::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = Args::parse();
	strata_eval::run(args).await
}
