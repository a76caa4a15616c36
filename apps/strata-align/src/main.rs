// crates.io
use clap::Parser;
// self
use strata_align::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = Args::parse();
	strata_align::run(args).await
}
