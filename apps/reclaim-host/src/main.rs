use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = reclaim_host::Args::parse();
	reclaim_host::run(args).await
}
