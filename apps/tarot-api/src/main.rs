use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = tarot_api::Args::parse();

	tarot_api::run(args).await
}
