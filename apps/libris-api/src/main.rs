use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = libris_api::Args::parse();
	libris_api::run(args).await
}
