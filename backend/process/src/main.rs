use std::path::PathBuf;

use clap::Parser;
use process::Source;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Directory holding the raw restaurants.json and dishes.json
    #[arg(long, default_value = "data")]
    input: PathBuf,

    /// Fetch the raw snapshot from this base URL instead of --input
    #[arg(long, conflicts_with = "input")]
    url: Option<String>,

    /// Directory the cleaned snapshot is written to
    #[arg(long, default_value = "data")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let source = match args.url {
        Some(url) => Source::Remote(url),
        None => Source::Local(args.input),
    };

    process::load_snapshot(source, &args.output).await?;

    Ok(())
}
