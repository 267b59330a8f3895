use std::path::PathBuf;

use clap::Parser;
use jane_eyre::eyre;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use pixlang::config::Config;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Program image to interpret.
    #[arg(default_value = "programs/sierpinski.png")]
    program: PathBuf,

    /// Where to write the rendered result.
    #[arg(default_value = "output.png")]
    output: PathBuf,

    /// Tile icon library root, overriding the config file and the default.
    #[arg(short, long)]
    library: Option<PathBuf>,

    /// JSON file overriding base_grid, library, and render colours.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the classified tile grid as JSON to this path for debugging.
    #[arg(long)]
    dump_tiles: Option<PathBuf>,

    /// Raise log verbosity; repeatable.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> eyre::Result<()> {
    jane_eyre::install()?;

    let args = Args::parse();
    let default_directive = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(default_directive.parse()?)
                .from_env_lossy(),
        )
        .init();

    let config = Config::load(args.config.as_deref(), args.library.as_deref())?;

    let report = pixlang::run(&args.program, &args.output, &config, args.dump_tiles.as_deref())?;
    info!(diagnostics = report.diagnostics, output = %args.output.display(), "interpretation finished");

    Ok(())
}
