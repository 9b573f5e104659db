mod analyze;
mod languages;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "trace-scan")]
#[command(about = "Scan recorded agent traces for failure signals")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyze sessions of a JSONL trace file and print one JSON report per chain.
    Analyze(analyze::Args),
    /// List the builtin language packs.
    Languages,
}

#[tokio::main]
async fn main() -> Result<(), analyze::Error> {
    let cli = Cli::parse();
    let verbose = matches!(&cli.command, Command::Analyze(args) if args.verbose);
    init_tracing(verbose);

    match cli.command {
        Command::Analyze(args) => analyze::run(args).await,
        Command::Languages => {
            languages::run();
            Ok(())
        }
    }
}

/// `RUST_LOG` wins; otherwise `warn`, or `debug` with `--verbose`. Logs go to stderr so stdout
/// stays machine-readable.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
