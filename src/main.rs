use callgraph_export::cli::{self, Args};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = cli::run(&args) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
