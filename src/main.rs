use clap::Parser;
use tidyup::cli::{Cli, load_env_files, run_cli};
use tidyup::output::OutputFormatter;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = load_env_files(&cli.env_files) {
        OutputFormatter::error(&format!("could not load environment file: {}", e));
        std::process::exit(1);
    }

    let default_filter = if cli.verbose {
        "warn,tidyup=debug"
    } else {
        "warn,tidyup=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run_cli(cli) {
        OutputFormatter::error(&e.to_string());
        std::process::exit(1);
    }
}
