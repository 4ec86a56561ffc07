mod cli;
mod extract_cmd;
mod regions_cmd;
mod shared;

use clap::Parser;
use cli::Cli;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        cli::Commands::Extract {
            ref folder,
            ref regions,
            ref output,
            workers,
            annotate,
        } => extract_cmd::run(folder, regions.as_deref(), output.as_deref(), workers, annotate),
        cli::Commands::Regions { ref command } => regions_cmd::run(command),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
