//! Newstler CLI binary entry point.

use clap::Parser;
use newstler::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    // RUST_LOG=debug for verbose logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let flow = newstler::cli::build_flow(cli.config.as_deref())?;

    match cli.command {
        Commands::Link(args) => newstler::cli::auth::handle_link(&flow, &args.user).await,
        Commands::News(args) => newstler::cli::news::handle_news(&flow, &args.user).await,
        Commands::Status(args) => newstler::cli::auth::handle_status(&flow, &args.user),
        Commands::Unlink(args) => newstler::cli::auth::handle_unlink(&flow, &args.user),
    }
}
